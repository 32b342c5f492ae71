//! Error handling for Nafa
//!
//! The calculation core returns the typed [`CalcError`]; everything around it
//! (settings, history, rate fetching) uses anyhow for context chaining and
//! reports failures through [`AppError`] where a typed variant helps.

use thiserror::Error;

/// Errors produced by the calculation core.
///
/// These are caller-fixable and their messages are meant to be shown to the
/// user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("no USD to PKR rate available; set one with `nafa rate set <rate>`")]
    MissingRate,
}

impl CalcError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CalcError::InvalidInput(message.into())
    }
}

/// Errors from the layers around the core
#[derive(Error, Debug)]
pub enum AppError {
    #[error("settings error: {0}")]
    Config(String),

    #[error("history error: {0}")]
    History(String),

    #[error("rate error: {0}")]
    Rate(String),
}

/// Result type alias for application operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message_is_verbatim() {
        let err = CalcError::invalid("Selling price must be greater than sourcing cost.");
        assert_eq!(
            err.to_string(),
            "Selling price must be greater than sourcing cost."
        );
    }

    #[test]
    fn test_missing_rate_points_to_manual_override() {
        assert!(CalcError::MissingRate.to_string().contains("nafa rate set"));
    }

    #[test]
    fn test_anyhow_context_chains_calc_errors() {
        use anyhow::Context;
        let result: Result<()> = Err(CalcError::MissingRate).context("failed to run feasibility");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to run feasibility"));
                assert_eq!(
                    e.downcast_ref::<CalcError>(),
                    Some(&CalcError::MissingRate)
                );
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_app_error_variants() {
        let err = AppError::Config("bad toml".to_string());
        assert!(err.to_string().starts_with("settings error"));

        let err = AppError::History("locked".to_string());
        assert!(err.to_string().starts_with("history error"));

        let err = AppError::Rate("offline".to_string());
        assert!(err.to_string().starts_with("rate error"));
    }
}
