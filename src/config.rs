//! User settings and the bank / Shopify / courier catalogues
//!
//! Stored as TOML at `$XDG_CONFIG_HOME/nafa/settings.toml` unless
//! `NAFA_SETTINGS` points elsewhere. A missing file means defaults.

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::AppError;
use crate::tax::{PaymentType, TaxRegime};

/// Bank with its international debit card fee (percent)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bank {
    pub name: String,
    pub debit_card_tax: Decimal,
}

/// Shopify subscription tier priced in USD per month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShopifyTier {
    pub name: String,
    pub monthly_usd: Decimal,
}

/// Per-delivery courier charges in PKR
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Courier {
    pub name: String,
    pub cod_rate: Decimal,
    pub online_rate: Decimal,
}

impl Courier {
    pub fn rate_for(&self, payment_type: PaymentType) -> Decimal {
        match payment_type {
            PaymentType::Cod => self.cod_rate,
            PaymentType::Online => self.online_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub is_filer: bool,
    pub provincial_tax_enabled: bool,
    /// Percent, only applied when enabled
    pub provincial_tax_rate: Decimal,
    /// Fixed USD to PKR rate that bypasses the live lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_rate: Option<Decimal>,
    pub banks: Vec<Bank>,
    pub shopify_plans: Vec<ShopifyTier>,
    pub couriers: Vec<Courier>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_filer: true,
            provincial_tax_enabled: false,
            provincial_tax_rate: dec!(16),
            manual_rate: None,
            banks: default_banks(),
            shopify_plans: default_shopify_plans(),
            couriers: default_couriers(),
        }
    }
}

fn bank(name: &str, debit_card_tax: Decimal) -> Bank {
    Bank {
        name: name.to_string(),
        debit_card_tax,
    }
}

fn default_banks() -> Vec<Bank> {
    vec![
        bank("Meezan Bank", dec!(2.75)),
        bank("HBL", dec!(3.0)),
        bank("UBL", dec!(2.5)),
        bank("Sadapay", dec!(1.5)),
        bank("Nayapay", dec!(1.75)),
        bank("Standard Chartered", dec!(2.0)),
        bank("Bank Alfalah", dec!(1.8)),
        bank("Faysal Bank", dec!(1.5)),
        bank("Easypaisa", dec!(2.5)),
        bank("Other", dec!(2.0)),
    ]
}

fn default_shopify_plans() -> Vec<ShopifyTier> {
    [("Basic", dec!(29)), ("Regular", dec!(79)), ("Advanced", dec!(299))]
        .into_iter()
        .map(|(name, monthly_usd)| ShopifyTier {
            name: name.to_string(),
            monthly_usd,
        })
        .collect()
}

fn default_couriers() -> Vec<Courier> {
    [
        ("TCS", dec!(250), dec!(220)),
        ("Leopards", dec!(230), dec!(200)),
        ("M&P", dec!(220), dec!(190)),
        ("PostEx", dec!(200), dec!(180)),
        ("Trax", dec!(210), dec!(190)),
    ]
    .into_iter()
    .map(|(name, cod_rate, online_rate)| Courier {
        name: name.to_string(),
        cod_rate,
        online_rate,
    })
    .collect()
}

fn find_by_name<'a, T>(items: &'a [T], name: &str, key: impl Fn(&T) -> &str) -> Option<&'a T> {
    let wanted = name.trim();
    items.iter().find(|item| key(item).eq_ignore_ascii_case(wanted))
}

impl Settings {
    pub fn tax_regime(&self) -> TaxRegime {
        TaxRegime {
            filer_status: self.is_filer,
            provincial_tax_enabled: self.provincial_tax_enabled,
            provincial_tax_rate: self.provincial_tax_rate,
        }
    }

    pub fn find_bank(&self, name: &str) -> Option<&Bank> {
        find_by_name(&self.banks, name, |b| b.name.as_str())
    }

    pub fn find_shopify_plan(&self, name: &str) -> Option<&ShopifyTier> {
        find_by_name(&self.shopify_plans, name, |p| p.name.as_str())
    }

    pub fn find_courier(&self, name: &str) -> Option<&Courier> {
        find_by_name(&self.couriers, name, |c| c.name.as_str())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.tax_regime()
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        if let Some(rate) = self.manual_rate {
            if rate <= Decimal::ZERO {
                return Err(AppError::Config("manual_rate must be positive".to_string()));
            }
        }
        for b in &self.banks {
            if b.debit_card_tax < Decimal::ZERO || b.debit_card_tax > Decimal::ONE_HUNDRED {
                return Err(AppError::Config(format!(
                    "Debit card tax for {} must be between 0 and 100 percent",
                    b.name
                )));
            }
        }
        Ok(())
    }

    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .map_err(|e| AppError::Config(e.to_string()))
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings file {}", path.display()))?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&settings_path()?)
    }
}

pub fn settings_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("NAFA_SETTINGS") {
        return Ok(PathBuf::from(path));
    }
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("nafa").join("settings.toml"))
}
