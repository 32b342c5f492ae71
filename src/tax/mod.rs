// Tax module - Pakistani transaction taxes (FBR point-of-sale, WHT, FED, provincial sales tax)

pub mod point_of_sale;
pub mod transaction;

pub use point_of_sale::{fbr_tax, fbr_tax_rate, PaymentType};
pub use transaction::{effective_local_cost, effective_usd_cost, TaxBreakdown, TaxRegime};
