pub mod calculator;
pub mod catalog;
pub mod report;
pub mod store;

pub use calculator::compute;
pub use catalog::{CatalogError, PricingCatalog, PricingCatalogInput, PricingError};
pub use report::aggregate;
pub use store::CatalogStore;
