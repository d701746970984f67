pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, OutputFormat};

pub use adapters::{HttpTaxTransport, InMemoryTransport, StaticTaxService};
pub use config::{Settings, TomlConfig};
pub use crate::core::{checkout::Checkout, tax::TaxCalculator};
pub use domain::model::{Cart, LineItem, Receipt, TaxRequest, TaxResult};
pub use utils::error::{CartTaxError, Result};
