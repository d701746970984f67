#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::{Cart, ConfigProvider, LineItem};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::time::Duration;

pub use toml_config::TomlConfig;

pub const DEFAULT_TAX_ENDPOINT: &str = "http://localhost:8080/tax";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub fn default_taxable_jurisdictions() -> Vec<String> {
    vec![crate::core::tax::DEFAULT_TAXABLE_JURISDICTION.to_string()]
}

/// Fully resolved run settings, after file values and overrides are merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tax_endpoint: String,
    pub taxable_jurisdictions: Vec<String>,
    pub timeout_seconds: u64,
    pub jurisdiction: Option<String>,
    pub items: Vec<LineItem>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tax_endpoint: DEFAULT_TAX_ENDPOINT.to_string(),
            taxable_jurisdictions: default_taxable_jurisdictions(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            jurisdiction: None,
            items: Vec::new(),
        }
    }
}

impl From<TomlConfig> for Settings {
    fn from(config: TomlConfig) -> Self {
        let (jurisdiction, items) = match config.cart {
            Some(cart) => (cart.jurisdiction, cart.items),
            None => (None, Vec::new()),
        };

        Self {
            tax_endpoint: config.tax_service.endpoint,
            taxable_jurisdictions: config.jurisdictions.taxable,
            timeout_seconds: config
                .tax_service
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            jurisdiction,
            items,
        }
    }
}

impl Settings {
    pub fn cart(&self) -> Cart {
        Cart::new(self.items.clone())
    }

    pub fn jurisdiction(&self) -> Result<&str> {
        validation::validate_required_field("jurisdiction", &self.jurisdiction).map(String::as_str)
    }
}

impl ConfigProvider for Settings {
    fn tax_endpoint(&self) -> &str {
        &self.tax_endpoint
    }

    fn taxable_jurisdictions(&self) -> &[String] {
        &self.taxable_jurisdictions
    }

    fn request_timeout(&self) -> Option<Duration> {
        Some(Duration::from_secs(self.timeout_seconds))
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("tax_endpoint", &self.tax_endpoint)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        for code in &self.taxable_jurisdictions {
            validation::validate_jurisdiction_code("taxable", code)?;
        }
        validation::validate_jurisdiction_code("jurisdiction", self.jurisdiction()?)?;
        Ok(())
    }
}
