use crate::core::LineItem;
use crate::utils::error::{CartTaxError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::default_taxable_jurisdictions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub tax_service: TaxServiceConfig,
    #[serde(default)]
    pub jurisdictions: JurisdictionConfig,
    pub cart: Option<CartConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxServiceConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionConfig {
    #[serde(default = "default_taxable_jurisdictions")]
    pub taxable: Vec<String>,
}

impl Default for JurisdictionConfig {
    fn default() -> Self {
        Self {
            taxable: default_taxable_jurisdictions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartConfig {
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CartTaxError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CartTaxError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("tax_service.endpoint", &self.tax_service.endpoint)?;

        if let Some(timeout) = self.tax_service.timeout_seconds {
            validation::validate_positive_number("tax_service.timeout_seconds", timeout, 1)?;
        }

        for code in &self.jurisdictions.taxable {
            validation::validate_jurisdiction_code("jurisdictions.taxable", code)?;
        }

        if let Some(jurisdiction) = self.cart.as_ref().and_then(|c| c.jurisdiction.as_deref()) {
            validation::validate_jurisdiction_code("cart.jurisdiction", jurisdiction)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
