use super::{Settings, TomlConfig};
use crate::core::LineItem;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "cart-tax")]
#[command(about = "Computes a cart subtotal, looks up its tax and prints the total")]
pub struct CliConfig {
    /// Line item as id:quantity:unit_price, may be repeated
    #[arg(long = "item", value_name = "ID:QTY:PRICE")]
    pub items: Vec<LineItem>,

    /// Jurisdiction code, e.g. CA
    #[arg(long)]
    pub jurisdiction: Option<String>,

    #[arg(long)]
    pub tax_endpoint: Option<String>,

    /// Jurisdictions that need a tax lookup
    #[arg(long, value_delimiter = ',')]
    pub taxable: Vec<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// TOML file with [tax_service], [jurisdictions] and [cart] tables
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// Merges the optional config file with command-line values. Flags win;
    /// `--item` replaces the file's items rather than appending to them.
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                let file_config = TomlConfig::from_file(path)?;
                file_config.validate()?;
                Settings::from(file_config)
            }
            None => Settings::default(),
        };

        if let Some(endpoint) = &self.tax_endpoint {
            settings.tax_endpoint = endpoint.clone();
        }
        if !self.taxable.is_empty() {
            settings.taxable_jurisdictions = self.taxable.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        if let Some(jurisdiction) = &self.jurisdiction {
            settings.jurisdiction = Some(jurisdiction.clone());
        }
        if !self.items.is_empty() {
            settings.items = self.items.clone();
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TAX_ENDPOINT;
    use crate::core::ConfigProvider;
    use crate::utils::error::CartTaxError;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_items_and_flags() {
        let cli = CliConfig::try_parse_from([
            "cart-tax",
            "--item",
            "shirt:4:50",
            "--item",
            "hat:1:40",
            "--jurisdiction",
            "CA",
            "--taxable",
            "CA,WA",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.items.len(), 2);
        assert_eq!(cli.format, OutputFormat::Json);

        let settings = cli.resolve().unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.tax_endpoint(), DEFAULT_TAX_ENDPOINT);
        assert_eq!(settings.taxable_jurisdictions(), ["CA", "WA"]);
        assert_eq!(settings.cart().subtotal(), dec!(240));
    }

    #[test]
    fn test_malformed_item_is_rejected_by_parser() {
        let result = CliConfig::try_parse_from(["cart-tax", "--item", "shirt:four:50"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[tax_service]
endpoint = "https://tax.example.com"
timeout_seconds = 10

[cart]
jurisdiction = "NY"

[[cart.items]]
id = "book"
quantity = 3
unit_price = 10
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = CliConfig::try_parse_from([
            "cart-tax",
            "--config",
            path.as_str(),
            "--jurisdiction",
            "CA",
            "--timeout-seconds",
            "2",
        ])
        .unwrap();

        let settings = cli.resolve().unwrap();
        assert_eq!(settings.tax_endpoint, "https://tax.example.com");
        assert_eq!(settings.timeout_seconds, 2);
        assert_eq!(settings.jurisdiction().unwrap(), "CA");
        assert_eq!(settings.cart().subtotal(), dec!(30));
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[tax_service]
endpoint = "https://tax.example.com"
timeout_seconds = 0

[jurisdictions]
taxable = ["C A"]
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = CliConfig::try_parse_from([
            "cart-tax",
            "--config",
            path.as_str(),
            "--jurisdiction",
            "CA",
        ])
        .unwrap();

        assert!(matches!(
            cli.resolve(),
            Err(CartTaxError::InvalidConfigValueError { .. })
        ));
    }
}
