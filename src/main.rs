use cart_tax::core::ConfigProvider;
use cart_tax::utils::error::ErrorSeverity;
use cart_tax::utils::{logger, validation::Validate};
use cart_tax::{Checkout, CliConfig, HttpTaxTransport, OutputFormat, Receipt, TaxCalculator};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting cart-tax");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    match run(&config).await {
        Ok(receipt) => {
            print_receipt(&receipt, config.format)?;
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Checkout failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

async fn run(config: &CliConfig) -> cart_tax::Result<Receipt> {
    let settings = config.resolve()?;
    settings.validate()?;

    let transport = HttpTaxTransport::from_config(&settings)?;
    tracing::debug!("Tax service endpoint: {}", transport.endpoint());

    let calculator = TaxCalculator::new(transport)
        .with_taxable_jurisdictions(settings.taxable_jurisdictions().iter().cloned());
    let checkout = Checkout::new(calculator);

    checkout
        .receipt(&settings.cart(), settings.jurisdiction()?)
        .await
}

fn print_receipt(receipt: &Receipt, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(receipt)?),
        OutputFormat::Text => {
            println!("Subtotal: {}", receipt.subtotal);
            println!("Tax:      {}", receipt.tax);
            println!("Total:    {}", receipt.total);
        }
    }
    Ok(())
}
