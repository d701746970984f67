use crate::core::{Cart, Receipt, Result, TaxService};

/// Prices a cart: subtotal, one tax lookup, total.
pub struct Checkout<S: TaxService> {
    tax_service: S,
}

impl<S: TaxService> Checkout<S> {
    pub fn new(tax_service: S) -> Self {
        Self { tax_service }
    }

    pub async fn receipt(&self, cart: &Cart, jurisdiction: &str) -> Result<Receipt> {
        let subtotal = cart.checked_subtotal()?;
        tracing::debug!("Cart with {} items has subtotal {}", cart.len(), subtotal);

        let tax = self.tax_service.calculate(subtotal, jurisdiction).await?;
        let receipt = Receipt::new(subtotal, tax)?;

        tracing::info!(
            "Receipt for {}: subtotal {}, tax {}, total {}",
            jurisdiction,
            receipt.subtotal,
            receipt.tax,
            receipt.total
        );
        Ok(receipt)
    }
}
