use crate::core::{Result, TaxRequest, TaxResult, TaxService, TaxTransport};
use crate::utils::error::CartTaxError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::collections::HashSet;

pub const DEFAULT_TAXABLE_JURISDICTION: &str = "CA";

/// Looks up tax for taxable jurisdictions through a [`TaxTransport`].
///
/// Any jurisdiction outside the taxable set resolves to a zero amount without
/// touching the transport.
pub struct TaxCalculator<T: TaxTransport> {
    transport: T,
    taxable: HashSet<String>,
}

impl<T: TaxTransport> TaxCalculator<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            taxable: HashSet::from([DEFAULT_TAXABLE_JURISDICTION.to_string()]),
        }
    }

    /// Replaces the taxable set. Codes are matched exactly, case included.
    pub fn with_taxable_jurisdictions<I, S>(mut self, jurisdictions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taxable = jurisdictions.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_taxable(&self, jurisdiction: &str) -> bool {
        self.taxable.contains(jurisdiction)
    }

    pub async fn calculate(&self, subtotal: Decimal, jurisdiction: &str) -> Result<TaxResult> {
        if !self.is_taxable(jurisdiction) {
            tracing::debug!("Jurisdiction {} is not taxable, skipping lookup", jurisdiction);
            return Ok(TaxResult::zero());
        }

        let request = TaxRequest {
            subtotal,
            jurisdiction: jurisdiction.to_string(),
        };

        tracing::debug!("Requesting tax for subtotal {} in {}", subtotal, jurisdiction);
        let body = self.transport.send(&request).await?;

        let result = parse_tax_body(&body)?;
        tracing::info!(
            "Tax for subtotal {} in {}: {}",
            subtotal,
            jurisdiction,
            result.amount
        );
        Ok(result)
    }
}

#[async_trait]
impl<T: TaxTransport> TaxService for TaxCalculator<T> {
    async fn calculate(&self, subtotal: Decimal, jurisdiction: &str) -> Result<TaxResult> {
        TaxCalculator::calculate(self, subtotal, jurisdiction).await
    }
}

#[derive(Deserialize)]
struct TaxResponseBody<'a> {
    #[serde(borrow)]
    amount: &'a RawValue,
}

fn parse_tax_body(body: &[u8]) -> Result<TaxResult> {
    let response: TaxResponseBody = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(
            "Unparseable tax response: {}",
            String::from_utf8_lossy(body)
        );
        CartTaxError::InvalidTaxResponse {
            message: format!("expected {{\"amount\": <number>}}: {}", e),
        }
    })?;

    let amount = parse_amount(response.amount.get())?;
    if amount < Decimal::ZERO {
        return Err(CartTaxError::InvalidTaxResponse {
            message: format!("negative tax amount {}", amount),
        });
    }

    Ok(TaxResult { amount })
}

/// Reads the number text as sent, so no digits are lost to f64 rounding.
fn parse_amount(text: &str) -> Result<Decimal> {
    let invalid = |reason: String| CartTaxError::InvalidTaxResponse {
        message: format!("amount {}: {}", text, reason),
    };

    if !text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
        return Err(invalid("not a JSON number".to_string()));
    }

    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).map_err(|e| invalid(e.to_string()))
    } else {
        Decimal::from_str_exact(text).map_err(|e| invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTransport;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_taxable_jurisdiction_returns_service_amount() {
        let transport = InMemoryTransport::with_body(r#"{"amount": 7}"#);
        let calculator = TaxCalculator::new(transport.clone());

        let result = calculator.calculate(dec!(500), "CA").await.unwrap();

        assert_eq!(result.amount, dec!(7));
        assert_eq!(transport.call_count(), 1);
        let sent = transport.requests();
        assert_eq!(sent[0].subtotal, dec!(500));
        assert_eq!(sent[0].jurisdiction, "CA");
    }

    #[tokio::test]
    async fn test_amount_computed_from_request() {
        let transport = InMemoryTransport::responding(|request| {
            Ok(format!(r#"{{"amount": {}}}"#, request.subtotal * dec!(0.10)).into_bytes())
        });
        let calculator = TaxCalculator::new(transport.clone());

        let result = calculator.calculate(dec!(100), "CA").await.unwrap();

        assert_eq!(result.amount, dec!(10));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_non_taxable_jurisdiction_skips_transport() {
        let transport = InMemoryTransport::with_body(r#"{"amount": 99}"#);
        let calculator = TaxCalculator::new(transport.clone());

        let result = calculator.calculate(dec!(100), "NY").await.unwrap();

        assert_eq!(result, TaxResult::zero());
        assert_eq!(transport.call_count(), 0);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_jurisdiction_match_is_case_sensitive() {
        let transport = InMemoryTransport::with_body(r#"{"amount": 5}"#);
        let calculator = TaxCalculator::new(transport.clone());

        let result = calculator.calculate(dec!(100), "ca").await.unwrap();

        assert_eq!(result.amount, Decimal::ZERO);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_taxable_set() {
        let transport = InMemoryTransport::with_body(r#"{"amount": 3.5}"#);
        let calculator =
            TaxCalculator::new(transport.clone()).with_taxable_jurisdictions(["NY", "WA"]);

        assert!(!calculator.is_taxable("CA"));
        assert_eq!(calculator.calculate(dec!(50), "CA").await.unwrap().amount, Decimal::ZERO);
        assert_eq!(calculator.calculate(dec!(50), "WA").await.unwrap().amount, dec!(3.5));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_legacy_tax_field_is_rejected() {
        let transport = InMemoryTransport::with_body(r#"{"tax": 7}"#);
        let calculator = TaxCalculator::new(transport);

        let err = calculator.calculate(dec!(500), "CA").await.unwrap_err();

        assert!(matches!(err, CartTaxError::InvalidTaxResponse { .. }));
    }

    #[tokio::test]
    async fn test_malformed_and_negative_bodies_are_invalid() {
        for body in ["not json", r#"{"amount": "lots"}"#, r#"{"amount": -1}"#, ""] {
            let calculator = TaxCalculator::new(InMemoryTransport::with_body(body));
            let err = calculator.calculate(dec!(10), "CA").await.unwrap_err();
            assert!(
                matches!(err, CartTaxError::InvalidTaxResponse { .. }),
                "body {:?} gave {:?}",
                body,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_propagated() {
        let transport = InMemoryTransport::failing(Some(503), "service down");
        let calculator = TaxCalculator::new(transport.clone());

        let err = calculator.calculate(dec!(10), "CA").await.unwrap_err();

        assert!(matches!(
            err,
            CartTaxError::TaxServiceUnavailable {
                status: Some(503),
                ..
            }
        ));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_calculations_are_independent() {
        let transport = InMemoryTransport::responding(|request| {
            Ok(format!(r#"{{"amount": {}}}"#, request.subtotal / dec!(10)).into_bytes())
        });
        let calculator = TaxCalculator::new(transport.clone());

        let (a, b, c) = tokio::join!(
            calculator.calculate(dec!(100), "CA"),
            calculator.calculate(dec!(250), "CA"),
            calculator.calculate(dec!(400), "TX"),
        );

        assert_eq!(a.unwrap().amount, dec!(10));
        assert_eq!(b.unwrap().amount, dec!(25));
        assert_eq!(c.unwrap().amount, Decimal::ZERO);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_high_precision_amount_is_kept_exactly() {
        let transport = InMemoryTransport::with_body(r#"{"amount": 1234567890.123456789}"#);
        let calculator = TaxCalculator::new(transport);

        let result = calculator.calculate(dec!(100), "CA").await.unwrap();

        assert_eq!(result.amount, dec!(1234567890.123456789));
        assert_eq!(result.amount.to_string(), "1234567890.123456789");
    }

    #[tokio::test]
    async fn test_scientific_and_out_of_range_amounts() {
        let calculator = TaxCalculator::new(InMemoryTransport::with_body(r#"{"amount": 5e28}"#));
        let result = calculator.calculate(dec!(100), "CA").await.unwrap();
        assert_eq!(result.amount, Decimal::from_scientific("5e28").unwrap());

        for body in [r#"{"amount": 1e40}"#, r#"{"amount": null}"#, r#"{"amount": "7"}"#] {
            let calculator = TaxCalculator::new(InMemoryTransport::with_body(body));
            let err = calculator.calculate(dec!(100), "CA").await.unwrap_err();
            assert!(
                matches!(err, CartTaxError::InvalidTaxResponse { .. }),
                "body {:?} gave {:?}",
                body,
                err
            );
        }
    }
}
