use crate::domain::model::{TaxRequest, TaxResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;

/// Sends one request to the tax-rate service and hands back the raw response body.
///
/// Implementations report transport failures and non-success statuses as
/// [`CartTaxError::TaxServiceUnavailable`](crate::utils::error::CartTaxError::TaxServiceUnavailable).
/// Body parsing is left to the caller.
#[async_trait]
pub trait TaxTransport: Send + Sync {
    async fn send(&self, request: &TaxRequest) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait TaxService: Send + Sync {
    async fn calculate(&self, subtotal: Decimal, jurisdiction: &str) -> Result<TaxResult>;
}

pub trait ConfigProvider: Send + Sync {
    fn tax_endpoint(&self) -> &str;
    fn taxable_jurisdictions(&self) -> &[String];
    fn request_timeout(&self) -> Option<Duration>;
}
