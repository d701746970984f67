use crate::domain::model::TaxRequest;
use crate::domain::ports::{ConfigProvider, TaxTransport};
use crate::utils::error::{CartTaxError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Posts `{"subtotal": n}` as JSON to the tax-rate endpoint.
#[derive(Debug, Clone)]
pub struct HttpTaxTransport {
    client: Client,
    endpoint: String,
}

impl HttpTaxTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            CartTaxError::ConfigValidationError {
                field: "timeout_seconds".to_string(),
                message: format!("failed to build HTTP client: {}", e),
            }
        })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        match config.request_timeout() {
            Some(timeout) => Self::with_timeout(config.tax_endpoint(), timeout),
            None => Ok(Self::new(config.tax_endpoint())),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TaxTransport for HttpTaxTransport {
    async fn send(&self, request: &TaxRequest) -> Result<Vec<u8>> {
        tracing::debug!("POST {} for jurisdiction {}", self.endpoint, request.jurisdiction);

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Tax service request failed: {}", e);
                CartTaxError::TaxServiceUnavailable {
                    status: e.status().map(|s| s.as_u16()),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        tracing::debug!("Tax service response status: {}", status);

        if !status.is_success() {
            return Err(CartTaxError::TaxServiceUnavailable {
                status: Some(status.as_u16()),
                message: format!("tax service answered with HTTP {}", status),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CartTaxError::TaxServiceUnavailable {
                status: Some(status.as_u16()),
                message: format!("failed to read response body: {}", e),
            })?;

        Ok(body.to_vec())
    }
}
