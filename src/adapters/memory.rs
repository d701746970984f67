//! In-memory stand-ins for the tax ports.
//!
//! Both doubles record every call so tests can check how often a port was
//! used and with which arguments. Clones share the same recording.

use crate::domain::model::{TaxRequest, TaxResult};
use crate::domain::ports::{TaxService, TaxTransport};
use crate::utils::error::{CartTaxError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

type Responder = dyn Fn(&TaxRequest) -> Result<Vec<u8>> + Send + Sync;

#[derive(Clone)]
pub struct InMemoryTransport {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<TaxRequest>>>,
}

impl InMemoryTransport {
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&TaxRequest) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers every request with the same body.
    pub fn with_body(body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        Self::responding(move |_| Ok(body.clone()))
    }

    pub fn with_amount(amount: Decimal) -> Self {
        Self::with_body(format!(r#"{{"amount": {}}}"#, amount))
    }

    pub fn failing(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::responding(move |_| {
            Err(CartTaxError::TaxServiceUnavailable {
                status,
                message: message.clone(),
            })
        })
    }

    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    pub fn requests(&self) -> Vec<TaxRequest> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TaxRequest>> {
        // a poisoned recording is still a valid recording
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl TaxTransport for InMemoryTransport {
    async fn send(&self, request: &TaxRequest) -> Result<Vec<u8>> {
        self.lock().push(request.clone());
        (self.responder)(request)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxCall {
    pub subtotal: Decimal,
    pub jurisdiction: String,
}

/// Returns a fixed tax result, or a fixed failure, without any I/O.
#[derive(Clone)]
pub struct StaticTaxService {
    outcome: Arc<dyn Fn() -> Result<TaxResult> + Send + Sync>,
    calls: Arc<Mutex<Vec<TaxCall>>>,
}

impl StaticTaxService {
    pub fn with_amount(amount: Decimal) -> Self {
        Self {
            outcome: Arc::new(move || -> Result<TaxResult> { Ok(TaxResult { amount }) }),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            outcome: Arc::new(move || -> Result<TaxResult> {
                Err(CartTaxError::TaxServiceUnavailable {
                    status: None,
                    message: message.clone(),
                })
            }),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<TaxCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl TaxService for StaticTaxService {
    async fn calculate(&self, subtotal: Decimal, jurisdiction: &str) -> Result<TaxResult> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(TaxCall {
                subtotal,
                jurisdiction: jurisdiction.to_string(),
            });
        (self.outcome)()
    }
}
