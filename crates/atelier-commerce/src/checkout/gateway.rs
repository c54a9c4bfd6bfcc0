//! Payment gateway boundary.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use super::{CheckoutError, CheckoutRequest, CheckoutSession, CheckoutSessionRequest};
use crate::ids::CheckoutSessionId;

/// Errors reported by a payment gateway.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The processor refused the session; the message is shown as-is.
    #[error("{0}")]
    Rejected(String),

    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Creates hosted payment sessions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;
}

/// Where the configurator sends a finished build.
///
/// Resolves to the redirect URL, or an error whose message is shown to the
/// customer verbatim.
#[async_trait]
pub trait CheckoutSubmitter: Send + Sync {
    async fn submit(&self, request: CheckoutRequest) -> Result<String, CheckoutError>;
}

/// Gateway that accepts every session and remembers it.
///
/// Session URLs are `<base_url>/<session id>`.
#[derive(Debug)]
pub struct InMemoryGateway {
    base_url: String,
    sessions: Mutex<Vec<(CheckoutSessionId, CheckoutSessionRequest)>>,
}

impl InMemoryGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub async fn sessions(&self) -> Vec<(CheckoutSessionId, CheckoutSessionRequest)> {
        self.sessions.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let id = CheckoutSessionId::generate();
        self.sessions.lock().await.push((id.clone(), request.clone()));
        Ok(CheckoutSession {
            url: format!("{}/{}", self.base_url, id),
            id,
        })
    }
}
