//! Server-side checkout: validates the request, prices it, records it and
//! opens a payment session.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use super::{
    CheckoutRequest, CheckoutSession, CheckoutSessionRequest, CheckoutSubmitter, CheckoutType,
    PaymentGateway, SessionMetadata,
};
use crate::catalog::{CatalogSnapshot, StepKey};
use crate::configurator::{reprice, LineSource, PricedConfiguration};
use crate::error::CommerceError;
use crate::i18n::Locale;
use crate::orders::{ConfigurationOptions, ConfigurationRecord, OrderStore, StoreError};

/// Checkout errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    #[error("Invalid checkout type")]
    InvalidType(String),

    #[error("Unknown product")]
    UnknownProduct(String),

    #[error("Out of stock")]
    OutOfStock(String),

    /// The configuration could not be priced on the server.
    #[error(transparent)]
    Pricing(#[from] CommerceError),

    /// Gateway message, passed through unchanged.
    #[error("{0}")]
    Gateway(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("A checkout request is already in progress")]
    Busy,
}

/// Site settings used to build sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Public base URL, without trailing slash.
    pub site_url: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            site_url: "http://localhost:3000".to_string(),
        }
    }
}

/// Creates payment sessions for custom builds and built watches.
pub struct CheckoutService<G: PaymentGateway, S: OrderStore> {
    catalog: Arc<CatalogSnapshot>,
    gateway: G,
    store: Arc<S>,
    settings: CheckoutSettings,
}

impl<G: PaymentGateway, S: OrderStore> CheckoutService<G, S> {
    pub fn new(catalog: Arc<CatalogSnapshot>, gateway: G, store: Arc<S>) -> Self {
        Self {
            catalog,
            gateway,
            store,
            settings: CheckoutSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CheckoutSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Validate and price a request and record it as a pending configuration.
    ///
    /// Returns the session request without contacting the gateway.
    pub async fn prepare_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSessionRequest, CheckoutError> {
        let kind = request
            .checkout_type()
            .ok_or_else(|| CheckoutError::InvalidType(request.kind.clone()))?;

        let (options, summary, amount) = match kind {
            CheckoutType::Custom => {
                let payload = request.configuration.as_ref().ok_or_else(|| {
                    CommerceError::ConfigurationIncomplete("configuration".to_string())
                })?;
                let priced = reprice(&self.catalog, payload, request.locale)?;
                let summary = custom_summary(&self.catalog, &priced, request.locale);
                let options = ConfigurationOptions::Custom {
                    configuration: payload.clone(),
                };
                (options, summary, priced.total)
            }
            CheckoutType::Built => {
                let product_id = request
                    .product_id
                    .as_ref()
                    .ok_or_else(|| CheckoutError::UnknownProduct(String::new()))?;
                let product = self
                    .store
                    .get_product(product_id)
                    .await?
                    .filter(|p| p.active)
                    .ok_or_else(|| CheckoutError::UnknownProduct(product_id.to_string()))?;
                if product.stock < 1 {
                    warn!(product = %product.id, "checkout for sold-out product");
                    return Err(CheckoutError::OutOfStock(product.id.to_string()));
                }
                let summary = format!("Built watch · {}", product.name);
                let options = ConfigurationOptions::Built {
                    product_id: product.id.clone(),
                    title: product.name.clone(),
                };
                (options, summary, product.price)
            }
        };

        let record = ConfigurationRecord::pending(options, amount, request.user_id.clone());
        let metadata = SessionMetadata::new(
            Some(record.id.clone()),
            summary,
            request.locale,
            kind,
            request.user_id.clone(),
        );
        self.store.insert_configuration(record).await?;

        Ok(CheckoutSessionRequest::payment(
            &self.settings.site_url,
            request.locale,
            amount,
            &metadata,
        ))
    }

    /// Open a payment session for a request.
    pub async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let session_request = self.prepare_session(request).await?;
        let session = self
            .gateway
            .create_session(&session_request)
            .await
            .map_err(|err| CheckoutError::Gateway(err.to_string()))?;

        info!(
            session = %session.id,
            kind = %request.kind,
            amount = session_request.amount_total(),
            "checkout session created"
        );
        Ok(session)
    }
}

#[async_trait]
impl<G: PaymentGateway, S: OrderStore> CheckoutSubmitter for CheckoutService<G, S> {
    async fn submit(&self, request: CheckoutRequest) -> Result<String, CheckoutError> {
        Ok(self.create_session(&request).await?.url)
    }
}

/// `Custom build · <case> / <dial> / <strap>`, labels in the request locale.
fn custom_summary(
    catalog: &CatalogSnapshot,
    priced: &PricedConfiguration,
    locale: Locale,
) -> String {
    let label = |step: StepKey| {
        priced
            .line_items
            .iter()
            .find_map(|item| match &item.source {
                LineSource::Option(id) if item.step == step => {
                    catalog.resolve_option(step, priced.function.as_ref(), id)
                }
                _ => None,
            })
            .map(|option| option.label.get(locale))
            .unwrap_or("-")
    };
    format!(
        "Custom build · {} / {} / {}",
        label(StepKey::Case),
        label(StepKey::Dial),
        label(StepKey::Strap)
    )
}
