//! Checkout through fulfillment with in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use atelier_commerce::checkout::{CheckoutSettings, InMemoryGateway};
use atelier_commerce::orders::{
    CompletedSession, ConfigurationStatus, NotifyError, CHECKOUT_SESSION_COMPLETED,
};
use atelier_commerce::prelude::*;
use tokio::sync::Mutex;

const PAY_URL: &str = "https://pay.example/session";

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<OrderEmail>>,
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn send(&self, email: &OrderEmail) -> Result<(), NotifyError> {
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

struct BrokenNotifier;

#[async_trait]
impl OrderNotifier for BrokenNotifier {
    async fn send(&self, _email: &OrderEmail) -> Result<(), NotifyError> {
        Err(NotifyError::NotConfigured)
    }
}

struct DecliningGateway;

#[async_trait]
impl PaymentGateway for DecliningGateway {
    async fn create_session(
        &self,
        _request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        Err(GatewayError::Rejected("Your card was declined".to_string()))
    }
}

struct HangingSubmitter;

#[async_trait]
impl CheckoutSubmitter for HangingSubmitter {
    async fn submit(&self, _request: CheckoutRequest) -> Result<String, CheckoutError> {
        std::future::pending().await
    }
}

fn heritage(stock: i64, active: bool) -> Product {
    ProductInput {
        id: Some("heritage-36".to_string()),
        name: "Heritage 36".to_string(),
        description: "Ready to wear".to_string(),
        price: 4200.0,
        image: String::new(),
        stock,
        active,
    }
    .into_product(Currency::USD)
    .unwrap()
}

fn service<G: PaymentGateway>(
    catalog: &Arc<CatalogSnapshot>,
    gateway: G,
    store: &Arc<InMemoryStore>,
) -> CheckoutService<G, InMemoryStore> {
    CheckoutService::new(catalog.clone(), gateway, store.clone()).with_settings(CheckoutSettings {
        site_url: "https://civaglia.example".to_string(),
    })
}

fn finished_oak(catalog: &CatalogSnapshot) -> Configurator<'_> {
    let mut configurator = Configurator::new(catalog);
    configurator.select_function(FunctionId::new("oak"));
    for (step, id) in [
        (StepKey::Case, "black"),
        (StepKey::Dial, "onyx-black"),
        (StepKey::Hands, "sword-black"),
        (StepKey::Strap, "rubber-sport"),
    ] {
        configurator
            .set_step_selection(step, Some(OptionId::new(id)))
            .unwrap();
    }
    while !configurator.is_last_step() {
        configurator.advance().unwrap();
    }
    configurator
}

fn completion(session_id: &CheckoutSessionId, request: &CheckoutSessionRequest) -> WebhookEvent {
    WebhookEvent {
        event_type: CHECKOUT_SESSION_COMPLETED.to_string(),
        session: CompletedSession {
            id: session_id.clone(),
            metadata: request.metadata.clone(),
            amount_total: Some(request.amount_total()),
            customer_email: None,
            customer_details_email: Some("buyer@example.com".to_string()),
            currency: request.line_items.first().map(|item| item.currency.clone()),
        },
    }
}

#[tokio::test]
async fn custom_build_is_paid_and_fulfilled() {
    let catalog = Arc::new(default_catalog());
    let store = Arc::new(InMemoryStore::new());
    let checkout = service(&catalog, InMemoryGateway::new(PAY_URL), &store);

    let mut configurator = finished_oak(&catalog);
    let url = configurator
        .submit(&checkout, Locale::Fr, Some(UserId::new("user-7")))
        .await
        .unwrap();
    assert!(url.starts_with(PAY_URL));
    assert!(!configurator.is_submitting());
    assert_eq!(configurator.last_error(), None);

    let sessions = checkout.gateway().sessions().await;
    assert_eq!(sessions.len(), 1);
    let (session_id, request) = &sessions[0];
    assert_eq!(request.amount_total(), 123_000);
    assert_eq!(
        request.metadata["summary"],
        "Custom build · Noir / Noir onyx / Caoutchouc sport"
    );
    assert_eq!(request.metadata["locale"], "fr");
    assert_eq!(request.metadata["type"], "custom");
    assert_eq!(request.metadata["user_id"], "user-7");
    assert_eq!(
        request.success_url,
        "https://civaglia.example/fr/checkout/success?session_id={CHECKOUT_SESSION_ID}"
    );

    let notifier = Arc::new(RecordingNotifier::default());
    let fulfillment = FulfillmentService::new(store.clone(), notifier.clone())
        .with_atelier_email("orders@civaglia.example");
    let order = fulfillment
        .handle_event(&completion(session_id, request))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(order.total, Money::new(123_000, Currency::USD));
    assert_eq!(order.status, OrderStatus::New);
    assert_eq!(order.user_id, Some(UserId::new("user-7")));
    assert_eq!(order.customer_email.as_deref(), Some("buyer@example.com"));
    assert!(order.order_number.starts_with("CT-"));

    let configuration_id = order.configuration_id.clone().unwrap();
    let record = store.get_configuration(&configuration_id).await.unwrap().unwrap();
    assert_eq!(record.status, ConfigurationStatus::Paid);

    let sent = notifier.sent.lock().await;
    let recipients: Vec<&str> = sent.iter().map(|e| e.to.as_str()).collect();
    assert_eq!(recipients, vec!["buyer@example.com", "orders@civaglia.example"]);
    assert!(sent[0].html.contains("$1,230.00"));
}

#[tokio::test]
async fn tampered_price_is_rejected_without_losing_state() {
    let catalog = Arc::new(default_catalog());
    let store = Arc::new(InMemoryStore::new());
    let checkout = service(&catalog, InMemoryGateway::new(PAY_URL), &store);

    let configurator = finished_oak(&catalog);
    let mut payload = configurator.submission_payload().unwrap();
    payload.price = 1.0;

    let err = checkout
        .create_session(&CheckoutRequest::custom(Locale::En, None, payload))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Pricing(CommerceError::PriceMismatch { .. })
    ));
    assert!(checkout.gateway().sessions().await.is_empty());
}

#[tokio::test]
async fn gateway_error_is_surfaced_verbatim() {
    let catalog = Arc::new(default_catalog());
    let store = Arc::new(InMemoryStore::new());
    let checkout = service(&catalog, DecliningGateway, &store);

    let mut configurator = finished_oak(&catalog);
    let before = configurator.state().clone();

    let err = configurator.submit(&checkout, Locale::En, None).await.unwrap_err();
    assert_eq!(err, CheckoutError::Gateway("Your card was declined".to_string()));
    assert_eq!(configurator.last_error(), Some("Your card was declined"));
    assert_eq!(configurator.state(), &before);
    assert!(!configurator.is_submitting());

    // still on the last step, ready to retry or go back
    assert!(configurator.is_last_step());
    assert_eq!(configurator.go_back(), 4);
}

#[tokio::test]
async fn hung_submission_keeps_busy_flag() {
    let catalog = default_catalog();
    let mut configurator = finished_oak(&catalog);

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        configurator.submit(&HangingSubmitter, Locale::En, None),
    )
    .await;
    assert!(outcome.is_err());
    assert!(configurator.is_submitting());

    let err = configurator
        .submit(&HangingSubmitter, Locale::En, None)
        .await
        .unwrap_err();
    assert_eq!(err, CheckoutError::Busy);

    configurator.abandon_submission();
    assert!(!configurator.is_submitting());
}

#[tokio::test]
async fn incomplete_configuration_is_not_submitted() {
    let catalog = default_catalog();
    let mut configurator = Configurator::new(&catalog);
    configurator.select_function(FunctionId::new("oak"));

    let err = configurator
        .submit(&HangingSubmitter, Locale::En, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Pricing(CommerceError::ConfigurationIncomplete(_))
    ));
    assert!(!configurator.is_submitting());
}

#[tokio::test]
async fn built_watch_stock_is_consumed() {
    let catalog = Arc::new(default_catalog());
    let store = Arc::new(InMemoryStore::with_products([heritage(1, true)]));
    let checkout = service(&catalog, InMemoryGateway::new(PAY_URL), &store);
    let request = CheckoutRequest::built(Locale::En, None, ProductId::new("heritage-36"));

    let session = checkout.create_session(&request).await.unwrap();
    let sessions = checkout.gateway().sessions().await;
    let (_, session_request) = &sessions[0];
    assert_eq!(session_request.metadata["summary"], "Built watch · Heritage 36");
    assert_eq!(session_request.amount_total(), 420_000);

    let fulfillment = FulfillmentService::new(store.clone(), BrokenNotifier);
    let order = fulfillment
        .handle_event(&completion(&session.id, session_request))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.summary, "Built watch · Heritage 36");

    let product = store
        .get_product(&ProductId::new("heritage-36"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock, 0);

    assert_eq!(
        checkout.create_session(&request).await.unwrap_err(),
        CheckoutError::OutOfStock("heritage-36".to_string())
    );
}

#[tokio::test]
async fn order_total_keeps_product_currency() {
    let mut product = heritage(2, true);
    product.price = Money::new(420_000, Currency::CAD);
    let catalog = Arc::new(default_catalog());
    let store = Arc::new(InMemoryStore::with_products([product]));
    let checkout = service(&catalog, InMemoryGateway::new(PAY_URL), &store);
    let request = CheckoutRequest::built(Locale::En, None, ProductId::new("heritage-36"));

    let session = checkout.create_session(&request).await.unwrap();
    let sessions = checkout.gateway().sessions().await;
    let (_, session_request) = &sessions[0];
    assert_eq!(session_request.currency(), Some(Currency::CAD));

    let fulfillment = FulfillmentService::new(store.clone(), BrokenNotifier)
        .with_fallback_currency(Currency::USD);
    let order = fulfillment
        .handle_event(&completion(&session.id, session_request))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.total, Money::new(420_000, Currency::CAD));
}

#[tokio::test]
async fn built_checkout_rejections() {
    let catalog = Arc::new(default_catalog());
    let store = Arc::new(InMemoryStore::with_products([heritage(5, false)]));
    let checkout = service(&catalog, InMemoryGateway::new(PAY_URL), &store);

    let inactive = CheckoutRequest::built(Locale::En, None, ProductId::new("heritage-36"));
    assert_eq!(
        checkout.create_session(&inactive).await.unwrap_err(),
        CheckoutError::UnknownProduct("heritage-36".to_string())
    );

    let mut bogus = inactive.clone();
    bogus.kind = "gift".to_string();
    let err = checkout.create_session(&bogus).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid checkout type");
}

#[tokio::test]
async fn admin_tracking_is_visible_to_customer() {
    let store = Arc::new(InMemoryStore::new());
    let fulfillment = FulfillmentService::new(store.clone(), BrokenNotifier);
    let request = CheckoutSessionRequest::payment(
        "https://civaglia.example",
        Locale::En,
        Money::new(50_000, Currency::USD),
        &atelier_commerce::checkout::SessionMetadata::default(),
    );
    let order = fulfillment
        .handle_event(&completion(&CheckoutSessionId::new("cs_admin"), &request))
        .await
        .unwrap()
        .unwrap();

    fulfillment
        .update_tracking(&order.id, "1Z 999", Some(Carrier::Ups), None)
        .await
        .unwrap();
    fulfillment
        .update_status(&order.id, OrderStatus::Shipped)
        .await
        .unwrap();

    let view = fulfillment
        .track_order(&order.order_number.to_lowercase())
        .await
        .unwrap();
    assert_eq!(view.status, OrderStatus::Shipped);
    assert_eq!(view.tracking_carrier, Some(Carrier::Ups));
    assert_eq!(
        view.tracking_url.as_deref(),
        Some("https://www.ups.com/track?tracknum=1Z%20999")
    );

    fulfillment.delete_order(&order.id).await.unwrap();
    assert!(matches!(
        fulfillment.track_order(&order.order_number).await,
        Err(FulfillmentError::NotFound(_))
    ));
}
