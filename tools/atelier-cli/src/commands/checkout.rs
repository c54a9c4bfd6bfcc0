//! Checkout against the in-memory gateway and store.
//!
//! Useful for dry-running pricing, metadata and fulfillment end to end
//! without a payment processor.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use atelier_commerce::checkout::{CheckoutSettings, InMemoryGateway};
use atelier_commerce::orders::{CompletedSession, LogNotifier, CHECKOUT_SESSION_COMPLETED};
use atelier_commerce::prelude::*;
use serde::Serialize;

use super::{configure, walk_to_end, CheckoutArgs};
use crate::context::Context;
use crate::output::status_badge;

#[derive(Serialize)]
struct CheckoutOutcome {
    session_id: CheckoutSessionId,
    url: String,
    amount: Money,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<Order>,
}

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let catalog = Arc::new(ctx.catalog()?);
    let store = Arc::new(InMemoryStore::with_products(ctx.products()?));
    let service = CheckoutService::new(
        catalog.clone(),
        InMemoryGateway::new(ctx.config.checkout.gateway_url.as_str()),
        store.clone(),
    )
    .with_settings(CheckoutSettings {
        site_url: ctx.config.checkout.site_url.trim_end_matches('/').to_string(),
    });

    let locale = args.build.locale.unwrap_or(ctx.config.checkout.locale);
    let user_id = args.user.map(UserId::new);

    let url = match &args.product {
        Some(product) => {
            let request = CheckoutRequest::built(locale, user_id, ProductId::new(product.as_str()));
            service.create_session(&request).await?.url
        }
        None => {
            let mut configurator = configure(&catalog, &args.build)?;
            walk_to_end(&mut configurator)?;
            configurator.submit(&service, locale, user_id).await?
        }
    };

    let (session_id, request) = service
        .gateway()
        .sessions()
        .await
        .pop()
        .ok_or_else(|| anyhow!("The gateway recorded no session"))?;
    let summary = request
        .metadata
        .get("summary")
        .cloned()
        .unwrap_or_default();
    let currency = request.currency().unwrap_or(ctx.config.checkout.currency);
    let amount = Money::new(request.amount_total(), currency);

    let order = if args.complete {
        let fulfillment = FulfillmentService::new(store, LogNotifier)
            .with_atelier_email(ctx.config.notifications.atelier_email.as_str())
            .with_fallback_currency(ctx.config.checkout.currency);
        let event = WebhookEvent {
            event_type: CHECKOUT_SESSION_COMPLETED.to_string(),
            session: CompletedSession {
                id: session_id.clone(),
                metadata: request.metadata.clone(),
                amount_total: Some(request.amount_total()),
                customer_email: None,
                customer_details_email: args.email.clone(),
                currency: Some(currency.processor_code()),
            },
        };
        fulfillment.handle_event(&event).await?
    } else {
        None
    };

    if ctx.output.is_json() {
        ctx.output.json(&CheckoutOutcome {
            session_id,
            url,
            amount,
            summary,
            order,
        });
        return Ok(());
    }

    ctx.output.header("Checkout session");
    ctx.output.kv("session", session_id.as_str());
    ctx.output.kv("summary", &summary);
    ctx.output.kv("amount", &amount.display());
    ctx.output.kv("redirect", &url);
    ctx.output.kv("success_url", &request.success_url);

    if let Some(order) = order {
        ctx.output.info("");
        ctx.output.success(&format!("Order {} created", order.order_number));
        ctx.output.kv("status", &status_badge(order.status.as_str()));
        ctx.output.kv("total", &order.total.display());
        if let Some(email) = &order.customer_email {
            ctx.output.kv("customer", email);
        }
    } else if args.complete {
        ctx.output.warn("Completion event was ignored");
    }

    Ok(())
}
