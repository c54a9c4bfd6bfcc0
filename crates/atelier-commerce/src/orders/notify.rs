//! Order confirmation e-mails.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::Money;

/// Default recipient for atelier notifications.
pub const DEFAULT_ATELIER_EMAIL: &str = "atelier@civagliatimepieces.com";

/// A rendered e-mail ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl OrderEmail {
    /// Confirmation sent to the buyer.
    pub fn customer(to: impl Into<String>, summary: &str, total: Money) -> Self {
        Self {
            to: to.into(),
            subject: "Your Civaglia order is confirmed".to_string(),
            html: format!(
                "<div style=\"font-family:Arial,sans-serif;line-height:1.6\">\
                 <h2>Thank you for your Civaglia order.</h2>\
                 <p>We have received your payment and the atelier is preparing your build.</p>\
                 <p><strong>Summary:</strong> {}</p>\
                 <p><strong>Total:</strong> {}</p>\
                 </div>",
                escape_html(summary),
                total.display()
            ),
        }
    }

    /// Heads-up sent to the atelier.
    pub fn atelier(to: impl Into<String>, summary: &str, total: Money) -> Self {
        Self {
            to: to.into(),
            subject: "New Civaglia order received".to_string(),
            html: format!(
                "<div style=\"font-family:Arial,sans-serif;line-height:1.6\">\
                 <h2>New order received</h2>\
                 <p><strong>Summary:</strong> {}</p>\
                 <p><strong>Total:</strong> {}</p>\
                 <p>Please check the dashboard for configuration details.</p>\
                 </div>",
                escape_html(summary),
                total.display()
            ),
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    #[error("Mail transport is not configured")]
    NotConfigured,

    #[error("Failed to send mail: {0}")]
    Transport(String),
}

/// E-mail transport.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn send(&self, email: &OrderEmail) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: OrderNotifier + ?Sized> OrderNotifier for Arc<T> {
    async fn send(&self, email: &OrderEmail) -> Result<(), NotifyError> {
        (**self).send(email).await
    }
}

/// Notifier that only logs; used when no transport is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn send(&self, email: &OrderEmail) -> Result<(), NotifyError> {
        tracing::info!(to = %email.to, subject = %email.subject, "order e-mail");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_customer_email_contents() {
        let email = OrderEmail::customer(
            "buyer@example.com",
            "Custom build · Black / Onyx Black / Rubber Sport",
            Money::new(123_000, Currency::USD),
        );
        assert_eq!(email.to, "buyer@example.com");
        assert!(email.subject.contains("confirmed"));
        assert!(email.html.contains("$1,230.00"));
        assert!(email.html.contains("Black / Onyx Black"));
    }

    #[test]
    fn test_summary_is_escaped() {
        let email = OrderEmail::atelier(
            DEFAULT_ATELIER_EMAIL,
            "<b>x</b> & co",
            Money::zero(Currency::USD),
        );
        assert!(email.html.contains("&lt;b&gt;x&lt;/b&gt; &amp; co"));
    }
}
