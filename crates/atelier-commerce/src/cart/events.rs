//! Cart notifications for the UI layer.
//!
//! Publishers fire and forget; every subscriber gets its own copy.

use std::time::Duration;

use crate::configurator::ConfigLineItem;
use crate::ids::CartItemId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

const CHANNEL_CAPACITY: usize = 32;

/// Something happened to the cart that the UI may want to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded {
        cart_item_id: CartItemId,
        /// Breakdown shown in the toast for custom builds.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line_items: Option<Vec<ConfigLineItem>>,
    },
}

impl CartEvent {
    pub fn is_custom_build(&self) -> bool {
        match self {
            CartEvent::ItemAdded { line_items, .. } => line_items.is_some(),
        }
    }

    /// How long the confirmation toast stays up.
    pub fn toast_duration(&self) -> Duration {
        if self.is_custom_build() {
            Duration::from_millis(8000)
        } else {
            Duration::from_millis(2500)
        }
    }
}

/// Publish/subscribe channel for [`CartEvent`]s.
#[derive(Debug, Clone)]
pub struct CartEvents {
    sender: broadcast::Sender<CartEvent>,
}

impl CartEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.sender.subscribe()
    }

    /// Send an event; returns how many subscribers received it.
    pub fn publish(&self, event: CartEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!("cart event dropped, no subscribers");
                0
            }
        }
    }
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}
