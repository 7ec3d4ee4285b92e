//! Notification capability trait and implementations.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use common::OrderId;
use thiserror::Error;

/// Error reported by a notification capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Notification failed: {0}")]
pub struct NotificationError(pub String);

/// Trait for telling a customer about their order.
///
/// Delivery is best-effort; callers never retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends an order confirmation to `address`.
    async fn send_order_confirmation(
        &self,
        address: &str,
        order_id: OrderId,
    ) -> Result<(), NotificationError>;
}

/// Notifier that only emits a log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_order_confirmation(
        &self,
        address: &str,
        order_id: OrderId,
    ) -> Result<(), NotificationError> {
        tracing::info!(%order_id, to = address, "order confirmation sent");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    sent: Vec<(String, OrderId)>,
    fail_on_send: bool,
}

/// In-memory notifier for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<Mutex<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    /// Creates a new in-memory notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail every send.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.lock().fail_on_send = fail;
    }

    /// Returns every delivered `(address, order_id)` pair.
    pub fn sent(&self) -> Vec<(String, OrderId)> {
        self.lock().sent.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryNotifierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn send_order_confirmation(
        &self,
        address: &str,
        order_id: OrderId,
    ) -> Result<(), NotificationError> {
        let mut state = self.lock();
        if state.fail_on_send {
            return Err(NotificationError("mailbox unavailable".to_string()));
        }
        state.sent.push((address.to_string(), order_id));
        Ok(())
    }
}
