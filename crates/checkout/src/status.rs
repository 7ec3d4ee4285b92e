//! Order status updates.

use order_store::{Order, OrderId, OrderStore};

use crate::error::{CheckoutError, Result};

/// Sets an order's status.
///
/// Any non-empty status is accepted from any current status.
pub struct StatusTransitions<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> StatusTransitions<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Replaces the status of an order, trimming surrounding whitespace.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, order_id: OrderId, status: &str) -> Result<Order> {
        let status = status.trim();
        if status.is_empty() {
            return Err(CheckoutError::InvalidStatus);
        }

        let order = self.store.update_status(order_id, status).await?;
        tracing::info!(%order_id, status, "order status updated");
        Ok(order)
    }
}
