//! Checkout error types.

use common::{OrderId, ProductId};
use order_store::StoreError;
use thiserror::Error;

/// Errors returned to callers of the checkout services.
///
/// Ledger and notification failures never appear here; they are absorbed
/// by the orchestrator and only show up in logs, metrics and
/// [`PlacementReport`](crate::PlacementReport).
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The submitted cart is malformed. Nothing was persisted.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// The requested status is empty.
    #[error("Status must not be empty")]
    InvalidStatus,

    /// A product lacked stock. Nothing was persisted.
    #[error("Insufficient inventory for product {product_id}: requested {requested}")]
    InsufficientInventory {
        product_id: ProductId,
        requested: i64,
    },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The payment capability declined the charge. The order remains
    /// persisted with its initial status.
    #[error("Payment declined for order {order_id}: {reason}")]
    PaymentDeclined { order_id: OrderId, reason: String },

    /// The payment capability could not be reached or timed out. The order
    /// remains persisted with its initial status.
    #[error("Payment unavailable for order {order_id}: {reason}")]
    PaymentUnavailable { order_id: OrderId, reason: String },

    /// Order store error.
    #[error("Order store error: {0}")]
    Store(#[source] StoreError),
}

impl CheckoutError {
    /// Returns the id of the order that was persisted before this error
    /// occurred, if any.
    pub fn persisted_order(&self) -> Option<OrderId> {
        match self {
            CheckoutError::PaymentDeclined { order_id, .. }
            | CheckoutError::PaymentUnavailable { order_id, .. } => Some(*order_id),
            _ => None,
        }
    }
}

impl From<StoreError> for CheckoutError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientInventory {
                product_id,
                requested,
            } => CheckoutError::InsufficientInventory {
                product_id,
                requested,
            },
            StoreError::OrderNotFound(order_id) => CheckoutError::OrderNotFound(order_id),
            other => CheckoutError::Store(other),
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
