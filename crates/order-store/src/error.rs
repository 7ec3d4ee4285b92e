use thiserror::Error;

use crate::{OrderId, ProductId};

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A line's conditional decrement affected no rows: the product does not
    /// have enough stock (or does not exist). Nothing from the order was kept.
    #[error("Insufficient inventory for product {product_id}: requested {requested}")]
    InsufficientInventory {
        product_id: ProductId,
        requested: i64,
    },

    /// The order was not found in the store.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if the error is an inventory shortfall.
    pub fn is_insufficient_inventory(&self) -> bool {
        matches!(self, StoreError::InsufficientInventory { .. })
    }
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
