use async_trait::async_trait;

use crate::{NewOrder, Order, OrderFilter, OrderId, Result, UserId};

/// Core trait for order store implementations.
///
/// All implementations must be thread-safe (Send + Sync) and hold no
/// per-call state, so one instance can serve any number of concurrent
/// callers.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order and its lines, decrementing inventory for every
    /// line with a positive quantity.
    ///
    /// The write is atomic: if any line's product lacks stock the call fails
    /// with `InsufficientInventory` and neither the order, its lines, nor any
    /// other line's decrement survive. Two concurrent saves can never both
    /// succeed when together they would drive a product's stock negative.
    ///
    /// Returns the order as persisted, with identifiers and timestamps.
    async fn save(&self, order: NewOrder) -> Result<Order>;

    /// Sets an order's status and refreshes its update timestamp.
    ///
    /// Returns `OrderNotFound` if the order does not exist.
    async fn update_status(&self, order_id: OrderId, status: &str) -> Result<Order>;

    /// Loads a single order with its lines.
    async fn get_by_id(&self, order_id: OrderId) -> Result<Order>;

    /// Lists a user's orders with their lines, oldest first.
    async fn list_by_user(&self, user_id: UserId, filter: OrderFilter) -> Result<Vec<Order>>;
}
