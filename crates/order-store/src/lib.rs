//! Inventory-safe order store.
//!
//! Persists an order and its lines in one unit of work together with a
//! conditional inventory decrement for every line, so that an order either
//! exists with all of its stock taken or does not exist at all.

pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod store;

pub use common::{Money, OrderId, OrderLineId, ProductId, UserId};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use order::{NewOrder, NewOrderLine, Order, OrderFilter, OrderLine, DEFAULT_STATUS};
pub use postgres::PostgresOrderStore;
pub use store::OrderStore;
