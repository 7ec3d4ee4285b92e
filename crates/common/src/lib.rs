//! Shared types for the order-processing core.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{OrderId, OrderLineId, PaymentId, ProductId, UserId};
