use async_trait::async_trait;

use crate::{NewPaymentRecord, OrderId, PaymentRecord, Result};

/// Core trait for ledger implementations.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Appends a payment record, assigning its identifier and timestamps.
    async fn save(&self, record: NewPaymentRecord) -> Result<PaymentRecord>;

    /// Returns every record written for an order, oldest first.
    async fn list_for_order(&self, order_id: OrderId) -> Result<Vec<PaymentRecord>>;
}
