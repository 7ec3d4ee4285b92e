//! Payment ledger records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Money, OrderId, PaymentId, UserId};

/// Status recorded for a successful capture.
pub const STATUS_CAPTURED: &str = "captured";

/// A persisted payment capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    /// The order the capture was made for. Not enforced as a foreign key.
    pub order_id: OrderId,
    pub user_id: UserId,
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    /// Tag of the payment provider that issued the receipt.
    pub provider: String,
    /// Opaque receipt identifier returned by the provider.
    pub receipt_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A payment capture to be written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaymentRecord {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub amount: Money,
    pub provider: String,
    pub receipt_id: String,
    pub status: String,
}

impl NewPaymentRecord {
    /// Describes a captured charge.
    pub fn captured(
        order_id: OrderId,
        user_id: UserId,
        amount: Money,
        provider: impl Into<String>,
        receipt_id: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            user_id,
            amount,
            provider: provider.into(),
            receipt_id: receipt_id.into(),
            status: STATUS_CAPTURED.to_string(),
        }
    }

    /// Assigns an identifier and timestamps.
    pub fn into_record(self, now: DateTime<Utc>) -> PaymentRecord {
        PaymentRecord {
            id: PaymentId::new(),
            order_id: self.order_id,
            user_id: self.user_id,
            amount: self.amount,
            provider: self.provider,
            receipt_id: self.receipt_id,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}
