//! Payment capability trait and in-memory implementation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use common::{Money, UserId};
use thiserror::Error;

/// Result of a successful payment capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Opaque receipt identifier assigned by the provider.
    pub receipt_id: String,
}

/// Errors reported by a payment capability.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The provider refused the charge.
    #[error("Payment declined: {0}")]
    Declined(String),

    /// The provider could not be reached.
    #[error("Payment provider unavailable: {0}")]
    Unavailable(String),
}

/// Trait for capturing funds.
///
/// Treated as stateless by the orchestrator: no retry or idempotency key is
/// generated on the caller side.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Captures `amount` from the user.
    async fn charge(&self, user_id: UserId, amount: Money) -> Result<PaymentReceipt, PaymentError>;

    /// Provider tag written to the payment ledger.
    fn provider(&self) -> &str;
}

/// A capture accepted by [`InMemoryPaymentGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub receipt_id: String,
    pub user_id: UserId,
    pub amount: Money,
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    captures: Vec<Capture>,
    next_id: u32,
    fail_on_charge: bool,
    unavailable: bool,
    latency: Duration,
}

/// In-memory payment gateway for testing and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<Mutex<InMemoryPaymentState>>,
}

impl InMemoryPaymentGateway {
    /// Provider tag reported by this gateway.
    pub const PROVIDER: &'static str = "in-memory";

    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline charges.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.lock().fail_on_charge = fail;
    }

    /// Configures the gateway to report itself unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Delays every charge, simulating a remote call.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Returns the number of accepted captures.
    pub fn capture_count(&self) -> usize {
        self.lock().captures.len()
    }

    /// Returns every accepted capture in order.
    pub fn captures(&self) -> Vec<Capture> {
        self.lock().captures.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryPaymentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn charge(&self, user_id: UserId, amount: Money) -> Result<PaymentReceipt, PaymentError> {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.lock();

        if state.unavailable {
            return Err(PaymentError::Unavailable("connection reset".to_string()));
        }
        if state.fail_on_charge {
            return Err(PaymentError::Declined("card declined".to_string()));
        }

        state.next_id += 1;
        let receipt_id = format!("RCPT-{:04}", state.next_id);
        state.captures.push(Capture {
            receipt_id: receipt_id.clone(),
            user_id,
            amount,
        });

        Ok(PaymentReceipt { receipt_id })
    }

    fn provider(&self) -> &str {
        Self::PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_charge_records_capture() {
        let gateway = InMemoryPaymentGateway::new();
        let user_id = UserId::new();

        let receipt = gateway
            .charge(user_id, Money::from_cents(5000))
            .await
            .unwrap();

        assert!(receipt.receipt_id.starts_with("RCPT-"));
        assert_eq!(
            gateway.captures(),
            vec![Capture {
                receipt_id: receipt.receipt_id,
                user_id,
                amount: Money::from_cents(5000),
            }]
        );
    }

    #[tokio::test]
    async fn test_fail_on_charge_declines() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_fail_on_charge(true);

        let result = gateway.charge(UserId::new(), Money::from_cents(100)).await;
        assert!(matches!(result, Err(PaymentError::Declined(_))));
        assert_eq!(gateway.capture_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let gateway = InMemoryPaymentGateway::new();
        gateway.set_unavailable(true);

        let result = gateway.charge(UserId::new(), Money::from_cents(100)).await;
        assert!(matches!(result, Err(PaymentError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_sequential_receipt_ids() {
        let gateway = InMemoryPaymentGateway::new();
        let user_id = UserId::new();

        let r1 = gateway.charge(user_id, Money::zero()).await.unwrap();
        let r2 = gateway.charge(user_id, Money::zero()).await.unwrap();

        assert_eq!(r1.receipt_id, "RCPT-0001");
        assert_eq!(r2.receipt_id, "RCPT-0002");
        assert_eq!(gateway.provider(), "in-memory");
    }
}
