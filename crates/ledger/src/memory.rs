use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tokio::sync::RwLock;

use crate::{LedgerError, NewPaymentRecord, OrderId, PaymentRecord, Result, store::LedgerStore};

/// In-memory ledger for testing.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    records: Arc<RwLock<Vec<PaymentRecord>>>,
    fail_on_save: Arc<AtomicBool>,
}

impl InMemoryLedgerStore {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent saves fail.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of records written.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn save(&self, record: NewPaymentRecord) -> Result<PaymentRecord> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("ledger write rejected".to_string()));
        }

        let record = record.into_record(Utc::now().trunc_subsecs(6));
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_for_order(&self, order_id: OrderId) -> Result<Vec<PaymentRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect())
    }
}
