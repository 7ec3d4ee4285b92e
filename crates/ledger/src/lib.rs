//! Payment ledger.
//!
//! An append-only record of payment captures, keyed to orders but kept
//! independent of the order tables.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{Money, OrderId, PaymentId, UserId};
pub use error::{LedgerError, Result};
pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use record::{NewPaymentRecord, PaymentRecord, STATUS_CAPTURED};
pub use store::LedgerStore;
