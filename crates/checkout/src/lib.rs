//! Order placement for the retail backend.
//!
//! Placing an order is a short saga:
//! 1. Persist the order and take its stock (atomic, fatal on failure)
//! 2. Capture payment (fatal on failure, the order stays persisted)
//! 3. Record the capture in the payment ledger (best-effort)
//! 4. Send the customer a confirmation (best-effort)
//!
//! Nothing is compensated once step 1 has committed.

pub mod config;
pub mod error;
pub mod order_placement;
pub mod outcome;
pub mod placement;
pub mod query;
pub mod services;
pub mod status;

pub use config::PlacementConfig;
pub use error::{CheckoutError, Result};
pub use outcome::{PlacementReport, StepOutcome};
pub use placement::{OrderPlacement, PlaceOrder};
pub use query::OrderQueries;
pub use services::{
    Capture, InMemoryNotifier, InMemoryPaymentGateway, LogNotifier, NotificationError, Notifier,
    PaymentError, PaymentGateway, PaymentReceipt,
};
pub use status::StatusTransitions;
