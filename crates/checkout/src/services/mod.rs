//! External collaborators invoked while placing an order.

pub mod notification;
pub mod payment;

pub use notification::{InMemoryNotifier, LogNotifier, NotificationError, Notifier};
pub use payment::{Capture, InMemoryPaymentGateway, PaymentError, PaymentGateway, PaymentReceipt};
