//! Order placement step names, used in logs and metric labels.

/// Step name: validate the submitted cart.
pub const STEP_VALIDATE: &str = "validate";

/// Step name: persist the order and decrement inventory.
pub const STEP_PERSIST_ORDER: &str = "persist_order";

/// Step name: capture payment for the order total.
pub const STEP_CHARGE_PAYMENT: &str = "charge_payment";

/// Step name: write the capture to the payment ledger.
pub const STEP_RECORD_PAYMENT: &str = "record_payment";

/// Step name: send the order confirmation.
pub const STEP_NOTIFY_CUSTOMER: &str = "notify_customer";
