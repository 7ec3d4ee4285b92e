//! Placement tuning.

use std::time::Duration;

/// Bounds on the external calls made while placing an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementConfig {
    /// Maximum time to wait for the payment capability. Exceeding it is
    /// reported as payment unavailable.
    pub payment_timeout: Duration,
    /// Maximum time to wait for the notification capability. Exceeding it
    /// is absorbed like any other notification failure.
    pub notification_timeout: Duration,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            payment_timeout: Duration::from_secs(5),
            notification_timeout: Duration::from_secs(2),
        }
    }
}
