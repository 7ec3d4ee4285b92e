//! Outcomes of the best-effort placement steps.

use std::fmt;

use order_store::Order;

use crate::services::PaymentReceipt;

/// How a best-effort step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran and succeeded.
    Completed,
    /// The step failed; the failure was logged and otherwise ignored.
    Absorbed { reason: String },
    /// The step had nothing to do.
    Skipped,
}

impl StepOutcome {
    /// Returns the outcome name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepOutcome::Completed => "completed",
            StepOutcome::Absorbed { .. } => "absorbed",
            StepOutcome::Skipped => "skipped",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed)
    }

    pub fn is_absorbed(&self) -> bool {
        matches!(self, StepOutcome::Absorbed { .. })
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Absorbed { reason } => write!(f, "absorbed ({reason})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Everything that happened during a successful placement.
///
/// `order` is the order exactly as persisted, before payment. A failure in
/// the ledger or notification step only changes the matching outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementReport {
    pub order: Order,
    pub receipt: PaymentReceipt,
    pub ledger: StepOutcome,
    pub notification: StepOutcome,
}
