//! Order placement orchestrator.

use std::time::Instant;

use common::{Money, UserId};
use ledger::{LedgerStore, NewPaymentRecord};
use order_store::{DEFAULT_STATUS, NewOrder, Order, OrderId, OrderStore};

use crate::config::PlacementConfig;
use crate::error::{CheckoutError, Result};
use crate::order_placement::{
    STEP_CHARGE_PAYMENT, STEP_NOTIFY_CUSTOMER, STEP_PERSIST_ORDER, STEP_RECORD_PAYMENT,
    STEP_VALIDATE,
};
use crate::outcome::{PlacementReport, StepOutcome};
use crate::services::{Notifier, PaymentError, PaymentGateway, PaymentReceipt};

/// A request to place an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub order: NewOrder,
    /// Where to send the confirmation. No address, no notification.
    pub notify: Option<String>,
}

impl PlaceOrder {
    pub fn new(order: NewOrder) -> Self {
        Self {
            order,
            notify: None,
        }
    }

    /// Requests a confirmation to be sent to `address`.
    pub fn notify(mut self, address: impl Into<String>) -> Self {
        self.notify = Some(address.into());
        self
    }
}

/// Places orders: persist with stock, charge, then record and notify.
///
/// Holds no per-call state; one instance serves any number of concurrent
/// placements.
pub struct OrderPlacement<S, L, P, N>
where
    S: OrderStore,
    L: LedgerStore,
    P: PaymentGateway,
    N: Notifier,
{
    store: S,
    ledger: L,
    payment: P,
    notifier: N,
    config: PlacementConfig,
}

impl<S, L, P, N> OrderPlacement<S, L, P, N>
where
    S: OrderStore,
    L: LedgerStore,
    P: PaymentGateway,
    N: Notifier,
{
    /// Creates an orchestrator with default timeouts.
    pub fn new(store: S, ledger: L, payment: P, notifier: N) -> Self {
        Self {
            store,
            ledger,
            payment,
            notifier,
            config: PlacementConfig::default(),
        }
    }

    /// Replaces the timeouts.
    pub fn with_config(mut self, config: PlacementConfig) -> Self {
        self.config = config;
        self
    }

    /// Places an order and returns it as persisted, before payment.
    ///
    /// Ledger and notification failures do not affect the result.
    pub async fn place(&self, request: PlaceOrder) -> Result<Order> {
        self.place_with_report(request)
            .await
            .map(|report| report.order)
    }

    /// Places an order and reports the outcome of every best-effort step.
    ///
    /// Fails with `InvalidOrder` or `InsufficientInventory` without touching
    /// anything. Fails with `PaymentDeclined` or `PaymentUnavailable` after
    /// the order has been persisted; the order is not rolled back.
    #[tracing::instrument(
        skip(self, request),
        fields(user_id = %request.order.user_id, lines = request.order.lines.len())
    )]
    pub async fn place_with_report(&self, request: PlaceOrder) -> Result<PlacementReport> {
        metrics::counter!("order_placements_total").increment(1);
        let start = Instant::now();

        let result = self.run(request).await;

        let outcome = if result.is_ok() { "placed" } else { "failed" };
        let duration = start.elapsed().as_secs_f64();
        metrics::histogram!("order_placement_duration_seconds", "outcome" => outcome)
            .record(duration);
        tracing::debug!(outcome, duration, "placement finished");

        result
    }

    async fn run(&self, request: PlaceOrder) -> Result<PlacementReport> {
        let PlaceOrder { mut order, notify } = request;

        if let Err(err) = validate(&order) {
            return Err(self.fail(STEP_VALIDATE, err));
        }
        if order.status.trim().is_empty() {
            order.status = DEFAULT_STATUS.to_string();
        }
        warn_on_total_mismatch(&order);

        let user_id = order.user_id;
        let total = order.total;

        let saved = match self.store.save(order).await {
            Ok(saved) => saved,
            Err(err) => return Err(self.fail(STEP_PERSIST_ORDER, err.into())),
        };
        tracing::info!(order_id = %saved.id, %total, "order persisted");

        let receipt = match self.charge(saved.id, user_id, total).await {
            Ok(receipt) => receipt,
            Err(err) => return Err(self.fail(STEP_CHARGE_PAYMENT, err)),
        };
        tracing::info!(order_id = %saved.id, receipt_id = %receipt.receipt_id, "payment captured");

        let ledger = self.record_payment(&saved, &receipt).await;
        let notification = self.notify_customer(saved.id, notify.as_deref()).await;

        tracing::info!(
            order_id = %saved.id,
            ledger = %ledger,
            notification = %notification,
            "order placed"
        );

        Ok(PlacementReport {
            order: saved,
            receipt,
            ledger,
            notification,
        })
    }

    async fn charge(
        &self,
        order_id: OrderId,
        user_id: UserId,
        total: Money,
    ) -> Result<PaymentReceipt> {
        let charge = self.payment.charge(user_id, total);
        match tokio::time::timeout(self.config.payment_timeout, charge).await {
            Ok(Ok(receipt)) => Ok(receipt),
            Ok(Err(PaymentError::Declined(reason))) => {
                Err(CheckoutError::PaymentDeclined { order_id, reason })
            }
            Ok(Err(PaymentError::Unavailable(reason))) => {
                Err(CheckoutError::PaymentUnavailable { order_id, reason })
            }
            Err(_) => Err(CheckoutError::PaymentUnavailable {
                order_id,
                reason: format!(
                    "no response within {}ms",
                    self.config.payment_timeout.as_millis()
                ),
            }),
        }
    }

    async fn record_payment(&self, order: &Order, receipt: &PaymentReceipt) -> StepOutcome {
        let record = NewPaymentRecord::captured(
            order.id,
            order.user_id,
            order.total,
            self.payment.provider(),
            receipt.receipt_id.clone(),
        );

        match self.ledger.save(record).await {
            Ok(_) => StepOutcome::Completed,
            Err(err) => self.absorb(STEP_RECORD_PAYMENT, order.id, err.to_string()),
        }
    }

    async fn notify_customer(&self, order_id: OrderId, address: Option<&str>) -> StepOutcome {
        let Some(address) = address else {
            return StepOutcome::Skipped;
        };

        let send = self.notifier.send_order_confirmation(address, order_id);
        match tokio::time::timeout(self.config.notification_timeout, send).await {
            Ok(Ok(())) => StepOutcome::Completed,
            Ok(Err(err)) => self.absorb(STEP_NOTIFY_CUSTOMER, order_id, err.to_string()),
            Err(_) => self.absorb(
                STEP_NOTIFY_CUSTOMER,
                order_id,
                format!(
                    "no response within {}ms",
                    self.config.notification_timeout.as_millis()
                ),
            ),
        }
    }

    fn fail(&self, stage: &'static str, err: CheckoutError) -> CheckoutError {
        metrics::counter!("order_placements_failed", "stage" => stage).increment(1);
        match err.persisted_order() {
            Some(order_id) => {
                tracing::error!(%order_id, stage, error = %err, "order persisted but not paid")
            }
            None => tracing::warn!(stage, error = %err, "order placement failed"),
        }
        err
    }

    fn absorb(&self, step: &'static str, order_id: OrderId, reason: String) -> StepOutcome {
        metrics::counter!("order_placement_absorbed_failures", "step" => step).increment(1);
        tracing::warn!(%order_id, step, %reason, "best-effort step failed");
        StepOutcome::Absorbed { reason }
    }
}

fn validate(order: &NewOrder) -> Result<()> {
    if order.total.is_negative() {
        return Err(CheckoutError::InvalidOrder(format!(
            "total must not be negative, got {}",
            order.total.cents()
        )));
    }

    for (position, line) in order.lines.iter().enumerate() {
        if line.quantity <= 0 {
            return Err(CheckoutError::InvalidOrder(format!(
                "line {position}: quantity must be positive, got {}",
                line.quantity
            )));
        }
        if line.unit_price.is_negative() {
            return Err(CheckoutError::InvalidOrder(format!(
                "line {position}: price must not be negative, got {}",
                line.unit_price.cents()
            )));
        }
    }

    Ok(())
}

/// The submitted total is trusted as-is.
fn warn_on_total_mismatch(order: &NewOrder) {
    match order.line_total() {
        Some(expected) if expected == order.total => {}
        Some(expected) => tracing::warn!(
            submitted = %order.total,
            %expected,
            "submitted total differs from line total"
        ),
        None => tracing::warn!(submitted = %order.total, "line total overflows"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use common::{ProductId, UserId};
    use ledger::InMemoryLedgerStore;
    use order_store::InMemoryOrderStore;

    use super::*;
    use crate::services::{InMemoryNotifier, InMemoryPaymentGateway};

    type TestPlacement = OrderPlacement<
        InMemoryOrderStore,
        InMemoryLedgerStore,
        InMemoryPaymentGateway,
        InMemoryNotifier,
    >;

    struct Harness {
        placement: TestPlacement,
        store: InMemoryOrderStore,
        ledger: InMemoryLedgerStore,
        payment: InMemoryPaymentGateway,
        notifier: InMemoryNotifier,
    }

    fn harness() -> Harness {
        let store = InMemoryOrderStore::new();
        let ledger = InMemoryLedgerStore::new();
        let payment = InMemoryPaymentGateway::new();
        let notifier = InMemoryNotifier::new();
        let placement = OrderPlacement::new(
            store.clone(),
            ledger.clone(),
            payment.clone(),
            notifier.clone(),
        );
        Harness {
            placement,
            store,
            ledger,
            payment,
            notifier,
        }
    }

    async fn stocked_order(h: &Harness, stock: i64, quantity: i64) -> NewOrder {
        let product_id = ProductId::new();
        h.store.set_inventory(product_id, stock).await;
        NewOrder::new(UserId::new(), Money::from_cents(quantity * 1000)).with_line(
            product_id,
            quantity,
            Money::from_cents(1000),
        )
    }

    #[tokio::test]
    async fn test_happy_path_runs_every_step() {
        let h = harness();
        let order = stocked_order(&h, 5, 2).await;

        let report = h
            .placement
            .place_with_report(PlaceOrder::new(order).notify("user@example.com"))
            .await
            .unwrap();

        assert_eq!(report.order.status, DEFAULT_STATUS);
        assert_eq!(report.ledger, StepOutcome::Completed);
        assert_eq!(report.notification, StepOutcome::Completed);
        assert_eq!(report.receipt.receipt_id, "RCPT-0001");
        assert_eq!(h.payment.capture_count(), 1);
        assert_eq!(h.ledger.record_count().await, 1);
        assert_eq!(
            h.notifier.sent(),
            vec![("user@example.com".to_string(), report.order.id)]
        );
    }

    #[tokio::test]
    async fn test_supplied_status_is_kept() {
        let h = harness();
        let order = stocked_order(&h, 5, 1).await.with_status("pending_review");

        let placed = h.placement.place(PlaceOrder::new(order)).await.unwrap();
        assert_eq!(placed.status, "pending_review");
    }

    #[tokio::test]
    async fn test_no_address_skips_notification() {
        let h = harness();
        let order = stocked_order(&h, 5, 1).await;

        let report = h
            .placement
            .place_with_report(PlaceOrder::new(order))
            .await
            .unwrap();

        assert_eq!(report.notification, StepOutcome::Skipped);
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected_before_persisting() {
        let h = harness();
        let product_id = ProductId::new();
        h.store.set_inventory(product_id, 5).await;
        let order = NewOrder::new(UserId::new(), Money::zero()).with_line(
            product_id,
            0,
            Money::from_cents(100),
        );

        let err = h.placement.place(PlaceOrder::new(order)).await.unwrap_err();

        assert!(matches!(err, CheckoutError::InvalidOrder(_)));
        assert_eq!(h.store.order_count().await, 0);
        assert_eq!(h.payment.capture_count(), 0);
    }

    #[tokio::test]
    async fn test_negative_price_and_total_are_rejected() {
        let h = harness();
        let product_id = ProductId::new();

        let negative_price = NewOrder::new(UserId::new(), Money::zero()).with_line(
            product_id,
            1,
            Money::from_cents(-1),
        );
        let negative_total = NewOrder::new(UserId::new(), Money::from_cents(-5));

        for order in [negative_price, negative_total] {
            let err = h.placement.place(PlaceOrder::new(order)).await.unwrap_err();
            assert!(matches!(err, CheckoutError::InvalidOrder(_)));
        }
        assert_eq!(h.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_store_unavailable_is_store_error() {
        let h = harness();
        let order = stocked_order(&h, 5, 1).await;
        h.store.set_fail_on_save(true);

        let err = h.placement.place(PlaceOrder::new(order)).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Store(_)));
        assert_eq!(h.payment.capture_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_payment_keeps_order() {
        let h = harness();
        let order = stocked_order(&h, 5, 1).await;
        h.payment.set_unavailable(true);

        let err = h.placement.place(PlaceOrder::new(order)).await.unwrap_err();

        let order_id = err.persisted_order().unwrap();
        assert!(matches!(err, CheckoutError::PaymentUnavailable { .. }));
        assert_eq!(
            h.store.get_by_id(order_id).await.unwrap().status,
            DEFAULT_STATUS
        );
        assert_eq!(h.ledger.record_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_timeout_is_unavailable() {
        let h = harness();
        let placement = h.placement.with_config(PlacementConfig {
            payment_timeout: Duration::from_millis(100),
            notification_timeout: Duration::from_secs(2),
        });
        let product_id = ProductId::new();
        h.store.set_inventory(product_id, 5).await;
        h.payment.set_latency(Duration::from_secs(10));

        let order = NewOrder::new(UserId::new(), Money::from_cents(100)).with_line(
            product_id,
            1,
            Money::from_cents(100),
        );
        let err = placement.place(PlaceOrder::new(order)).await.unwrap_err();

        assert!(matches!(err, CheckoutError::PaymentUnavailable { .. }));
        assert_eq!(h.store.order_count().await, 1);
        assert_eq!(h.store.inventory(product_id).await, Some(4));
    }

    #[tokio::test]
    async fn test_ledger_failure_is_absorbed() {
        let h = harness();
        let order = stocked_order(&h, 5, 1).await;
        h.ledger.set_fail_on_save(true);

        let report = h
            .placement
            .place_with_report(PlaceOrder::new(order))
            .await
            .unwrap();

        assert!(report.ledger.is_absorbed());
        assert_eq!(h.payment.capture_count(), 1);
    }

    #[test]
    fn test_validate_accepts_empty_order() {
        assert!(validate(&NewOrder::new(UserId::new(), Money::zero())).is_ok());
    }
}
