//! Order and order line rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Money, OrderId, OrderLineId, ProductId, UserId};

/// Status given to an order when the caller does not supply one.
pub const DEFAULT_STATUS: &str = "created";

/// An order as persisted, with its lines in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Free-form lifecycle status ("created", "paid", "shipped", ...).
    pub status: String,
    #[serde(rename = "total_cents")]
    pub total: Money,
    #[serde(rename = "items")]
    pub lines: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of `unit_price * quantity` over all lines, or None on overflow.
    pub fn line_total(&self) -> Option<Money> {
        sum_lines(self.lines.iter().map(|l| (l.unit_price, l.quantity)))
    }

    /// Units each product must give up, keyed and ordered by product id.
    ///
    /// Lines naming the same product are merged; lines without a positive
    /// quantity take nothing. Stores decrement stock in this order so
    /// concurrent orders lock product rows in the same sequence.
    pub fn stock_demand(&self) -> BTreeMap<ProductId, i64> {
        let mut demand = BTreeMap::new();
        for line in self.lines.iter().filter(|l| l.quantity > 0) {
            let units: &mut i64 = demand.entry(line.product_id).or_default();
            *units = units.saturating_add(line.quantity);
        }
        demand
    }
}

/// A single product line owned by an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    #[serde(rename = "price_cents")]
    pub unit_price: Money,
    /// Zero-based index of the line within its order.
    pub position: i32,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// An order submitted for persistence.
///
/// The identifier may be left empty; the store assigns one together with the
/// creation and update timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewOrder {
    pub id: Option<OrderId>,
    pub user_id: UserId,
    pub status: String,
    pub total: Money,
    pub lines: Vec<NewOrderLine>,
}

/// A line of a [`NewOrder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub id: Option<OrderLineId>,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

impl NewOrderLine {
    /// Creates a line without an identifier.
    pub fn new(product_id: ProductId, quantity: i64, unit_price: Money) -> Self {
        Self {
            id: None,
            product_id,
            quantity,
            unit_price,
        }
    }
}

impl NewOrder {
    /// Creates an empty order for a user with the given submitted total.
    pub fn new(user_id: UserId, total: Money) -> Self {
        Self {
            id: None,
            user_id,
            status: String::new(),
            total,
            lines: Vec::new(),
        }
    }

    /// Adds a line.
    pub fn with_line(mut self, product_id: ProductId, quantity: i64, unit_price: Money) -> Self {
        self.lines
            .push(NewOrderLine::new(product_id, quantity, unit_price));
        self
    }

    /// Sets the initial status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sum of `unit_price * quantity` over all lines, or None on overflow.
    pub fn line_total(&self) -> Option<Money> {
        sum_lines(self.lines.iter().map(|l| (l.unit_price, l.quantity)))
    }

    /// Assigns missing identifiers and timestamps, producing the row set that
    /// a store writes.
    pub fn into_order(self, now: DateTime<Utc>) -> Order {
        let order_id = self.id.unwrap_or_default();
        let lines = self
            .lines
            .into_iter()
            .enumerate()
            .map(|(position, line)| OrderLine {
                id: line.id.unwrap_or_default(),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                position: position as i32,
                deleted_at: None,
            })
            .collect();

        Order {
            id: order_id,
            user_id: self.user_id,
            status: self.status,
            total: self.total,
            lines,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

/// Pagination for listing a user's orders.
///
/// `None` means no limit / no offset. Results are ordered by creation time,
/// oldest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl OrderFilter {
    /// Creates an unbounded filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of orders returned.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the number of orders skipped.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}

fn sum_lines(mut lines: impl Iterator<Item = (Money, i64)>) -> Option<Money> {
    lines.try_fold(Money::zero(), |acc, (price, quantity)| {
        acc.checked_add(price.checked_multiply(quantity)?)
    })
}
