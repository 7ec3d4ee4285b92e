use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tokio::sync::RwLock;

use crate::{
    NewOrder, Order, OrderFilter, OrderId, ProductId, Result, StoreError, UserId,
    store::OrderStore,
};

#[derive(Debug, Default)]
struct State {
    /// Orders in insertion order; lines are stored inline.
    orders: Vec<Order>,
    inventory: HashMap<ProductId, i64>,
}

/// In-memory order store implementation for testing.
///
/// Provides the same guarantees as the PostgreSQL implementation: the whole
/// save, including every inventory check, happens under one write lock with
/// no await point inside, so it is all-or-nothing even if the caller is
/// cancelled.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<State>>,
    fail_on_save: Arc<AtomicBool>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the on-hand inventory for a product.
    pub async fn set_inventory(&self, product_id: ProductId, quantity: i64) {
        self.state
            .write()
            .await
            .inventory
            .insert(product_id, quantity);
    }

    /// Returns the on-hand inventory for a product, if it is known.
    pub async fn inventory(&self, product_id: ProductId) -> Option<i64> {
        self.state.read().await.inventory.get(&product_id).copied()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the total number of order lines stored.
    pub async fn line_count(&self) -> usize {
        self.state
            .read()
            .await
            .orders
            .iter()
            .map(|o| o.lines.len())
            .sum()
    }

    /// Makes subsequent saves fail as if the database were unreachable.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    #[tracing::instrument(skip(self, order), fields(user_id = %order.user_id, lines = order.lines.len()))]
    async fn save(&self, order: NewOrder) -> Result<Order> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }

        let order = order.into_order(Utc::now().trunc_subsecs(6));
        let mut state = self.state.write().await;

        // Check every decrement before touching the real counts.
        let demand = order.stock_demand();
        for (&product_id, &requested) in &demand {
            let on_hand = state.inventory.get(&product_id).copied().unwrap_or(0);
            if on_hand < requested {
                metrics::counter!("order_store_inventory_conflicts_total").increment(1);
                return Err(StoreError::InsufficientInventory {
                    product_id,
                    requested,
                });
            }
        }
        for (product_id, requested) in demand {
            *state.inventory.entry(product_id).or_default() -= requested;
        }

        state.orders.push(order.clone());

        metrics::counter!("order_store_saves_total").increment(1);
        Ok(order)
    }

    async fn update_status(&self, order_id: OrderId, status: &str) -> Result<Order> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && o.deleted_at.is_none())
            .ok_or(StoreError::OrderNotFound(order_id))?;

        order.status = status.to_string();
        order.updated_at = Utc::now().trunc_subsecs(6);
        Ok(order.clone())
    }

    async fn get_by_id(&self, order_id: OrderId) -> Result<Order> {
        let state = self.state.read().await;
        state
            .orders
            .iter()
            .find(|o| o.id == order_id && o.deleted_at.is_none())
            .cloned()
            .ok_or(StoreError::OrderNotFound(order_id))
    }

    async fn list_by_user(&self, user_id: UserId, filter: OrderFilter) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| o.user_id == user_id && o.deleted_at.is_none())
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(orders.into_iter().skip(offset).take(limit).collect())
    }
}
