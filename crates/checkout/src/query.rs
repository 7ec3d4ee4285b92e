//! Read access to orders.

use order_store::{Order, OrderFilter, OrderId, OrderStore, UserId};

use crate::error::Result;

/// Looks up orders. Soft-deleted orders are never returned.
pub struct OrderQueries<S: OrderStore> {
    store: S,
}

impl<S: OrderStore> OrderQueries<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads an order with its lines.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, order_id: OrderId) -> Result<Order> {
        Ok(self.store.get_by_id(order_id).await?)
    }

    /// Lists a user's orders, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_user(&self, user_id: UserId, filter: OrderFilter) -> Result<Vec<Order>> {
        Ok(self.store.list_by_user(user_id, filter).await?)
    }
}

#[cfg(test)]
mod tests {
    use common::{Money, ProductId};
    use order_store::{InMemoryOrderStore, NewOrder};

    use super::*;
    use crate::CheckoutError;

    #[tokio::test]
    async fn test_get_by_id_returns_lines_in_order() {
        let store = InMemoryOrderStore::new();
        let (a, b) = (ProductId::new(), ProductId::new());
        store.set_inventory(a, 10).await;
        store.set_inventory(b, 10).await;
        let saved = store
            .save(
                NewOrder::new(UserId::new(), Money::from_cents(700))
                    .with_line(a, 1, Money::from_cents(500))
                    .with_line(b, 2, Money::from_cents(100)),
            )
            .await
            .unwrap();
        let queries = OrderQueries::new(store);

        let loaded = queries.get_by_id(saved.id).await.unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(loaded.lines[0].product_id, a);
        assert_eq!(loaded.lines[1].product_id, b);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let queries = OrderQueries::new(InMemoryOrderStore::new());
        let err = queries.get_by_id(OrderId::new()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_by_user_paginates() {
        let store = InMemoryOrderStore::new();
        let user_id = UserId::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let saved = store
                .save(NewOrder::new(user_id, Money::zero()))
                .await
                .unwrap();
            ids.push(saved.id);
        }
        store
            .save(NewOrder::new(UserId::new(), Money::zero()))
            .await
            .unwrap();
        let queries = OrderQueries::new(store);

        let all = queries
            .list_by_user(user_id, OrderFilter::new())
            .await
            .unwrap();
        let mut listed: Vec<_> = all.iter().map(|o| o.id).collect();
        listed.sort();
        ids.sort();
        assert_eq!(listed, ids);

        let page = queries
            .list_by_user(user_id, OrderFilter::new().limit(1).offset(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0], all[1]);
    }
}
