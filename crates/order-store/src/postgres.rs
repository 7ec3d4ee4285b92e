use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Money, NewOrder, Order, OrderFilter, OrderId, OrderLine, OrderLineId, ProductId, Result,
    StoreError, UserId, store::OrderStore,
};

const ORDER_COLUMNS: &str =
    "id, user_id, status, total_cents, created_at, updated_at, deleted_at";
const LINE_COLUMNS: &str = "id, order_id, product_id, quantity, price_cents, position, deleted_at";

/// PostgreSQL-backed order store.
///
/// Inventory lives in the `products` table; every decrement is a single
/// conditional `UPDATE` so the database's row lock is the only
/// synchronisation between concurrent orders.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations (products, orders, order items, payments).
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            status: row.try_get("status")?,
            total: Money::from_cents(row.try_get("total_cents")?),
            lines: Vec::new(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }

    fn row_to_line(row: &PgRow) -> Result<OrderLine> {
        Ok(OrderLine {
            id: OrderLineId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            quantity: row.try_get("quantity")?,
            unit_price: Money::from_cents(row.try_get("price_cents")?),
            position: row.try_get("position")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }

    async fn load_lines(&self, order_ids: &[Uuid]) -> Result<Vec<OrderLine>> {
        let rows = sqlx::query(&format!(
            "SELECT {LINE_COLUMNS} FROM order_items
             WHERE order_id = ANY($1) AND deleted_at IS NULL
             ORDER BY order_id, position ASC"
        ))
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_line).collect()
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[tracing::instrument(skip(self, order), fields(user_id = %order.user_id, lines = order.lines.len()))]
    async fn save(&self, order: NewOrder) -> Result<Order> {
        let started = std::time::Instant::now();
        let order = order.into_order(Utc::now().trunc_subsecs(6));

        // Dropping the transaction before commit rolls it back, so an early
        // return (or a cancelled caller) never leaves partial state behind.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, status, total_cents, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(&order.status)
        .bind(order.total.cents())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for (product_id, quantity) in order.stock_demand() {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET inventory = inventory - $1, updated_at = NOW()
                WHERE id = $2 AND inventory >= $1
                "#,
            )
            .bind(quantity)
            .bind(product_id.as_uuid())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                metrics::counter!("order_store_inventory_conflicts_total").increment(1);
                tracing::info!(
                    %product_id,
                    requested = quantity,
                    "insufficient inventory, order rolled back"
                );
                return Err(StoreError::InsufficientInventory {
                    product_id,
                    requested: quantity,
                });
            }
        }

        for line in &order.lines {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, price_cents, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(line.id.as_uuid())
            .bind(line.order_id.as_uuid())
            .bind(line.product_id.as_uuid())
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        metrics::counter!("order_store_saves_total").increment(1);
        metrics::histogram!("order_store_save_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::debug!(order_id = %order.id, "order persisted");

        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn update_status(&self, order_id: OrderId, status: &str) -> Result<Order> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $1, updated_at = $2
            WHERE id = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(status)
        .bind(Utc::now().trunc_subsecs(6))
        .bind(order_id.as_uuid())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(order_id));
        }

        self.get_by_id(order_id).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, order_id: OrderId) -> Result<Order> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let mut order = match row {
            Some(row) => Self::row_to_order(&row)?,
            None => return Err(StoreError::OrderNotFound(order_id)),
        };

        order.lines = self.load_lines(&[order_id.as_uuid()]).await?;
        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_user(&self, user_id: UserId, filter: OrderFilter) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY created_at ASC, id ASC
             LIMIT $2 OFFSET $3"
        ))
        .bind(user_id.as_uuid())
        .bind(filter.limit.map(i64::from))
        .bind(i64::from(filter.offset.unwrap_or(0)))
        .fetch_all(&self.pool)
        .await?;

        let mut orders = rows
            .iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;

        if orders.is_empty() {
            return Ok(orders);
        }

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
        let mut lines_by_order: HashMap<OrderId, Vec<OrderLine>> =
            HashMap::with_capacity(orders.len());
        for line in self.load_lines(&ids).await? {
            lines_by_order.entry(line.order_id).or_default().push(line);
        }

        for order in &mut orders {
            order.lines = lines_by_order.remove(&order.id).unwrap_or_default();
        }

        Ok(orders)
    }
}
