//! PostgreSQL integration tests for the payment ledger.

use std::sync::Arc;

use ledger::{
    LedgerStore, Money, NewPaymentRecord, OrderId, PostgresLedgerStore, STATUS_CAPTURED, UserId,
};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/003_create_payments_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_ledger() -> PostgresLedgerStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE payments")
        .execute(&pool)
        .await
        .unwrap();

    PostgresLedgerStore::new(pool)
}

#[tokio::test]
#[serial]
async fn save_and_list_for_order() {
    let ledger = get_test_ledger().await;
    let order_id = OrderId::new();
    let user_id = UserId::new();

    let saved = ledger
        .save(NewPaymentRecord::captured(
            order_id,
            user_id,
            Money::from_cents(4200),
            "in-memory",
            "RCPT-0042",
        ))
        .await
        .unwrap();

    let records = ledger.list_for_order(order_id).await.unwrap();
    assert_eq!(records, vec![saved]);
    assert_eq!(records[0].status, STATUS_CAPTURED);
    assert_eq!(records[0].amount, Money::from_cents(4200));
    assert_eq!(records[0].user_id, user_id);
}

#[tokio::test]
#[serial]
async fn records_do_not_require_an_existing_order() {
    let ledger = get_test_ledger().await;

    // No orders table exists in this database at all.
    let result = ledger
        .save(NewPaymentRecord::captured(
            OrderId::new(),
            UserId::new(),
            Money::zero(),
            "in-memory",
            "RCPT-0001",
        ))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
#[serial]
async fn unknown_order_has_no_records() {
    let ledger = get_test_ledger().await;
    let records = ledger.list_for_order(OrderId::new()).await.unwrap();
    assert!(records.is_empty());
}
