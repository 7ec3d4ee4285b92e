use criterion::{Criterion, criterion_group, criterion_main};
use order_store::{InMemoryOrderStore, Money, NewOrder, OrderFilter, OrderStore, ProductId, UserId};

fn make_order(user: UserId, products: &[ProductId]) -> NewOrder {
    products.iter().fold(
        NewOrder::new(user, Money::from_cents(100 * products.len() as i64)),
        |order, product| order.with_line(*product, 1, Money::from_cents(100)),
    )
}

fn bench_save_single_line(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("order_store/save_single_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryOrderStore::new();
                let product = ProductId::new();
                store.set_inventory(product, 10).await;
                store.save(make_order(UserId::new(), &[product])).await.unwrap();
            });
        });
    });
}

fn bench_save_ten_lines(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("order_store/save_ten_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryOrderStore::new();
                let products: Vec<ProductId> = (0..10).map(|_| ProductId::new()).collect();
                for product in &products {
                    store.set_inventory(*product, 10).await;
                }
                store.save(make_order(UserId::new(), &products)).await.unwrap();
            });
        });
    });
}

fn bench_list_by_user(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();
    let user = UserId::new();
    let product = ProductId::new();

    rt.block_on(async {
        store.set_inventory(product, 1_000).await;
        for _ in 0..100 {
            store.save(make_order(user, &[product])).await.unwrap();
        }
    });

    c.bench_function("order_store/list_by_user_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                store
                    .list_by_user(user, OrderFilter::new().limit(20))
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_save_single_line,
    bench_save_ten_lines,
    bench_list_by_user
);
criterion_main!(benches);
