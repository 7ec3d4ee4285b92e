use checkout::{InMemoryNotifier, InMemoryPaymentGateway, OrderPlacement, PlaceOrder};
use criterion::{Criterion, criterion_group, criterion_main};
use ledger::InMemoryLedgerStore;
use order_store::{InMemoryOrderStore, Money, NewOrder, ProductId, UserId};

fn bench_place_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();
    let product = ProductId::new();
    rt.block_on(store.set_inventory(product, i64::MAX));

    let placement = OrderPlacement::new(
        store,
        InMemoryLedgerStore::new(),
        InMemoryPaymentGateway::new(),
        InMemoryNotifier::new(),
    );

    c.bench_function("checkout/place_single_line", |b| {
        b.iter(|| {
            rt.block_on(async {
                let order = NewOrder::new(UserId::new(), Money::from_cents(250)).with_line(
                    product,
                    1,
                    Money::from_cents(250),
                );
                placement
                    .place(PlaceOrder::new(order).notify("bench@example.com"))
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_place_order);
criterion_main!(benches);
