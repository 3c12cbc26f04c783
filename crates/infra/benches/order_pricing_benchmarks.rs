use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bookstore_catalog::CatalogItem;
use bookstore_core::{BookId, OrderId};
use bookstore_infra::{InMemoryStore, OrderService, OrderStore, ServiceConfig, StockGuard};
use bookstore_orders::Order;
use chrono::Utc;
use rust_decimal::Decimal;

/// Service over `n` books with effectively unlimited stock.
fn setup(n: usize, guard: StockGuard) -> (OrderService<InMemoryStore>, Vec<BookId>) {
    let items: Vec<_> = (0..n)
        .map(|i| {
            CatalogItem::new(
                BookId::new(),
                format!("Book {i}"),
                u32::MAX,
                Decimal::new(999 + i as i64, 2),
            )
            .unwrap()
        })
        .collect();
    let ids = items.iter().map(|i| i.id_typed()).collect();
    let config = ServiceConfig {
        stock_guard: guard,
        ..ServiceConfig::default()
    };
    (OrderService::new(InMemoryStore::with_items(items), config), ids)
}

fn order_for(ids: &[BookId]) -> Order {
    let mut order = Order::new(OrderId::new(), Utc::now());
    for id in ids {
        order.add_line(*id, 1).unwrap();
    }
    order
}

fn bench_create_order_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_order_latency");

    for (name, guard) in [
        ("conditional_update", StockGuard::ConditionalUpdate),
        ("read_check_write", StockGuard::ReadCheckWrite),
    ] {
        group.bench_function(name, |b| {
            let (service, ids) = setup(5, guard);
            b.iter(|| {
                service.create_order(black_box(order_for(&ids))).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_order_total_by_line_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_total_by_line_count");

    for line_count in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(*line_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(line_count),
            line_count,
            |b, &line_count| {
                let (service, ids) = setup(line_count, StockGuard::default());
                let order = order_for(&ids);
                let order_id = order.id;
                service.store().save_order(order).unwrap();

                b.iter(|| {
                    let read = service.read_order(black_box(&order_id)).unwrap();
                    black_box(read.total);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_create_order_latency,
    bench_order_total_by_line_count
);
criterion_main!(benches);
