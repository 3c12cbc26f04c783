//! End-to-end order flows against the in-memory store.
//!
//! Covers: create → read pricing, rollback on persistence failure, and
//! concurrent orders contending for the same book.

use std::sync::Arc;
use std::thread;

use anyhow::Result;
use chrono::Utc;
use rust_decimal_macros::dec;

use bookstore_catalog::CatalogItem;
use bookstore_core::{BookId, OrderId};
use bookstore_infra::config::LOG_FORMAT_VAR;
use bookstore_infra::{
    CatalogStore, InMemoryStore, OrderService, OrderServiceError, OrderStore, ServiceConfig,
    StockDecrement, StockGuard, StoreError, UnitOfWork,
};
use bookstore_orders::{Order, OrderLine};

fn book(title: &str, stock: u32, price: rust_decimal::Decimal) -> CatalogItem {
    CatalogItem::new(BookId::new(), title, stock, price).unwrap()
}

/// Store whose order writes fail, as if the database went away mid-request.
struct OrderWritesFail(InMemoryStore);

impl CatalogStore for OrderWritesFail {
    fn find_item(&self, id: &BookId) -> Result<Option<CatalogItem>, StoreError> {
        self.0.find_item(id)
    }

    fn save_item(&self, item: CatalogItem) -> Result<(), StoreError> {
        self.0.save_item(item)
    }

    fn decrement_stock(&self, id: &BookId, quantity: u32) -> Result<StockDecrement, StoreError> {
        self.0.decrement_stock(id, quantity)
    }
}

impl OrderStore for OrderWritesFail {
    fn find_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        self.0.find_order(id)
    }

    fn save_order(&self, _order: Order) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }

    fn save_lines(&self, _lines: Vec<OrderLine>) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection reset".to_string()))
    }

    fn lines_for_order(&self, order_id: &OrderId) -> Result<Vec<OrderLine>, StoreError> {
        self.0.lines_for_order(order_id)
    }
}

impl UnitOfWork for OrderWritesFail {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<StoreError>,
    {
        self.0.atomically(work)
    }
}

#[test]
fn order_is_created_read_back_and_priced() -> Result<()> {
    let config = ServiceConfig::from_lookup(|key| {
        (key == LOG_FORMAT_VAR).then(|| "pretty".to_string())
    })?;
    config.init_observability();

    let emma = book("Emma", 10, dec!(9.99));
    let poems = book("Poems", 3, dec!(5.00));
    let (emma_id, poems_id) = (emma.id_typed(), poems.id_typed());
    let service = OrderService::new(InMemoryStore::with_items([emma, poems]), config);

    let mut order = Order::new(OrderId::new(), Utc::now());
    order.add_line(emma_id, 3)?;
    order.add_line(poems_id, 2)?;
    let order_id = order.id;

    let created = service.create_order(order)?;
    assert_eq!(created.total, Some(dec!(39.97)));

    let read = service.read_order(&order_id)?;
    assert_eq!(read.total, Some(dec!(39.97)));
    assert_eq!(service.store().find_item(&emma_id)?.map(|b| b.stock()), Some(7));
    assert_eq!(service.store().find_item(&poems_id)?.map(|b| b.stock()), Some(1));

    let json = serde_json::to_value(&read)?;
    assert_eq!(json["total"], serde_json::json!("39.97"));
    assert_eq!(json["lines"][0]["net_amount"], serde_json::json!("29.97"));
    Ok(())
}

#[test]
fn insufficient_stock_is_a_client_rejection() -> Result<()> {
    let emma = book("Emma", 1, dec!(9.99));
    let emma_id = emma.id_typed();
    let service = OrderService::new(InMemoryStore::with_items([emma]), ServiceConfig::default());

    let mut order = Order::new(OrderId::new(), Utc::now());
    order.add_line(emma_id, 2)?;

    let err = service.create_order(order).unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(err.http_status(), 400);
    assert_eq!(service.store().find_item(&emma_id)?.map(|b| b.stock()), Some(1));
    Ok(())
}

#[test]
fn failed_order_write_returns_the_stock() -> Result<()> {
    let emma = book("Emma", 4, dec!(9.99));
    let emma_id = emma.id_typed();
    let service = OrderService::new(
        OrderWritesFail(InMemoryStore::with_items([emma])),
        ServiceConfig::default(),
    );

    let mut order = Order::new(OrderId::new(), Utc::now());
    order.add_line(emma_id, 3)?;

    let err = service.create_order(order).unwrap_err();
    assert_eq!(
        err,
        OrderServiceError::Persistence(StoreError::Unavailable("connection reset".to_string()))
    );
    assert_eq!(err.http_status(), 503);
    assert_eq!(service.store().find_item(&emma_id)?.map(|b| b.stock()), Some(4));
    Ok(())
}

#[test]
fn concurrent_orders_never_oversell() -> Result<()> {
    for guard in [StockGuard::ConditionalUpdate, StockGuard::ReadCheckWrite] {
        let emma = book("Emma", 25, dec!(9.99));
        let emma_id = emma.id_typed();
        let config = ServiceConfig {
            stock_guard: guard,
            ..ServiceConfig::default()
        };
        let service = Arc::new(OrderService::new(InMemoryStore::with_items([emma]), config));

        let handles: Vec<_> = (0..40)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || -> Result<Order, OrderServiceError> {
                    let mut order = Order::new(OrderId::new(), Utc::now());
                    order.add_line(emma_id, 1).map_err(OrderServiceError::from)?;
                    service.create_order(order)
                })
            })
            .collect();

        let mut sold = 0u32;
        let mut rejected = 0u32;
        for handle in handles {
            match handle.join().expect("order thread panicked") {
                Ok(_) => sold += 1,
                Err(OrderServiceError::InsufficientStock { .. }) => rejected += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(sold, 25, "guard {guard:?}");
        assert_eq!(rejected, 15, "guard {guard:?}");
        assert_eq!(
            service.store().find_item(&emma_id)?.map(|b| b.stock()),
            Some(0)
        );
    }
    Ok(())
}
