//! Store capabilities consumed by the order service.
//!
//! The service never talks to a concrete database. It receives these traits
//! and relies on them for reads, writes, and atomicity.

pub mod in_memory;

use std::sync::Arc;

use thiserror::Error;

use bookstore_catalog::CatalogItem;
use bookstore_core::{BookId, OrderId};
use bookstore_orders::{Order, OrderLine};

pub use in_memory::InMemoryStore;

/// Store operation error.
///
/// These are **infrastructure errors** (availability, failed writes, corrupted
/// state) as opposed to domain errors (validation, stock rules).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("store state corrupted: {0}")]
    Corrupted(String),
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockDecrement {
    /// Stock covered the quantity and was reduced.
    Applied { remaining: u32 },
    /// Stock did not cover the quantity; nothing changed.
    Insufficient { available: u32 },
    /// No item with that identifier exists.
    Missing,
}

/// Catalog capability: read and write books by identifier.
pub trait CatalogStore: Send + Sync {
    fn find_item(&self, id: &BookId) -> Result<Option<CatalogItem>, StoreError>;

    /// Insert or replace an item.
    fn save_item(&self, item: CatalogItem) -> Result<(), StoreError>;

    /// Subtract `quantity` from stock **only if** stock >= quantity, as one
    /// atomic step.
    fn decrement_stock(&self, id: &BookId, quantity: u32) -> Result<StockDecrement, StoreError>;
}

/// Order capability: order headers and the lines stored under them.
pub trait OrderStore: Send + Sync {
    /// Load an order header. Lines are not attached; use `lines_for_order`.
    fn find_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Persist an order header together with its attached lines.
    fn save_order(&self, order: Order) -> Result<(), StoreError>;

    /// Persist additional lines under existing orders.
    fn save_lines(&self, lines: Vec<OrderLine>) -> Result<(), StoreError>;

    /// All lines persisted under `order_id`, in insertion order.
    fn lines_for_order(&self, order_id: &OrderId) -> Result<Vec<OrderLine>, StoreError>;
}

/// Transaction boundary: either every write made by `work` is kept, or none.
pub trait UnitOfWork {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<StoreError>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn find_item(&self, id: &BookId) -> Result<Option<CatalogItem>, StoreError> {
        (**self).find_item(id)
    }

    fn save_item(&self, item: CatalogItem) -> Result<(), StoreError> {
        (**self).save_item(item)
    }

    fn decrement_stock(&self, id: &BookId, quantity: u32) -> Result<StockDecrement, StoreError> {
        (**self).decrement_stock(id, quantity)
    }
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn find_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        (**self).find_order(id)
    }

    fn save_order(&self, order: Order) -> Result<(), StoreError> {
        (**self).save_order(order)
    }

    fn save_lines(&self, lines: Vec<OrderLine>) -> Result<(), StoreError> {
        (**self).save_lines(lines)
    }

    fn lines_for_order(&self, order_id: &OrderId) -> Result<Vec<OrderLine>, StoreError> {
        (**self).lines_for_order(order_id)
    }
}

impl<S> UnitOfWork for Arc<S>
where
    S: UnitOfWork + ?Sized,
{
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).atomically(work)
    }
}
