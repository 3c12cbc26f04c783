use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, ThreadId};

use bookstore_catalog::CatalogItem;
use bookstore_core::{BookId, DomainError, OrderId, OrderLineId};
use bookstore_orders::{Order, OrderLine};

use super::{CatalogStore, OrderStore, StockDecrement, StoreError, UnitOfWork};

/// Inverse of one write made inside a unit of work.
#[derive(Debug)]
enum Undo {
    Restock {
        id: BookId,
        quantity: u32,
    },
    RestoreItem {
        id: BookId,
        previous: Option<CatalogItem>,
        written_stock: u32,
    },
    RestoreOrder {
        id: OrderId,
        order: Option<Order>,
        lines: Option<Vec<OrderLine>>,
    },
    RemoveLine {
        order_id: OrderId,
        line_id: OrderLineId,
    },
}

/// Undo log of the running unit of work, owned by the thread that opened it.
#[derive(Debug)]
struct Journal {
    owner: ThreadId,
    undo: Vec<Undo>,
}

#[derive(Debug, Default)]
struct State {
    items: HashMap<BookId, CatalogItem>,
    orders: HashMap<OrderId, Order>,
    lines: HashMap<OrderId, Vec<OrderLine>>,
    journal: Option<Journal>,
}

impl State {
    /// Length of the undo log if the calling thread owns the running unit of work.
    fn journal_mark(&self) -> Option<usize> {
        let current = thread::current().id();
        self.journal
            .as_ref()
            .filter(|journal| journal.owner == current)
            .map(|journal| journal.undo.len())
    }

    /// Writes from other threads are not part of the unit of work and are never undone.
    fn record(&mut self, undo: Undo) {
        let current = thread::current().id();
        if let Some(journal) = self.journal.as_mut().filter(|j| j.owner == current) {
            journal.undo.push(undo);
        }
    }

    fn rollback_to(&mut self, mark: usize) -> Result<(), StoreError> {
        let undo = match self.journal.as_mut() {
            Some(journal) if mark < journal.undo.len() => journal.undo.split_off(mark),
            _ => return Ok(()),
        };
        for entry in undo.into_iter().rev() {
            self.apply(entry)?;
        }
        Ok(())
    }

    fn apply(&mut self, undo: Undo) -> Result<(), StoreError> {
        match undo {
            Undo::Restock { id, quantity } => {
                let item = self.items.get_mut(&id).ok_or_else(|| {
                    StoreError::Corrupted(format!("book {id} vanished before rollback"))
                })?;
                item.release(quantity).map_err(corrupted)?;
            }
            Undo::RestoreItem {
                id,
                previous,
                written_stock,
            } => match (previous, self.items.get(&id)) {
                (Some(previous), Some(current)) => {
                    // Keep stock moved by other writers since this item was saved.
                    let drift = i64::from(current.stock()) - i64::from(written_stock);
                    let stock = u32::try_from((i64::from(previous.stock()) + drift).max(0))
                        .unwrap_or(u32::MAX);
                    let restored =
                        CatalogItem::new(id, previous.title(), stock, previous.price())
                            .map_err(corrupted)?;
                    self.items.insert(id, restored);
                }
                (previous, _) => restore(&mut self.items, id, previous),
            },
            Undo::RestoreOrder { id, order, lines } => {
                restore(&mut self.orders, id, order);
                restore(&mut self.lines, id, lines);
            }
            Undo::RemoveLine { order_id, line_id } => {
                if let Some(lines) = self.lines.get_mut(&order_id) {
                    lines.retain(|line| line.id != line_id);
                }
            }
        }
        Ok(())
    }
}

fn restore<K: Eq + Hash, V>(map: &mut HashMap<K, V>, key: K, previous: Option<V>) {
    match previous {
        Some(value) => {
            map.insert(key, value);
        }
        None => {
            map.remove(&key);
        }
    }
}

fn corrupted(err: DomainError) -> StoreError {
    StoreError::Corrupted(format!("rollback failed: {err}"))
}

/// In-memory catalog + order store.
///
/// Intended for tests/dev. Units of work are serialized against each other and
/// keep an undo log of their own writes; a rollback replays it backwards and
/// leaves writes made by other threads in place. A unit of work opened inside
/// another on the same thread joins it and rolls back only its own writes.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    transaction: Mutex<()>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with catalog items.
    pub fn with_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let items = items
            .into_iter()
            .map(|item| (item.id_typed(), item))
            .collect();
        Self {
            state: RwLock::new(State {
                items,
                ..State::default()
            }),
            transaction: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Corrupted("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Corrupted("lock poisoned".to_string()))
    }
}

impl CatalogStore for InMemoryStore {
    fn find_item(&self, id: &BookId) -> Result<Option<CatalogItem>, StoreError> {
        Ok(self.read()?.items.get(id).cloned())
    }

    fn save_item(&self, item: CatalogItem) -> Result<(), StoreError> {
        let id = item.id_typed();
        let written_stock = item.stock();
        let mut state = self.write()?;
        let previous = state.items.insert(id, item);
        state.record(Undo::RestoreItem {
            id,
            previous,
            written_stock,
        });
        Ok(())
    }

    fn decrement_stock(&self, id: &BookId, quantity: u32) -> Result<StockDecrement, StoreError> {
        let mut state = self.write()?;
        let Some(item) = state.items.get_mut(id) else {
            return Ok(StockDecrement::Missing);
        };
        // Check and subtract under the same write lock.
        match item.reserve(quantity) {
            Ok(remaining) => {
                state.record(Undo::Restock { id: *id, quantity });
                Ok(StockDecrement::Applied { remaining })
            }
            Err(DomainError::InsufficientStock { available, .. }) => {
                Ok(StockDecrement::Insufficient { available })
            }
            Err(other) => Err(StoreError::WriteFailed(other.to_string())),
        }
    }
}

impl OrderStore for InMemoryStore {
    fn find_order(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.read()?.orders.get(id).cloned())
    }

    fn save_order(&self, mut order: Order) -> Result<(), StoreError> {
        let id = order.id;
        let lines = std::mem::take(&mut order.lines);
        let mut state = self.write()?;
        let previous_lines = state.lines.insert(id, lines);
        let previous_order = state.orders.insert(id, order);
        state.record(Undo::RestoreOrder {
            id,
            order: previous_order,
            lines: previous_lines,
        });
        Ok(())
    }

    fn save_lines(&self, lines: Vec<OrderLine>) -> Result<(), StoreError> {
        let mut state = self.write()?;
        for line in lines {
            let (order_id, line_id) = (line.order_id, line.id);
            state.lines.entry(order_id).or_default().push(line);
            state.record(Undo::RemoveLine { order_id, line_id });
        }
        Ok(())
    }

    fn lines_for_order(&self, order_id: &OrderId) -> Result<Vec<OrderLine>, StoreError> {
        Ok(self
            .read()?
            .lines
            .get(order_id)
            .cloned()
            .unwrap_or_default())
    }
}

impl UnitOfWork for InMemoryStore {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<StoreError>,
    {
        let joined = self.read()?.journal_mark();
        if let Some(mark) = joined {
            return match work() {
                Ok(value) => Ok(value),
                Err(err) => {
                    self.write()?.rollback_to(mark)?;
                    tracing::debug!("nested unit of work rolled back");
                    Err(err)
                }
            };
        }

        let _serialized = self
            .transaction
            .lock()
            .map_err(|_| StoreError::Corrupted("transaction lock poisoned".to_string()))?;

        self.write()?.journal = Some(Journal {
            owner: thread::current().id(),
            undo: Vec::new(),
        });

        let outcome = work();

        let mut state = self.write()?;
        match outcome {
            Ok(value) => {
                state.journal = None;
                Ok(value)
            }
            Err(err) => {
                let undone = state.rollback_to(0);
                state.journal = None;
                undone?;
                tracing::debug!("unit of work rolled back");
                Err(err)
            }
        }
    }
}
