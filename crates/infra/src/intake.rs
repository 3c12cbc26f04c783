//! Order intake: stock validation and decrement before an order is persisted.
//!
//! For every proposed line, in order:
//!
//! ```text
//! line ── quantity > 0? ──> book exists? ──> stock >= quantity? ──> decrement + persist
//!             │                  │                  │
//!         Validation          NotFound       InsufficientStock
//! ```
//!
//! The first failure aborts the batch. Stock already taken for earlier lines is
//! only returned if the caller runs the batch inside a `UnitOfWork`.

use bookstore_orders::OrderLine;

use crate::config::StockGuard;
use crate::error::OrderServiceError;
use crate::store::{CatalogStore, StockDecrement};

/// Validates proposed order lines against catalog stock and consumes it.
#[derive(Debug)]
pub struct OrderIntakeValidator<'a, C: ?Sized> {
    catalog: &'a C,
    guard: StockGuard,
}

impl<'a, C> OrderIntakeValidator<'a, C>
where
    C: CatalogStore + ?Sized,
{
    pub fn new(catalog: &'a C, guard: StockGuard) -> Self {
        Self { catalog, guard }
    }

    /// Check and decrement stock for every line, failing fast.
    pub fn reserve_stock(&self, lines: &[OrderLine]) -> Result<(), OrderServiceError> {
        for line in lines {
            self.reserve_line(line)?;
        }
        Ok(())
    }

    /// Check and decrement stock for one line, returning the stock left.
    pub fn reserve_line(&self, line: &OrderLine) -> Result<u32, OrderServiceError> {
        line.validate()?;

        let result = match self.guard {
            StockGuard::ConditionalUpdate => self.decrement_conditionally(line),
            StockGuard::ReadCheckWrite => self.read_check_write(line),
        };

        match &result {
            Ok(remaining) => tracing::debug!(
                book_id = %line.book_id,
                order_id = %line.order_id,
                requested = line.quantity,
                remaining,
                "stock reserved"
            ),
            Err(OrderServiceError::Persistence(e)) => tracing::error!(
                book_id = %line.book_id,
                order_id = %line.order_id,
                error = %e,
                "stock update failed"
            ),
            Err(e) => tracing::warn!(
                book_id = %line.book_id,
                order_id = %line.order_id,
                requested = line.quantity,
                error = %e,
                "order line rejected"
            ),
        }

        result
    }

    fn decrement_conditionally(&self, line: &OrderLine) -> Result<u32, OrderServiceError> {
        match self.catalog.decrement_stock(&line.book_id, line.quantity)? {
            StockDecrement::Applied { remaining } => Ok(remaining),
            StockDecrement::Insufficient { available } => {
                Err(OrderServiceError::InsufficientStock {
                    book_id: line.book_id,
                    requested: line.quantity,
                    available,
                })
            }
            StockDecrement::Missing => {
                Err(OrderServiceError::not_found(format!("book {}", line.book_id)))
            }
        }
    }

    fn read_check_write(&self, line: &OrderLine) -> Result<u32, OrderServiceError> {
        let mut item = self
            .catalog
            .find_item(&line.book_id)?
            .ok_or_else(|| OrderServiceError::not_found(format!("book {}", line.book_id)))?;

        let remaining = item
            .reserve(line.quantity)
            .map_err(|e| OrderServiceError::for_book(line.book_id, e))?;

        self.catalog.save_item(item)?;
        Ok(remaining)
    }
}
