//! Order service: the create/read hooks and the flows built around them.
//!
//! ```text
//! create_order
//!   ↓
//! 1. Validate order + lines (pure)
//!   ↓
//! 2. ┌ unit of work ───────────────────────────┐
//!    │ reserve stock per line (fail-fast)      │
//!    │ persist order + lines                   │
//!    └─────────────────── rollback on any error┘
//!   ↓
//! 3. Price lines and total (read-side, not persisted)
//! ```
//!
//! The `before_*` / `after_*` hooks are also exposed on their own for request
//! layers that own persistence and the transaction themselves.

use core::slice;

use bookstore_core::{DomainError, OrderId};
use bookstore_orders::{Order, OrderLine};

use crate::config::ServiceConfig;
use crate::error::OrderServiceError;
use crate::intake::OrderIntakeValidator;
use crate::pricing::PricingCalculator;
use crate::store::{CatalogStore, OrderStore, UnitOfWork};

#[derive(Debug)]
pub struct OrderService<S> {
    store: S,
    config: ServiceConfig,
}

impl<S> OrderService<S> {
    pub fn new(store: S, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S> OrderService<S>
where
    S: CatalogStore + OrderStore + UnitOfWork,
{
    fn validator(&self) -> OrderIntakeValidator<'_, S> {
        OrderIntakeValidator::new(&self.store, self.config.stock_guard)
    }

    fn calculator(&self) -> PricingCalculator<'_, S, S> {
        PricingCalculator::new(&self.store, &self.store)
    }

    /// Hook: before order lines are created. Reserves stock for every line.
    pub fn before_create_lines(&self, lines: &[OrderLine]) -> Result<(), OrderServiceError> {
        self.validator().reserve_stock(lines)
    }

    /// Hook: before orders are created. Reserves stock for each order's lines.
    ///
    /// Any failure aborts the whole batch, including a missing book.
    pub fn before_create_orders(&self, orders: &[Order]) -> Result<(), OrderServiceError> {
        let validator = self.validator();
        for order in orders {
            validator.reserve_stock(&order.lines)?;
        }
        Ok(())
    }

    /// Hook: after lines are read or created. Fills in net amounts.
    pub fn after_read_lines(&self, lines: &mut [OrderLine]) -> Result<(), OrderServiceError> {
        self.calculator().price_lines(lines)
    }

    /// Hook: after orders are read or created. Fills in net amounts and totals.
    pub fn after_read_orders(&self, orders: &mut [Order]) -> Result<(), OrderServiceError> {
        self.calculator().price_orders(orders)
    }

    /// Create an order with its lines, consuming stock atomically.
    ///
    /// Client-supplied amounts are discarded; the returned order carries
    /// freshly computed net amounts and total.
    pub fn create_order(&self, mut order: Order) -> Result<Order, OrderServiceError> {
        order.validate()?;
        order.total = None;
        for line in &mut order.lines {
            line.net_amount = None;
        }

        self.store.atomically(|| -> Result<(), OrderServiceError> {
            if self.store.find_order(&order.id)?.is_some() {
                return Err(
                    DomainError::conflict(format!("order {} already exists", order.id)).into(),
                );
            }
            self.before_create_orders(slice::from_ref(&order))?;
            self.store.save_order(order.clone())?;
            Ok(())
        })?;

        tracing::info!(
            order_id = %order.id,
            lines = order.lines.len(),
            "order created"
        );

        self.after_read_orders(slice::from_mut(&mut order))?;
        Ok(order)
    }

    /// Add lines to an existing order, consuming stock atomically.
    pub fn add_lines(
        &self,
        order_id: &OrderId,
        mut lines: Vec<OrderLine>,
    ) -> Result<Vec<OrderLine>, OrderServiceError> {
        for line in &mut lines {
            line.validate()?;
            if line.order_id != *order_id {
                return Err(OrderServiceError::Validation(format!(
                    "line {} belongs to order {}, not {order_id}",
                    line.id, line.order_id
                )));
            }
            line.net_amount = None;
        }

        self.store.atomically(|| -> Result<(), OrderServiceError> {
            if self.store.find_order(order_id)?.is_none() {
                return Err(OrderServiceError::not_found(format!("order {order_id}")));
            }
            self.before_create_lines(&lines)?;
            self.store.save_lines(lines.clone())?;
            Ok(())
        })?;

        tracing::info!(order_id = %order_id, lines = lines.len(), "order lines added");

        self.after_read_lines(&mut lines)?;
        Ok(lines)
    }

    /// Load an order with all of its lines, priced.
    pub fn read_order(&self, order_id: &OrderId) -> Result<Order, OrderServiceError> {
        let mut order = self
            .store
            .find_order(order_id)?
            .ok_or_else(|| OrderServiceError::not_found(format!("order {order_id}")))?;
        order.lines = self.store.lines_for_order(order_id)?;

        self.after_read_orders(slice::from_mut(&mut order))?;
        Ok(order)
    }
}
