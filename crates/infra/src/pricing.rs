//! Read-side pricing: line net amounts and order totals.
//!
//! Derived amounts are set on the values handed back to the caller and are
//! never written to the store.

use rust_decimal::Decimal;

use bookstore_orders::{Order, OrderLine, net_amount, total_of};

use crate::error::OrderServiceError;
use crate::store::{CatalogStore, OrderStore};

#[derive(Debug)]
pub struct PricingCalculator<'a, C: ?Sized, O: ?Sized> {
    catalog: &'a C,
    orders: &'a O,
}

impl<'a, C, O> PricingCalculator<'a, C, O>
where
    C: CatalogStore + ?Sized,
    O: OrderStore + ?Sized,
{
    pub fn new(catalog: &'a C, orders: &'a O) -> Self {
        Self { catalog, orders }
    }

    /// Set `line.net_amount` from the current catalog price.
    pub fn price_line(&self, line: &mut OrderLine) -> Result<Decimal, OrderServiceError> {
        let item = self
            .catalog
            .find_item(&line.book_id)?
            .ok_or_else(|| OrderServiceError::not_found(format!("book {}", line.book_id)))?;

        let amount = net_amount(item.price(), line.quantity)?;
        line.net_amount = Some(amount);
        Ok(amount)
    }

    pub fn price_lines(&self, lines: &mut [OrderLine]) -> Result<(), OrderServiceError> {
        for line in lines.iter_mut() {
            self.price_line(line)?;
        }
        Ok(())
    }

    /// Price attached lines, then total the order from its persisted lines.
    ///
    /// Attached lines may be a partial view, so the total is always computed
    /// from a fresh fetch of every line stored under the order.
    pub fn price_order(&self, order: &mut Order) -> Result<Decimal, OrderServiceError> {
        self.price_lines(&mut order.lines)?;

        let mut persisted = self.orders.lines_for_order(&order.id)?;
        let mut amounts = Vec::with_capacity(persisted.len());
        for line in persisted.iter_mut() {
            amounts.push(self.price_line(line)?);
        }

        let total = total_of(amounts)?;
        tracing::debug!(
            order_id = %order.id,
            lines = persisted.len(),
            total = %total,
            "order total computed"
        );
        order.total = Some(total);
        Ok(total)
    }

    pub fn price_orders(&self, orders: &mut [Order]) -> Result<(), OrderServiceError> {
        for order in orders.iter_mut() {
            self.price_order(order)?;
        }
        Ok(())
    }
}
