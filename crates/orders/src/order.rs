use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bookstore_core::{BookId, DomainError, DomainResult, OrderId, OrderLineId};

/// Order line: which book, how many, and the derived net amount.
///
/// `net_amount` is never taken from the client; it is recomputed from the
/// catalog price every time the line is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub book_id: BookId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_amount: Option<Decimal>,
}

impl OrderLine {
    pub fn new(order_id: OrderId, book_id: BookId, quantity: u32) -> DomainResult<Self> {
        let line = Self {
            id: OrderLineId::new(),
            order_id,
            book_id,
            quantity,
            net_amount: None,
        };
        line.validate()?;
        Ok(line)
    }

    /// Reject lines that could never be fulfilled regardless of stock.
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(())
    }
}

/// Order: a set of lines plus the derived total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    /// Lines attached to this value. May be a partial view (or empty) when the
    /// caller did not expand them.
    #[serde(default)]
    pub lines: Vec<OrderLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

impl Order {
    pub fn new(id: OrderId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            lines: Vec::new(),
            total: None,
        }
    }

    /// Attach a new line for `book_id` and return it.
    pub fn add_line(&mut self, book_id: BookId, quantity: u32) -> DomainResult<&OrderLine> {
        let line = OrderLine::new(self.id, book_id, quantity)?;
        self.lines.push(line);
        let idx = self.lines.len() - 1;
        Ok(&self.lines[idx])
    }

    /// Validate every attached line and check it points back at this order.
    pub fn validate(&self) -> DomainResult<()> {
        for line in &self.lines {
            line.validate()?;
            if line.order_id != self.id {
                return Err(DomainError::validation(format!(
                    "line {} belongs to order {}, not {}",
                    line.id, line.order_id, self.id
                )));
            }
        }
        Ok(())
    }
}
