use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bookstore_core::{BookId, DomainError, DomainResult};

/// A book on sale, with its current stock and unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    id: BookId,
    title: String,
    stock: u32,
    price: Decimal,
}

impl CatalogItem {
    pub fn new(
        id: BookId,
        title: impl Into<String>,
        stock: u32,
        price: Decimal,
    ) -> DomainResult<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if price.is_sign_negative() {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(Self {
            id,
            title,
            stock,
            price,
        })
    }

    pub fn id_typed(&self) -> BookId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Check that `quantity` units can be taken from stock right now.
    pub fn ensure_available(&self, quantity: u32) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if quantity > self.stock {
            return Err(DomainError::insufficient_stock(quantity, self.stock));
        }
        Ok(())
    }

    /// Take `quantity` units out of stock, returning what is left.
    ///
    /// On error the item is left untouched.
    pub fn reserve(&mut self, quantity: u32) -> DomainResult<u32> {
        self.ensure_available(quantity)?;
        self.stock -= quantity;
        Ok(self.stock)
    }

    /// Put `quantity` units back into stock, returning the new level.
    pub fn release(&mut self, quantity: u32) -> DomainResult<u32> {
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("stock would overflow"))?;
        Ok(self.stock)
    }
}
