//! Catalog domain module.
//!
//! Books with their stock level and unit price. Business rules only: no IO,
//! no storage.

pub mod item;

pub use item::CatalogItem;
