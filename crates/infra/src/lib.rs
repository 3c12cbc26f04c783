//! Infrastructure layer: store capabilities, order intake, pricing, config.

pub mod config;
pub mod error;
pub mod intake;
pub mod pricing;
pub mod service;
pub mod store;

pub use config::{ConfigError, ServiceConfig, StockGuard};
pub use error::OrderServiceError;
pub use intake::OrderIntakeValidator;
pub use pricing::PricingCalculator;
pub use service::OrderService;
pub use store::{CatalogStore, InMemoryStore, OrderStore, StockDecrement, StoreError, UnitOfWork};
