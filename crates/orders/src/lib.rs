//! Orders domain module.
//!
//! Orders, their lines, and the exact-decimal arithmetic used to price them.
//! Pure domain logic (no IO, no storage).

pub mod order;
pub mod pricing;

pub use order::{Order, OrderLine};
pub use pricing::{net_amount, total_of};
