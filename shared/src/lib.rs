//! Shared types and rules for the Restaurant Inventory platform
//!
//! This crate contains the models and the pure stock rules shared between
//! the backend, the browser client (via WASM), and the tests. Nothing in
//! here performs I/O.

pub mod conversion;
pub mod costing;
pub mod error;
pub mod ledger;
pub mod models;
pub mod receiving;
pub mod reconciliation;
pub mod sales;
pub mod types;
pub mod validation;

pub use conversion::*;
pub use costing::*;
pub use error::*;
pub use ledger::*;
pub use models::*;
pub use receiving::*;
pub use reconciliation::*;
pub use sales::*;
pub use types::*;
pub use validation::*;
