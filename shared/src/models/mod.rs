//! Domain models for the Restaurant Inventory platform

mod activity;
mod ingredient;
mod menu;
mod prep;
mod report;
mod stock_count;

pub use activity::*;
pub use ingredient::*;
pub use menu::*;
pub use prep::*;
pub use report::*;
pub use stock_count::*;
