//! HTTP handlers

pub mod health;
pub mod ingredient;
pub mod ledger;
pub mod menu;
pub mod prep;
pub mod receiving;
pub mod reporting;
pub mod sales;
pub mod session;
pub mod settings;
pub mod stock_take;

pub use health::*;
pub use ingredient::*;
pub use ledger::*;
pub use menu::*;
pub use prep::*;
pub use receiving::*;
pub use reporting::*;
pub use sales::*;
pub use session::*;
pub use settings::*;
pub use stock_take::*;
