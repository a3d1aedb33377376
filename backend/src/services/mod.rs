//! Business logic services for the Restaurant Inventory platform

pub mod ingredient;
pub mod ledger;
pub mod menu;
pub mod prep;
pub mod receiving;
pub mod reporting;
pub mod sales_import;
pub mod session;
pub mod stock_take;

pub use ingredient::IngredientService;
pub use ledger::LedgerService;
pub use menu::MenuService;
pub use prep::PrepService;
pub use receiving::ReceivingService;
pub use reporting::ReportingService;
pub use sales_import::SalesImportService;
pub use session::SessionService;
pub use stock_take::StockTakeService;
