//! Restaurant Inventory Platform - backend library
//!
//! HTTP service for stock reconciliation: stock-take, receiving, sales
//! import and the reports they leave behind.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use catalog::{spawn_low_stock_watcher, CatalogCache, CatalogEvent, CatalogSnapshot};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use store::{DocumentStore, Documents, MemoryDocumentStore, PgDocumentStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub docs: Documents,
    pub catalog: Arc<CatalogCache>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state over `store` and load the initial catalog snapshot
    pub async fn new(store: Arc<dyn DocumentStore>, config: Config) -> AppResult<Self> {
        let docs = Documents::new(store);
        let catalog = Arc::new(CatalogCache::new());
        catalog.refresh(&docs).await?;

        Ok(Self {
            docs,
            catalog,
            config: Arc::new(config),
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Restaurant Inventory API v1.0"
}
