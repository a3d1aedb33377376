//! Route definitions for the Restaurant Inventory platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Session routes (public)
        .nest("/session", session_routes())
        // Protected routes
        .merge(protected_routes(state))
}

/// Session issuing (public)
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/staff", post(handlers::create_staff_session))
        .route("/admin", post(handlers::create_admin_session))
}

/// Everything behind a session token; admin-only handlers check the role
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/ingredients", ingredient_routes())
        .nest("/menu-items", menu_routes())
        .nest("/prep-items", prep_routes())
        .nest("/stock-take", stock_take_routes())
        .route("/receiving/commit", post(handlers::commit_receiving))
        .route("/sales/preview", post(handlers::preview_sales))
        .route("/sales/apply", post(handlers::apply_sales))
        .route("/ledger/reset", post(handlers::reset_stock))
        .nest("/reports", report_routes())
        .route("/settings/pin", put(handlers::change_pin))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Ingredient catalog routes
fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_ingredients).post(handlers::create_ingredient),
        )
        .route("/valuation", get(handlers::get_valuation))
        .route(
            "/:id",
            get(handlers::get_ingredient)
                .put(handlers::update_ingredient)
                .delete(handlers::delete_ingredient),
        )
        .route("/:id/convert", post(handlers::convert_quantity))
}

/// Menu item routes
fn menu_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_menu_items).post(handlers::create_menu_item),
        )
        .route(
            "/:id",
            get(handlers::get_menu_item)
                .put(handlers::update_menu_item)
                .delete(handlers::delete_menu_item),
        )
}

/// Prep item routes
fn prep_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_prep_items).post(handlers::create_prep_item),
        )
        .route(
            "/:id",
            put(handlers::update_prep_item).delete(handlers::delete_prep_item),
        )
}

/// Stock-take routes
fn stock_take_routes() -> Router<AppState> {
    Router::new()
        .route("/sheet", get(handlers::get_sheet))
        .route(
            "/submissions",
            get(handlers::list_submissions).post(handlers::submit_count),
        )
        .route(
            "/submissions/:id",
            get(handlers::get_submission).delete(handlers::reject_submission),
        )
        .route("/submissions/:id/approve", post(handlers::approve_submission))
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/variance", get(handlers::list_variance_reports))
        .route("/variance/:id", get(handlers::get_variance_report))
        .route("/logs", get(handlers::list_logs))
}
