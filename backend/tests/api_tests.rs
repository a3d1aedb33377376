//! HTTP API tests
//!
//! Drive the full router with `tower::ServiceExt::oneshot`: routing, the
//! session middleware, role checks and the error envelope.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::{dec, test_app, TestApp};
use restaurant_inventory_backend::create_app;
use serde_json::{json, Value};
use shared::{Ingredient, DEFAULT_ADMIN_PIN};
use tower::ServiceExt;

fn router(app: &TestApp) -> Router {
    create_app(app.state.clone())
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(app).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn staff_token(app: &TestApp) -> String {
    let (status, body) = send(
        app,
        json_request("POST", "/api/v1/session/staff", None, json!({ "user_id": "till-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["access_token"].as_str().unwrap().to_string()
}

async fn admin_token(app: &TestApp) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/v1/session/admin",
            None,
            json!({ "user_id": "manager", "pin": DEFAULT_ADMIN_PIN }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["access_token"].as_str().unwrap().to_string()
}

// ============================================================================
// Public routes and authentication
// ============================================================================

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let (status, body) = send(&app, get_request("/api/v1/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = test_app().await;
    let (status, body) = send(&app, get_request("/api/v1/ingredients", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let app = test_app().await;
    let (status, _) = send(&app, get_request("/api/v1/ingredients", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_pin_gets_no_admin_session() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        json_request("POST", "/api/v1/session/admin", None, json!({ "pin": "0000" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INCORRECT_PIN");
}

// ============================================================================
// Roles
// ============================================================================

#[tokio::test]
async fn staff_cannot_edit_the_catalog() {
    let app = test_app().await;
    let token = staff_token(&app).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/ingredients",
            Some(&token),
            json!({ "name": "Flour", "unit": "g", "cost": "0.002" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_creates_and_staff_reads_ingredients() {
    let app = test_app().await;
    let admin = admin_token(&app).await;

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/ingredients",
            Some(&admin),
            json!({
                "name": "  Flour ",
                "unit": "g",
                "cost": "0.002",
                "forms": [{ "name": "2kg Pack", "ratio": "2000" }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Flour");
    assert_eq!(created["current_stock"], "0");

    let staff = staff_token(&app).await;
    let (status, list) = send(&app, get_request("/api/v1/ingredients?search=flo", Some(&staff))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_ingredient_names_conflict() {
    let app = test_app().await;
    app.seed_ingredient(Ingredient::new("Flour", "g", dec("0.002"))).await;
    let admin = admin_token(&app).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/ingredients",
            Some(&admin),
            json!({ "name": "flour", "unit": "g", "cost": "0.003" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// ============================================================================
// Stock flows over HTTP
// ============================================================================

#[tokio::test]
async fn staff_submits_and_admin_approves_a_count() {
    let app = test_app().await;
    let tomatoes = app
        .seed_ingredient(Ingredient::new("Tomatoes", "pcs", dec("0.3")).with_stock(dec("40")))
        .await;
    let staff = staff_token(&app).await;

    let (status, submission) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/stock-take/submissions",
            Some(&staff),
            json!({ "entries": [
                { "field": "loose", "ingredient_id": tomatoes.id, "value": 37 }
            ] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = submission["id"].as_str().unwrap().to_string();
    let approve_uri = format!("/api/v1/stock-take/submissions/{}/approve", id);

    let (status, _) = send(&app, json_request("POST", &approve_uri, Some(&staff), json!({}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = admin_token(&app).await;
    let (status, _) = send(&app, json_request("POST", &approve_uri, Some(&admin), json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.stock_of(tomatoes.id).await, dec("37"));

    let (status, body) = send(&app, json_request("POST", &approve_uri, Some(&admin), json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INVALID_STATE_TRANSITION");
}

#[tokio::test]
async fn receiving_accepts_typed_quantities() {
    let app = test_app().await;
    let flour = app
        .seed_ingredient(Ingredient::new("Flour", "g", dec("0.002")).with_stock(dec("100")))
        .await;
    let staff = staff_token(&app).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/receiving/commit",
            Some(&staff),
            json!({ "items": [
                { "ingredient_id": flour.id, "quantity": "250" },
                { "ingredient_id": flour.id, "quantity": 50 }
            ] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totals"].as_array().unwrap().len(), 1);
    assert_eq!(app.stock_of(flour.id).await, dec("400"));
}

#[tokio::test]
async fn reset_requires_admin_and_pin() {
    let app = test_app().await;
    let flour = app
        .seed_ingredient(Ingredient::new("Flour", "g", dec("0.002")).with_stock(dec("100")))
        .await;
    let admin = admin_token(&app).await;

    let (status, _) = send(
        &app,
        json_request("POST", "/api/v1/ledger/reset", Some(&admin), json!({ "pin": "0000" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.stock_of(flour.id).await, dec("100"));

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/ledger/reset",
            Some(&admin),
            json!({ "pin": DEFAULT_ADMIN_PIN }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.stock_of(flour.id).await, dec("0"));
}
