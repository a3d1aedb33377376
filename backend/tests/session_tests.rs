//! Session and admin PIN tests

mod common;

use common::{test_app, TestApp};
use jsonwebtoken::{decode, DecodingKey, Validation};
use restaurant_inventory_backend::middleware::Claims;
use restaurant_inventory_backend::services::SessionService;
use restaurant_inventory_backend::store::Collection;
use restaurant_inventory_backend::AppError;
use shared::{Role, DEFAULT_ADMIN_PIN};

fn sessions(app: &TestApp) -> SessionService {
    SessionService::new(app.state.docs.clone(), &app.state.config)
}

fn claims_of(app: &TestApp, token: &str) -> Claims {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(app.state.config.jwt.secret.as_bytes()),
        &Validation::default(),
    )
    .unwrap()
    .claims
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn staff_session_carries_the_staff_role() {
    let app = test_app().await;
    let token = sessions(&app).staff_session(Some("till-2".into())).unwrap();

    assert_eq!(token.role, Role::Staff);
    assert_eq!(token.user_id, "till-2");
    let claims = claims_of(&app, &token.access_token);
    assert_eq!(claims.sub, "till-2");
    assert_eq!(claims.role, Role::Staff);
}

#[tokio::test]
async fn anonymous_sessions_get_a_generated_id() {
    let app = test_app().await;
    let a = sessions(&app).staff_session(None).unwrap();
    let b = sessions(&app).staff_session(Some("  ".into())).unwrap();

    assert!(!a.user_id.is_empty());
    assert_ne!(a.user_id, b.user_id);
}

#[tokio::test]
async fn default_pin_opens_an_admin_session() {
    let app = test_app().await;
    let token = sessions(&app)
        .admin_session(Some("manager".into()), DEFAULT_ADMIN_PIN)
        .await
        .unwrap();

    assert_eq!(token.role, Role::Admin);
    assert_eq!(claims_of(&app, &token.access_token).role, Role::Admin);
}

#[tokio::test]
async fn wrong_pin_is_refused() {
    let app = test_app().await;
    let result = sessions(&app).admin_session(None, "0000").await;
    assert!(matches!(result, Err(AppError::IncorrectPin)));
}

// ============================================================================
// PIN change
// ============================================================================

#[tokio::test]
async fn changed_pin_replaces_the_old_one() {
    let app = test_app().await;
    let service = sessions(&app);

    service
        .change_pin("manager".into(), DEFAULT_ADMIN_PIN, "9876", "9876")
        .await
        .unwrap();

    assert!(matches!(
        service.verify_pin(DEFAULT_ADMIN_PIN).await,
        Err(AppError::IncorrectPin)
    ));
    service.verify_pin("9876").await.unwrap();
    assert_eq!(app.count(Collection::Settings).await, 1);
    assert_eq!(app.count(Collection::Logs).await, 1);
}

#[tokio::test]
async fn mismatched_confirmation_is_a_validation_error() {
    let app = test_app().await;
    let result = sessions(&app)
        .change_pin("manager".into(), DEFAULT_ADMIN_PIN, "9876", "9867")
        .await;

    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "confirm_pin"),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(app.count(Collection::Settings).await, 0);
}

#[tokio::test]
async fn pin_change_requires_the_current_pin() {
    let app = test_app().await;
    let result = sessions(&app)
        .change_pin("manager".into(), "1111", "9876", "9876")
        .await;

    assert!(matches!(result, Err(AppError::IncorrectPin)));
    sessions(&app).verify_pin(DEFAULT_ADMIN_PIN).await.unwrap();
}

#[tokio::test]
async fn malformed_new_pin_is_rejected() {
    let app = test_app().await;
    let result = sessions(&app)
        .change_pin("manager".into(), DEFAULT_ADMIN_PIN, "12ab", "12ab")
        .await;
    assert!(matches!(result, Err(AppError::Validation { .. })));
}
