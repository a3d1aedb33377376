//! Ledger tests
//!
//! Every stock movement lands as one batch: either all of its writes are
//! visible afterwards or none are.

mod common;

use common::{dec, test_app, TestApp};
use restaurant_inventory_backend::services::{LedgerService, StockTakeService};
use restaurant_inventory_backend::store::Collection;
use restaurant_inventory_backend::AppError;
use shared::{
    plan_approval, ActivityLogEntry, CountEntry, CountField, Ingredient, LedgerBatch, LedgerReason,
    SubmissionStatus,
};

fn ledger(app: &TestApp) -> LedgerService {
    LedgerService::new(app.state.docs.clone(), app.state.catalog.clone())
}

async fn two_ingredients(app: &TestApp) -> (Ingredient, Ingredient) {
    let rice = app
        .seed_ingredient(Ingredient::new("Rice", "g", dec("0.003")).with_stock(dec("2000")))
        .await;
    let oil = app
        .seed_ingredient(Ingredient::new("Oil", "ml", dec("0.01")).with_stock(dec("700")))
        .await;
    (rice, oil)
}

// ============================================================================
// Atomicity
// ============================================================================

#[tokio::test]
async fn failure_mid_batch_leaves_no_partial_writes() {
    let app = test_app().await;
    let (rice, oil) = two_ingredients(&app).await;

    let mut batch = LedgerBatch::new(LedgerReason::Receiving, "staff-1".into());
    batch.increment(rice.id, dec("500")).unwrap();
    batch.increment(oil.id, dec("250")).unwrap();
    let batch = batch.with_log("Received:\n- 500 g Rice\n- 250 ml Oil");

    // Second write fails after the first was staged
    app.store.fail_commit_at(1);
    let result = ledger(&app).commit(&batch).await;

    assert!(matches!(result, Err(AppError::BatchFailed(_))));
    assert_eq!(app.stock_of(rice.id).await, dec("2000"));
    assert_eq!(app.stock_of(oil.id).await, dec("700"));
    assert_eq!(app.count(Collection::Logs).await, 0);
}

#[tokio::test]
async fn failed_approval_keeps_submission_pending() {
    let app = test_app().await;
    let (rice, _) = two_ingredients(&app).await;
    let service = StockTakeService::new(app.state.docs.clone(), app.state.catalog.clone(), false);

    let entries = vec![CountEntry {
        field: CountField::Loose { ingredient_id: rice.id },
        value: "1500".into(),
    }];
    let submission = service.submit(&entries, "staff-1".into()).await.unwrap();

    // Fail on the report write, after the pending check, both stock sets
    // and the status fields
    app.store.fail_commit_at(6);
    assert!(service.approve(submission.id, "admin-1".into()).await.is_err());

    assert_eq!(app.stock_of(rice.id).await, dec("2000"));
    let stored = service.get(submission.id).await.unwrap();
    assert_eq!(stored.status, SubmissionStatus::Pending);
    assert_eq!(app.count(Collection::VarianceReports).await, 0);

    // Disarmed after one use
    service.approve(submission.id, "admin-1".into()).await.unwrap();
    assert_eq!(app.stock_of(rice.id).await, dec("1500"));
}

#[tokio::test]
async fn increments_on_a_missing_ingredient_abort_the_batch() {
    let app = test_app().await;
    let (rice, oil) = two_ingredients(&app).await;
    app.state.docs.delete(Collection::Ingredients, oil.id).await.unwrap();

    let mut batch = LedgerBatch::new(LedgerReason::Receiving, "staff-1".into());
    batch.increment(rice.id, dec("10")).unwrap();
    batch.increment(oil.id, dec("10")).unwrap();

    assert!(ledger(&app).commit(&batch).await.is_err());
    assert_eq!(app.stock_of(rice.id).await, dec("2000"));
}

#[tokio::test]
async fn replayed_approval_batch_is_a_conflict() {
    let app = test_app().await;
    let (rice, oil) = two_ingredients(&app).await;
    let service = StockTakeService::new(app.state.docs.clone(), app.state.catalog.clone(), false);

    let entries = vec![CountEntry {
        field: CountField::Loose { ingredient_id: rice.id },
        value: "1500".into(),
    }];
    let submission = service.submit(&entries, "staff-1".into()).await.unwrap();

    // Both admins planned against the same pending read
    let planned = plan_approval(&submission, &[rice.clone(), oil], "admin-1".into(), false).unwrap();
    ledger(&app).commit(&planned).await.unwrap();

    let replay = ledger(&app).commit(&planned).await;
    assert!(matches!(replay, Err(AppError::Conflict { .. })));
    assert_eq!(app.count(Collection::VarianceReports).await, 1);
    assert_eq!(app.count(Collection::Logs).await, 1);
    assert_eq!(app.stock_of(rice.id).await, dec("1500"));
}

// ============================================================================
// Catalog refresh
// ============================================================================

#[tokio::test]
async fn failed_refresh_after_commit_still_reports_success() {
    let app = test_app().await;
    let (rice, _) = two_ingredients(&app).await;

    let mut batch = LedgerBatch::new(LedgerReason::Receiving, "staff-1".into());
    batch.increment(rice.id, dec("500")).unwrap();
    let batch = batch.with_log("Received:\n- 500 g Rice");

    // The commit lands, then the catalog reload cannot list ingredients
    app.store.fail_next_lists(1);
    ledger(&app).commit(&batch).await.unwrap();

    assert_eq!(app.stock_of(rice.id).await, dec("2500"));
    assert_eq!(app.count(Collection::Logs).await, 1);
    let stale = app.state.catalog.snapshot().await;
    let cached = stale.ingredients.iter().find(|i| i.id == rice.id).unwrap();
    assert_eq!(cached.current_stock, dec("2000"));

    // The next refresh catches up
    app.refresh().await;
    let fresh = app.state.catalog.snapshot().await;
    let cached = fresh.ingredients.iter().find(|i| i.id == rice.id).unwrap();
    assert_eq!(cached.current_stock, dec("2500"));
}

// ============================================================================
// Reset
// ============================================================================

#[tokio::test]
async fn reset_zeroes_every_ingredient() {
    let app = test_app().await;
    let (rice, oil) = two_ingredients(&app).await;

    let batch = ledger(&app).reset("admin-1".into()).await.unwrap();
    assert_eq!(batch.stock.len(), 2);

    assert_eq!(app.stock_of(rice.id).await, dec("0"));
    assert_eq!(app.stock_of(oil.id).await, dec("0"));
    assert!(app
        .state
        .catalog
        .snapshot()
        .await
        .ingredients
        .iter()
        .all(|i| i.current_stock.is_zero()));

    let logs: Vec<ActivityLogEntry> = app.state.docs.list(Collection::Logs).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, "Reset stock to zero for 2 ingredients");
}

#[tokio::test]
async fn reset_with_no_ingredients_is_rejected() {
    let app = test_app().await;
    let result = ledger(&app).reset("admin-1".into()).await;
    assert!(matches!(result, Err(AppError::Validation { .. })));
}
