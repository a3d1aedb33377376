//! Catalog tests
//!
//! Ingredient, menu and prep administration, plus the read-side reports
//! served from the shared catalog snapshot.

mod common;

use common::{dec, test_app, TestApp};
use restaurant_inventory_backend::services::ingredient::IngredientInput;
use restaurant_inventory_backend::services::menu::MenuItemInput;
use restaurant_inventory_backend::services::prep::PrepItemInput;
use restaurant_inventory_backend::services::{
    IngredientService, MenuService, PrepService, ReceivingService, ReportingService, SalesImportService,
};
use restaurant_inventory_backend::store::Collection;
use restaurant_inventory_backend::AppError;
use serde_json::json;
use shared::{Ingredient, PendingReceipt, SalesRow, UnitSelection, ValuationSort};
use uuid::Uuid;

fn ingredients(app: &TestApp) -> IngredientService {
    IngredientService::new(app.state.docs.clone(), app.state.catalog.clone())
}

fn menu(app: &TestApp) -> MenuService {
    MenuService::new(app.state.docs.clone(), app.state.catalog.clone())
}

fn ingredient_input(body: serde_json::Value) -> IngredientInput {
    serde_json::from_value(body).unwrap()
}

// ============================================================================
// Ingredients
// ============================================================================

#[tokio::test]
async fn new_ingredients_start_with_zero_stock() {
    let app = test_app().await;
    let service = ingredients(&app);

    // A stock figure in the payload is not an opening balance
    let created = service
        .create(ingredient_input(json!({
            "name": "Mozzarella",
            "unit": "g",
            "cost": "0.012",
            "min_stock": "500",
            "current_stock": "2000"
        })))
        .await
        .unwrap();

    assert_eq!(created.current_stock, dec("0"));
    assert_eq!(created.version, 0);
    assert_eq!(app.stock_of(created.id).await, dec("0"));
    assert_eq!(app.count(Collection::Logs).await, 0);
}

#[tokio::test]
async fn edits_never_rewind_received_stock() {
    let app = test_app().await;
    let service = ingredients(&app);

    let created = service
        .create(ingredient_input(json!({
            "name": "Mozzarella",
            "unit": "g",
            "cost": "0.012",
            "min_stock": "500"
        })))
        .await
        .unwrap();

    ReceivingService::new(app.state.docs.clone(), app.state.catalog.clone())
        .commit(
            &[PendingReceipt {
                ingredient_id: created.id,
                quantity: dec("3000"),
                unit: UnitSelection::Base,
            }],
            "staff-1".into(),
        )
        .await
        .unwrap();

    // An edit carrying a stale stock figure must not rewind the ledger
    let updated = service
        .update(
            created.id,
            ingredient_input(json!({
                "name": "Mozzarella",
                "unit": "g",
                "cost": "0.015",
                "min_stock": "500",
                "current_stock": "0"
            })),
        )
        .await
        .unwrap();

    assert_eq!(updated.cost, dec("0.015"));
    assert_eq!(updated.current_stock, dec("3000"));
    assert_eq!(updated.version, 1);
}

#[tokio::test]
async fn delete_succeeds_when_the_catalog_reload_fails() {
    let app = test_app().await;
    let salt = app.seed_ingredient(Ingredient::new("Salt", "g", dec("0.001"))).await;

    app.store.fail_next_lists(1);
    ingredients(&app).delete(salt.id).await.unwrap();

    assert_eq!(app.count(Collection::Ingredients).await, 0);
    // Retrying reports the ingredient as already gone
    assert!(matches!(
        ingredients(&app).delete(salt.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn invalid_ingredients_are_rejected() {
    let app = test_app().await;
    let service = ingredients(&app);

    let negative = service
        .create(ingredient_input(json!({ "name": "Salt", "unit": "g", "cost": "-1" })))
        .await;
    assert!(matches!(negative, Err(AppError::Validation { .. })));

    let bad_form = service
        .create(ingredient_input(json!({
            "name": "Salt",
            "unit": "g",
            "cost": "0.001",
            "forms": [{ "name": "Bag", "ratio": "0" }]
        })))
        .await;
    assert!(matches!(bad_form, Err(AppError::Validation { .. })));

    let nameless = service
        .create(ingredient_input(json!({ "name": "   ", "unit": "g", "cost": "1" })))
        .await;
    assert!(nameless.is_err());
}

#[tokio::test]
async fn search_matches_name_or_supplier() {
    let app = test_app().await;
    let mut basil = Ingredient::new("Basil", "g", dec("0.02"));
    basil.supplier = Some("Green Farms".into());
    app.seed_ingredient(basil).await;
    app.seed_ingredient(Ingredient::new("Green Olives", "g", dec("0.01"))).await;
    app.seed_ingredient(Ingredient::new("Flour", "g", dec("0.002"))).await;

    let found = ingredients(&app).list(Some("green")).await.unwrap();
    let names: Vec<_> = found.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Basil", "Green Olives"]);
    assert_eq!(ingredients(&app).list(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn convert_uses_the_selected_form() {
    let app = test_app().await;
    let created = ingredients(&app)
        .create(ingredient_input(json!({
            "name": "Cola Can",
            "unit": "pcs",
            "cost": "0.5",
            "forms": [{ "name": "Case of 24", "ratio": "24" }]
        })))
        .await
        .unwrap();

    let converted = ingredients(&app)
        .convert(created.id, UnitSelection::Form(0), dec("3"))
        .await
        .unwrap();
    assert_eq!(converted.base_quantity, dec("72"));
    assert_eq!(converted.label, "Case of 24");

    let missing = ingredients(&app)
        .convert(Uuid::new_v4(), UnitSelection::Base, dec("1"))
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn valuation_totals_and_sorts() {
    let app = test_app().await;
    app.seed_ingredient(Ingredient::new("Saffron", "g", dec("8")).with_stock(dec("10")))
        .await;
    app.seed_ingredient(Ingredient::new("Flour", "g", dec("0.002")).with_stock(dec("10000")))
        .await;

    let valuation = ingredients(&app).valuation(ValuationSort::Value).await.unwrap();
    assert_eq!(valuation.grand_total, dec("100"));
    assert_eq!(valuation.lines[0].name, "Saffron");

    let by_name = ingredients(&app).valuation(ValuationSort::Name).await.unwrap();
    assert_eq!(by_name.lines[0].name, "Flour");

    let csv = ReportingService::valuation_to_csv(&valuation).unwrap();
    assert!(csv.lines().count() >= 3);
}

// ============================================================================
// Menu and prep items
// ============================================================================

#[tokio::test]
async fn menu_items_are_costed_and_names_stay_unique() {
    let app = test_app().await;
    let dough = app
        .seed_ingredient(Ingredient::new("Dough", "g", dec("0.002")))
        .await;

    let input: MenuItemInput = serde_json::from_value(json!({
        "name": "Margarita Pizza",
        "category": "Pizza",
        "type": "recipe",
        "recipe": [{ "ingredient_id": dough.id, "qty": "200" }],
        "other_cost": "1"
    }))
    .unwrap();
    let created = menu(&app).create(input.clone()).await.unwrap();

    assert_eq!(created.total_cost, dec("1.4"));
    assert!(matches!(
        &created.item.kind,
        shared::MenuItemKind::Recipe { recipe, .. } if recipe[0].ingredient_name == "Dough"
    ));

    let mut duplicate = input;
    duplicate.name = "margarita pizza".into();
    assert!(matches!(
        menu(&app).create(duplicate).await,
        Err(AppError::Conflict { .. })
    ));
}

#[tokio::test]
async fn menu_edits_keep_the_sold_count() {
    let app = test_app().await;
    let input: MenuItemInput = serde_json::from_value(json!({
        "name": "Tap Water",
        "category": "Drinks",
        "type": "non_stock"
    }))
    .unwrap();
    let created = menu(&app).create(input.clone()).await.unwrap();

    SalesImportService::new(app.state.docs.clone(), app.state.catalog.clone())
        .apply(&[SalesRow { qty: 6, name: "Tap Water".into() }], "staff-1".into())
        .await
        .unwrap();

    let mut renamed = input;
    renamed.name = "Still Water".into();
    let updated = menu(&app).update(created.item.id, renamed).await.unwrap();
    assert_eq!(updated.item.name, "Still Water");
    assert_eq!(updated.item.sold_count, 6);
}

#[tokio::test]
async fn recipes_must_reference_known_ingredients() {
    let app = test_app().await;
    let input: MenuItemInput = serde_json::from_value(json!({
        "name": "Mystery Dish",
        "type": "recipe",
        "recipe": [{ "ingredient_id": Uuid::new_v4(), "qty": "1" }]
    }))
    .unwrap();
    assert!(matches!(
        menu(&app).create(input).await,
        Err(AppError::Validation { .. })
    ));
}

#[tokio::test]
async fn prep_items_validate_their_composition() {
    let app = test_app().await;
    let flour = app
        .seed_ingredient(Ingredient::new("Flour", "g", dec("0.002")))
        .await;
    let service = PrepService::new(app.state.docs.clone(), app.state.catalog.clone());

    let good: PrepItemInput = serde_json::from_value(json!({
        "name": "Dough Ball",
        "storage_area": "Front Fridge",
        "composition": [{ "ingredient_id": flour.id, "qty": "250" }]
    }))
    .unwrap();
    let prep = service.create(good).await.unwrap();
    assert_eq!(service.list().await.unwrap().len(), 1);

    let unknown: PrepItemInput = serde_json::from_value(json!({
        "name": "Ghost Ball",
        "composition": [{ "ingredient_id": Uuid::new_v4(), "qty": "1" }]
    }))
    .unwrap();
    assert!(matches!(
        service.create(unknown).await,
        Err(AppError::Validation { .. })
    ));

    service.delete(prep.id).await.unwrap();
    assert!(matches!(
        service.delete(prep.id).await,
        Err(AppError::NotFound(_))
    ));
}

// ============================================================================
// Reporting
// ============================================================================

#[tokio::test]
async fn dashboard_counts_low_stock_and_pending() {
    let app = test_app().await;
    let mut low = Ingredient::new("Yeast", "g", dec("0.05")).with_stock(dec("20"));
    low.min_stock = dec("100");
    app.seed_ingredient(low).await;
    app.seed_ingredient(Ingredient::new("Flour", "g", dec("0.002")).with_stock(dec("5000")))
        .await;

    let stats = ReportingService::new(app.state.docs.clone(), app.state.catalog.clone())
        .dashboard()
        .await
        .unwrap();

    assert_eq!(stats.total_ingredients, 2);
    assert_eq!(stats.low_stock, 1);
    assert_eq!(stats.pending_counts, 0);
    assert_eq!(stats.stock_value, dec("11"));
}
