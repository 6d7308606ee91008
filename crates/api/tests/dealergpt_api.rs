//! End-to-end behaviour of the `/api/dealergpt` routes.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, create_user, get_auth, post_json_auth, ScriptedLlm};
use dealergpt_core::context::FALLBACK_SUGGESTIONS;
use dealergpt_db::models::vehicle::CreateVehicle;
use dealergpt_db::repositories::VehicleRepo;
use serde_json::json;
use sqlx::PgPool;

async fn seed_stock(pool: &PgPool, stock_number: &str, make: &str, days_in_stock: i64) {
    VehicleRepo::create(
        pool,
        &CreateVehicle {
            stock_number: stock_number.to_string(),
            registration: None,
            make: make.to_string(),
            model: "Estate".to_string(),
            derivative: None,
            sales_status: Some("stock".to_string()),
            purchase_date: Some(Utc::now().date_naive() - Duration::days(days_in_stock)),
            purchase_price: Some(12_000.0),
            sale_date: None,
            sale_price: None,
            salesperson_id: None,
        },
    )
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn conversation_answers_and_is_recorded(pool: PgPool) {
    let (_, token) = create_user(&pool, "manager", "manager").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/dealergpt/conversation",
        json!({ "message": "How is our inventory looking?", "sessionId": "s-1" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["message"], "Here is what I found.");
    assert_eq!(data["sessionId"], "s-1");
    assert_eq!(data["contextUsed"], json!(["inventory_data"]));
    assert_eq!(data["suggestions"].as_array().unwrap().len(), 4);
    assert!(data["responseTime"].as_u64().is_some());
    assert!(data["degraded"].is_null());

    let response = get_auth(app, "/api/dealergpt/history?sessionId=s-1", &token).await;
    let history = body_json(response).await["data"].clone();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["message"], "How is our inventory looking?");
    assert_eq!(history[0]["context_used"], json!(["inventory_data"]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_id_is_generated_when_missing(pool: PgPool) {
    let (_, token) = create_user(&pool, "manager", "manager").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/dealergpt/conversation",
        json!({ "message": "hello" }),
        &token,
    )
    .await;
    let data = body_json(response).await["data"].clone();
    assert!(!data["sessionId"].as_str().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn model_failure_yields_flagged_fallback(pool: PgPool) {
    let (_, token) = create_user(&pool, "manager", "manager").await;
    let app = common::build_test_app_with(pool, ScriptedLlm::failing());

    let response = post_json_auth(
        app.clone(),
        "/api/dealergpt/conversation",
        json!({ "message": "What were sales like?", "sessionId": "s-2" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["degraded"], "model_unavailable");
    assert_eq!(data["contextUsed"], json!([]));
    assert_eq!(data["suggestions"], json!(FALLBACK_SUGGESTIONS));

    // Fallback answers are not stored as history.
    let response = get_auth(app, "/api/dealergpt/history?sessionId=s-2", &token).await;
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_messages_are_rejected(pool: PgPool) {
    let (_, token) = create_user(&pool, "manager", "manager").await;
    let app = common::build_test_app(pool);

    for message in ["   ".to_string(), "x".repeat(4_001)] {
        let response = post_json_auth(
            app.clone(),
            "/api/dealergpt/conversation",
            json!({ "message": message }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn greeting_summarises_live_data(pool: PgPool) {
    let (_, token) = create_user(&pool, "manager", "manager").await;
    seed_stock(&pool, "G1", "Ford", 10).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/dealergpt/greeting", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    let message = data["message"].as_str().unwrap();
    assert!(message.starts_with("Good "));
    assert!(message.contains("1 vehicles in stock"));
    assert!(data["degraded"].is_null());
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn insight_generation_acknowledgement_flow(pool: PgPool) {
    let (_, admin) = create_user(&pool, "admin", "admin").await;
    let (_, sales) = create_user(&pool, "sam", "salesperson").await;
    seed_stock(&pool, "A1", "Vauxhall", 120).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/dealergpt/insights/generate",
        json!({}),
        &sales,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app.clone(),
        "/api/dealergpt/insights/generate",
        json!({}),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let generated = body_json(response).await["data"].clone();
    let types: Vec<&str> = generated
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["insight_type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"aged_stock"));
    assert!(types.contains(&"low_stock"));

    // A second run finds every type already live.
    let response = post_json_auth(
        app.clone(),
        "/api/dealergpt/insights/generate",
        json!({}),
        &admin,
    )
    .await;
    assert_eq!(body_json(response).await["data"], json!([]));

    let response = get_auth(app.clone(), "/api/dealergpt/insights", &sales).await;
    let listed = body_json(response).await["data"].clone();
    assert_eq!(listed.as_array().unwrap().len(), generated.as_array().unwrap().len());
    let id = listed[0]["id"].as_i64().unwrap();

    let uri = format!("/api/dealergpt/insights/{id}/acknowledge");
    let first = post_json_auth(app.clone(), &uri, json!({}), &sales).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["data"]["already_acknowledged"], false);

    let second = post_json_auth(app.clone(), &uri, json!({}), &sales).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_json(second).await["data"]["already_acknowledged"], true);

    let response = get_auth(app.clone(), "/api/dealergpt/insights", &sales).await;
    let remaining = body_json(response).await["data"].clone();
    assert!(remaining.as_array().unwrap().iter().all(|i| i["id"] != id));

    let missing = post_json_auth(
        app,
        &format!("/api/dealergpt/insights/{}/acknowledge", id + 1_000),
        json!({}),
        &sales,
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn memory_save_get_search(pool: PgPool) {
    let (_, token) = create_user(&pool, "manager", "manager").await;
    let app = common::build_test_app(pool);

    for note in ["first", "second"] {
        let response = post_json_auth(
            app.clone(),
            "/api/dealergpt/memory",
            json!({
                "key": "pref:weekly-report",
                "entity_type": "preference",
                "data": { "note": note },
                "tags": ["reporting"],
                "priority": "high"
            }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get_auth(
        app.clone(),
        "/api/dealergpt/memory?key=pref:weekly-report",
        &token,
    )
    .await;
    let entry = body_json(response).await["data"].clone();
    assert_eq!(entry["data"], json!({ "note": "second" }));

    let response = get_auth(app.clone(), "/api/dealergpt/memory", &token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = get_auth(app.clone(), "/api/dealergpt/memory/search?query=REPORT", &token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);

    let response = get_auth(app.clone(), "/api/dealergpt/memory/search?query=%20", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(app.clone(), "/api/dealergpt/memory?key=missing", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app,
        "/api/dealergpt/memory",
        json!({ "key": "k", "entity_type": "note", "priority": "critical" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn prune_is_admin_only_and_validated(pool: PgPool) {
    let (_, admin) = create_user(&pool, "admin", "admin").await;
    let (_, manager) = create_user(&pool, "manager", "manager").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/dealergpt/memory/prune",
        json!({ "days": 90 }),
        &manager,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app.clone(),
        "/api/dealergpt/memory/prune",
        json!({ "days": 0 }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        "/api/dealergpt/memory/prune",
        json!({ "days": 90 }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["total_deleted"], 0);
}

// ---------------------------------------------------------------------------
// Business views, health, capabilities
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn snapshot_and_inventory_slice(pool: PgPool) {
    let (_, token) = create_user(&pool, "manager", "manager").await;
    seed_stock(&pool, "B1", "BMW", 20).await;
    seed_stock(&pool, "B2", "BMW", 100).await;
    seed_stock(&pool, "F1", "Ford", 5).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/dealergpt/snapshot", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = body_json(response).await["data"].clone();
    assert_eq!(snapshot["inventory"]["stock_count"], 3);
    assert_eq!(snapshot["inventory"]["aged_stock_count"], 1);

    let response = get_auth(app.clone(), "/api/dealergpt/inventory?make=BMW", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let slice = body_json(response).await["data"].clone();
    assert_eq!(slice["matched"], 2);
    assert_eq!(slice["truncated"], false);

    let response = get_auth(app, "/api/dealergpt/inventory?status=scrapped", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_probes_every_source(pool: PgPool) {
    let (_, token) = create_user(&pool, "manager", "manager").await;
    let app = common::build_test_app(pool.clone());

    let response = get_auth(app, "/api/dealergpt/health", &token).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["status"], "healthy");
    assert_eq!(data["model"]["configured"], true);
    let sources = data["data_sources"].as_array().unwrap();
    assert_eq!(sources.len(), 10);
    assert!(sources.iter().all(|s| s["healthy"] == true));

    let app = common::build_test_app_with(pool, ScriptedLlm::failing());
    let response = get_auth(app, "/api/dealergpt/health", &token).await;
    assert_eq!(body_json(response).await["data"]["status"], "degraded");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn capabilities_describe_limits(pool: PgPool) {
    let (_, token) = create_user(&pool, "sam", "salesperson").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/dealergpt/capabilities", &token).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["name"], "DealerGPT");
    assert_eq!(data["currency"], "GBP");
    assert_eq!(data["limits"]["max_message_length"], 4_000);
    assert_eq!(data["data_sources"].as_array().unwrap().len(), 10);
}
