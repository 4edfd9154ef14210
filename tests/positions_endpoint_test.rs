use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use tradebook::api::{self, AppState};
use tradebook::db::init_db;
use tradebook::orchestration::AssignmentOrchestrator;
use tradebook::prices::StoredPrices;
use tradebook::{Config, Decimal, Repository};

struct TestApp {
    app: axum::Router,
    _temp: TempDir,
}

fn test_config() -> Config {
    Config {
        port: 0,
        database_path: ":memory:".to_string(),
        review_tolerance: Decimal::cent(),
    }
}

async fn setup_test_app() -> TestApp {
    let temp = TempDir::new().unwrap();
    let db_path = temp.path().join("test.db").to_string_lossy().to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");

    let repo = Arc::new(Repository::new(pool));
    let orchestrator = Arc::new(AssignmentOrchestrator::new(repo.clone()));
    let prices = Arc::new(StoredPrices::new(repo.clone()));
    let state = AppState::new(repo, test_config(), orchestrator, prices);
    let app = api::create_router(state);

    TestApp { app, _temp: temp }
}

async fn request(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            builder
                .body(axum::body::Body::from(value.to_string()))
                .unwrap()
        }
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn stock_position_body() -> Value {
    json!({
        "symbol": "NVDA",
        "strategy": {"kind": "stockLong"},
        "plan": {
            "entryPrice": 500,
            "quantity": 50,
            "targetPrice": 550,
            "stopPrice": 470,
            "thesis": "earnings run-up"
        }
    })
}

async fn create_stock_position(app: &axum::Router) -> String {
    let (status, body) = request(
        app.clone(),
        "POST",
        "/v1/positions",
        Some(stock_position_body()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn append(
    app: &axum::Router,
    id: &str,
    direction: &str,
    quantity: i64,
    price: f64,
    at: i64,
) -> (StatusCode, Value) {
    request(
        app.clone(),
        "POST",
        &format!("/v1/positions/{}/trades", id),
        Some(json!({
            "direction": direction,
            "quantity": quantity,
            "price": price,
            "executedAt": at
        })),
    )
    .await
}

#[tokio::test]
async fn test_create_position_starts_planned() {
    let test = setup_test_app().await;
    let (status, body) = request(
        test.app.clone(),
        "POST",
        "/v1/positions",
        Some(stock_position_body()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "planned");
    assert_eq!(body["netQuantity"], 0);
    assert_eq!(body["trades"], json!([]));
}

#[tokio::test]
async fn test_create_position_rejects_bad_quantity() {
    let test = setup_test_app().await;
    let mut body = stock_position_body();
    body["plan"]["quantity"] = json!(0);
    let (status, response) = request(test.app.clone(), "POST", "/v1/positions", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["field"], "plan.quantity");
}

#[tokio::test]
async fn test_append_trades_walks_lifecycle_and_closes_with_review() {
    let test = setup_test_app().await;
    let id = create_stock_position(&test.app).await;

    let (status, body) = append(&test.app, &id, "buy", 50, 495.0, 1_000).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "open");
    assert!(body["review"].is_null());

    let (status, body) = append(&test.app, &id, "sell", 50, 560.0, 2_000).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "closed");

    let review = &body["review"];
    assert_eq!(review["entry"]["verdict"], "better");
    assert_eq!(review["exit"]["verdict"], "better");
    assert_eq!(review["profit"]["targetProfit"], 2500.0);
    assert_eq!(review["profit"]["actualProfit"], 3250.0);
    assert_eq!(review["profit"]["verdict"], "better");
}

#[tokio::test]
async fn test_oversell_rejected_with_field_details() {
    let test = setup_test_app().await;
    let id = create_stock_position(&test.app).await;
    append(&test.app, &id, "buy", 100, 500.0, 1_000).await;

    let (status, body) = append(&test.app, &id, "sell", 150, 550.0, 2_000).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "quantity");
    assert_eq!(body["value"], "150");
    assert!(body["constraint"]
        .as_str()
        .unwrap()
        .contains("exceeds open quantity of 100"));
    assert!(body["remediation"].as_str().is_some());

    // Nothing was recorded and the status is unchanged.
    let (_, position) = request(
        test.app.clone(),
        "GET",
        &format!("/v1/positions/{}", id),
        None,
    )
    .await;
    assert_eq!(position["trades"].as_array().unwrap().len(), 1);
    assert_eq!(position["status"], "open");
}

#[tokio::test]
async fn test_exit_on_planned_position_rejected() {
    let test = setup_test_app().await;
    let id = create_stock_position(&test.app).await;

    let (status, body) = append(&test.app, &id, "sell", 10, 550.0, 1_000).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "direction");
}

#[tokio::test]
async fn test_performance_with_mark_override() {
    let test = setup_test_app().await;
    let id = create_stock_position(&test.app).await;
    append(&test.app, &id, "buy", 50, 100.0, 1_000).await;
    append(&test.app, &id, "buy", 50, 110.0, 2_000).await;
    append(&test.app, &id, "sell", 50, 120.0, 3_000).await;

    let (status, body) = request(
        test.app.clone(),
        "GET",
        &format!("/v1/positions/{}/performance?mark=120", id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["realizedPnl"], 1000.0);
    assert_eq!(body["unrealizedPnl"], 500.0);
    assert_eq!(body["totalPnl"], 1500.0);
    assert_eq!(body["fullyClosed"], false);
    assert_eq!(body["report"]["groups"][0]["report"]["openQuantity"], 50);
    assert_eq!(body["report"]["groups"][0]["report"]["avgOpenCost"], 110.0);
}

#[tokio::test]
async fn test_performance_uses_stored_close_when_no_mark_given() {
    let test = setup_test_app().await;
    let id = create_stock_position(&test.app).await;
    append(&test.app, &id, "buy", 50, 100.0, 1_000).await;

    let (status, _) = request(
        test.app.clone(),
        "PUT",
        "/v1/prices",
        Some(json!({"symbol": "NVDA", "day": "2026-01-05", "close": 104})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = request(
        test.app.clone(),
        "GET",
        &format!("/v1/positions/{}/performance", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unrealizedPnl"], 200.0);

    // With no stored price the open quantity simply carries no unrealized
    // value instead of failing the query.
    let other = setup_test_app().await;
    let id = create_stock_position(&other.app).await;
    append(&other.app, &id, "buy", 50, 100.0, 1_000).await;
    let (status, body) = request(
        other.app.clone(),
        "GET",
        &format!("/v1/positions/{}/performance", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unrealizedPnl"], 0.0);
}

#[tokio::test]
async fn test_review_conflicts_until_closed() {
    let test = setup_test_app().await;
    let id = create_stock_position(&test.app).await;
    append(&test.app, &id, "buy", 50, 495.0, 1_000).await;

    let (status, _) = request(
        test.app.clone(),
        "GET",
        &format!("/v1/positions/{}/review", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    append(&test.app, &id, "sell", 50, 560.0, 2_000).await;
    let (status, body) = request(
        test.app.clone(),
        "GET",
        &format!("/v1/positions/{}/review", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profit"]["verdict"], "better");
}

#[tokio::test]
async fn test_journal_entries_link_to_positions() {
    let test = setup_test_app().await;
    let id = create_stock_position(&test.app).await;

    let (status, entry) = request(
        test.app.clone(),
        "POST",
        "/v1/journal",
        Some(json!({"positionId": id, "body": "entered on the morning dip"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["positionId"].as_str().unwrap(), id);

    let (status, entries) = request(
        test.app.clone(),
        "GET",
        &format!("/v1/journal?positionId={}", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entries.as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["body"], "entered on the morning dip");

    // Entries cannot dangle.
    let (status, _) = request(
        test.app.clone(),
        "POST",
        "/v1/journal",
        Some(json!({
            "positionId": "00000000-0000-0000-0000-000000000000",
            "body": "nope"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_positions_filters_by_derived_status() {
    let test = setup_test_app().await;
    let open_id = create_stock_position(&test.app).await;
    append(&test.app, &open_id, "buy", 50, 500.0, 1_000).await;
    create_stock_position(&test.app).await;

    let (status, body) = request(test.app.clone(), "GET", "/v1/positions?status=open", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_str().unwrap(), open_id);

    let (status, _) = request(
        test.app.clone(),
        "GET",
        "/v1/positions?status=bogus",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_plan_preserves_trades() {
    let test = setup_test_app().await;
    let id = create_stock_position(&test.app).await;
    append(&test.app, &id, "buy", 50, 495.0, 1_000).await;

    let (status, body) = request(
        test.app.clone(),
        "PUT",
        &format!("/v1/positions/{}", id),
        Some(json!({
            "plan": {
                "entryPrice": 490,
                "quantity": 50,
                "targetPrice": 560,
                "stopPrice": 460,
                "thesis": "revised after the gap down"
            }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"]["targetPrice"], 560.0);
    assert_eq!(body["plan"]["thesis"], "revised after the gap down");
    assert_eq!(body["trades"].as_array().unwrap().len(), 1);
    assert_eq!(body["status"], "open");
}

#[tokio::test]
async fn test_unknown_position_is_not_found() {
    let test = setup_test_app().await;
    let (status, _) = request(
        test.app.clone(),
        "GET",
        "/v1/positions/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        test.app.clone(),
        "DELETE",
        "/v1/positions/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
