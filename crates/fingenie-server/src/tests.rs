//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use fingenie_core::db::Database;
use fingenie_core::test_utils::{Behavior, MockCompletionServer};
use fingenie_core::{ExtractionConfig, MockBackend};
use http_body_util::BodyExt;
use std::time::Duration;
use tower::ServiceExt;

const DINNER_REPLY: &str = r#"Sure! {"description": "Dinner with Rahul and Sneha", "amount": 900, "category": "food", "payment_method": "GPay", "date": "2025-07-01", "split_with": ["Rahul", "Sneha"]}"#;

fn setup_test_app() -> Router {
    setup_with_backend(MockBackend::new()).0
}

fn setup_with_backend(backend: MockBackend) -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    let app = create_router(
        db.clone(),
        AIClient::Mock(backend),
        None,
        ServerConfig::default(),
    );
    (app, db)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ========== Health ==========

#[tokio::test]
async fn test_health_at_root_and_api() {
    for uri in ["/health", "/api/health"] {
        let response = setup_test_app().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = get_body_json(response).await;
        assert_eq!(json["status"], "ok");
    }
}

#[tokio::test]
async fn test_security_headers() {
    let response = setup_test_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}

// ========== Direct create ==========

#[tokio::test]
async fn test_create_transaction() {
    let (app, db) = setup_with_backend(MockBackend::new());

    let body = serde_json::json!({
        "amount": 250.0,
        "category": "groceries",
        "mode": "UPI",
        "date": "2025-07-01",
        "split_with": ["Amit"]
    });
    let response = app
        .oneshot(post_json("/api/transactions", &body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Expense saved successfully");
    let id: i64 = json["id"].as_str().unwrap().parse().unwrap();

    let stored = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(stored.category, "groceries");
    assert_eq!(stored.mode, fingenie_core::PaymentMethod::Upi);
    assert_eq!(stored.split_with, vec!["Amit"]);
    assert_eq!(stored.source, fingenie_core::TransactionSource::Manual);
}

#[tokio::test]
async fn test_save_expense_alias_and_defaults() {
    let (app, db) = setup_with_backend(MockBackend::new());

    let response = app
        .oneshot(post_json(
            "/save-expense",
            r#"{"amount": 40, "category": "tea", "payment_method": "Bitcoin"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = &db.list_transactions().unwrap()[0];
    assert_eq!(stored.mode, fingenie_core::PaymentMethod::Other);
    assert_eq!(stored.date, chrono::Local::now().date_naive());
    assert!(stored.split_with.is_empty());
}

#[tokio::test]
async fn test_create_zero_amount_rejected() {
    let (app, db) = setup_with_backend(MockBackend::new());

    let response = app
        .oneshot(post_json(
            "/api/transactions",
            r#"{"amount": 0, "category": "food", "mode": "Cash"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Invalid transaction data");
    assert!(json["details"].as_str().unwrap().contains("amount"));
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[tokio::test]
async fn test_create_missing_field_is_unprocessable() {
    let response = setup_test_app()
        .oneshot(post_json("/transactions", r#"{"category": "food"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_bad_date_is_unprocessable() {
    let response = setup_test_app()
        .oneshot(post_json(
            "/transactions",
            r#"{"amount": 10, "category": "food", "date": "yesterday"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_malformed_json_is_bad_request() {
    let response = setup_test_app()
        .oneshot(post_json("/transactions", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Invalid JSON");
}

// ========== List ==========

#[tokio::test]
async fn test_list_transactions_oldest_first() {
    let (app, _db) = setup_with_backend(MockBackend::new());

    for (amount, category) in [(10, "a"), (20, "b")] {
        let body = format!(r#"{{"amount": {}, "category": "{}"}}"#, amount, category);
        let response = app
            .clone()
            .oneshot(post_json("/transactions", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get("/api/transactions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["category"], "a");
    assert_eq!(list[1]["category"], "b");
    assert_eq!(list[0]["mode"], "Other");
}

#[tokio::test]
async fn test_list_empty() {
    let response = setup_test_app().oneshot(get("/transactions")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await, serde_json::json!([]));
}

// ========== Voice ==========

#[tokio::test]
async fn test_voice_expense_success() {
    let backend = MockBackend::with_reply(DINNER_REPLY);
    let (app, db) = setup_with_backend(backend.clone());

    let transcript = "Yesterday I paid 900 for dinner with Rahul and Sneha via GPay";
    let body = serde_json::json!({ "transcript": transcript });
    let response = app
        .oneshot(post_json("/api/voice-expense", &body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Expense saved successfully");
    assert_eq!(json["parsed"]["amount"], 900.0);
    assert_eq!(json["parsed"]["mode"], "GPay");
    assert_eq!(json["parsed"]["date"], "2025-07-01");
    assert_eq!(json["parsed"]["split_with"], serde_json::json!(["Rahul", "Sneha"]));
    assert_eq!(json["parsed"]["source"], "voice");
    assert_eq!(json["parsed"]["transcript"], transcript);
    assert_eq!(json["id"], json["parsed"]["id"].to_string());

    assert_eq!(db.count_transactions().unwrap(), 1);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_voice_empty_transcript_skips_model() {
    let backend = MockBackend::new();
    let (app, db) = setup_with_backend(backend.clone());

    for body in [r#"{"transcript": ""}"#, r#"{"transcript": "   "}"#, "{}"] {
        let response = app
            .clone()
            .oneshot(post_json("/voice-expense", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = get_body_json(response).await;
        assert_eq!(json["error"], "Transcript is required");
    }

    assert_eq!(backend.call_count(), 0);
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[tokio::test]
async fn test_voice_prose_reply_is_bad_gateway() {
    let reply = "I'm sorry, I couldn't understand that.";
    let (app, db) = setup_with_backend(MockBackend::with_reply(reply));

    let response = app
        .oneshot(post_json("/voice-expense", r#"{"transcript": "hmm"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "No valid JSON found in LLM response");
    assert!(json["details"].is_string());
    assert_eq!(json["raw"], reply);
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[tokio::test]
async fn test_voice_invalid_json_reply_is_bad_gateway() {
    let (app, _db) = setup_with_backend(MockBackend::with_reply("{amount: 900}"));
    let response = app
        .oneshot(post_json("/voice-expense", r#"{"transcript": "900 dinner"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Failed to parse LLM response");
}

#[tokio::test]
async fn test_voice_zero_amount_is_unprocessable() {
    let reply = r#"Here: {"amount": 0, "category": "food", "payment_method": "Cash"}"#;
    let (app, db) = setup_with_backend(MockBackend::with_reply(reply));

    let response = app
        .oneshot(post_json("/voice-expense", r#"{"transcript": "lunch"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Invalid transaction data");
    assert!(json["details"]
        .as_str()
        .unwrap()
        .contains("amount must be greater than 0"));
    assert_eq!(json["raw"], reply);
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[tokio::test]
async fn test_voice_upstream_failure_is_bad_gateway() {
    let (app, _db) = setup_with_backend(MockBackend::failing(503, "overloaded"));
    let response = app
        .oneshot(post_json("/voice-expense", r#"{"transcript": "paid 5"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = get_body_json(response).await;
    assert_eq!(json["raw"], "overloaded");
}

#[tokio::test]
async fn test_voice_missing_credential_is_server_error() {
    let db = Database::in_memory().unwrap();
    let ai = AIClient::from_config(ExtractionConfig::default());
    let app = create_router(db, ai, None, ServerConfig::default());

    let response = app
        .oneshot(post_json("/voice-expense", r#"{"transcript": "paid 5"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "LLM is not configured");
}

#[tokio::test]
async fn test_voice_timeout_is_gateway_timeout() {
    let server = MockCompletionServer::start_with(Behavior::Delayed {
        delay: Duration::from_secs(5),
        reply: DINNER_REPLY.into(),
    })
    .await;
    let ai = AIClient::from_config(ExtractionConfig {
        endpoint_url: server.endpoint_url(),
        credential: Some("sk-test".into()),
        request_timeout: Some(Duration::from_millis(100)),
        ..Default::default()
    });
    let app = create_router(Database::in_memory().unwrap(), ai, None, ServerConfig::default());

    let response = app
        .oneshot(post_json("/voice-expense", r#"{"transcript": "dinner 900"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_voice_through_http_backend() {
    let server = MockCompletionServer::start_with_reply(DINNER_REPLY).await;
    let ai = AIClient::from_config(ExtractionConfig {
        endpoint_url: server.endpoint_url(),
        credential: Some("sk-test".into()),
        ..Default::default()
    });
    let db = Database::in_memory().unwrap();
    let app = create_router(db.clone(), ai, None, ServerConfig::default());

    let response = app
        .oneshot(post_json("/api/voice-expense", r#"{"transcript": "dinner 900 GPay"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.request_count(), 1);
    assert_eq!(db.count_transactions().unwrap(), 1);
}

// ========== Parse ==========

#[tokio::test]
async fn test_parse_does_not_store() {
    let (app, db) = setup_with_backend(MockBackend::with_reply(DINNER_REPLY));

    let response = app
        .oneshot(post_json("/parse", r#"{"transcript": "dinner"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["parsed_expense"]["amount"], 900.0);
    assert_eq!(json["parsed_expense"]["mode"], "GPay");
    assert_eq!(db.count_transactions().unwrap(), 0);
}

// ========== Export ==========

#[tokio::test]
async fn test_export_csv() {
    let (app, _db) = setup_with_backend(MockBackend::with_reply(DINNER_REPLY));

    let response = app
        .clone()
        .oneshot(post_json("/voice-expense", r#"{"transcript": "dinner"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/transactions/export")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("expenses.csv"));

    let csv = get_body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "date,description,amount,category,mode,split_with");
    assert_eq!(
        lines[1],
        "2025-07-01,Dinner with Rahul and Sneha,900.00,food,GPay,Rahul; Sneha"
    );
}

#[tokio::test]
async fn test_export_empty_is_header_only() {
    let response = setup_test_app()
        .oneshot(get("/transactions/export"))
        .await
        .unwrap();
    let csv = get_body_text(response).await;
    assert_eq!(csv, "date,description,amount,category,mode,split_with\n");
}

// ========== CORS ==========

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let response = setup_test_app()
        .oneshot(
            Request::builder()
                .uri("/api/transactions")
                .header("origin", DEFAULT_ALLOWED_ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        DEFAULT_ALLOWED_ORIGIN
    );
}

#[test]
fn test_app_error_from_core_mapping() {
    use fingenie_core::Error;

    let cases = [
        (Error::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        (
            Error::UpstreamStatus {
                status: 429,
                body: String::new(),
            },
            StatusCode::BAD_GATEWAY,
        ),
        (Error::NoJsonFound { raw: "hi".into() }, StatusCode::BAD_GATEWAY),
        (Error::InvalidTransaction("amount".into()), StatusCode::UNPROCESSABLE_ENTITY),
        (
            Error::InvalidExtraction {
                reason: "amount".into(),
                raw: "{}".into(),
            },
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (
            Error::Database(rusqlite::Error::QueryReturnedNoRows),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (Error::InvalidData("empty".into()), StatusCode::BAD_REQUEST),
        (Error::NotFound("tx 1".into()), StatusCode::NOT_FOUND),
        (
            Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        assert_eq!(AppError::from_core(err).status, status);
    }
}

#[tokio::test]
async fn test_database_error_body() {
    let err = fingenie_core::Error::Database(rusqlite::Error::QueryReturnedNoRows);
    let response = AppError::from_core(err).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Database error");
    assert!(json["raw"].is_null());
}

#[tokio::test]
async fn test_create_transaction_storage_failure() {
    let (app, db) = setup_with_backend(MockBackend::new());
    db.conn()
        .unwrap()
        .execute_batch("DROP TABLE transactions")
        .unwrap();

    let response = app
        .oneshot(post_json(
            "/transactions",
            r#"{"amount": 120, "category": "food", "mode": "Cash", "date": "2025-07-01"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Database error");
    assert!(json["details"].as_str().unwrap().contains("transactions"));
}
