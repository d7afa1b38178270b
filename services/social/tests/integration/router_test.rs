use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, StatusCode, header};
use axum::routing::{get, post};
use axum_test::TestServer;
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::{Value, json};

use amora_social_schema::{friend_requests, profiles, users};

use amora_social::infra::matching::HttpMatchClient;
use amora_social::router::build_router;
use amora_social::state::AppState;
use amora_social::worker::OutboxSignal;
use amora_testing::auth::{MockAuth, TEST_JWT_SECRET};
use amora_testing::http::MockHttpServer;

fn state(db: DatabaseConnection, match_base_url: &str) -> AppState {
    AppState {
        db: Arc::new(db),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        match_client: HttpMatchClient::new(match_base_url, Duration::from_secs(2)).unwrap(),
        outbox_signal: OutboxSignal::new(),
    }
}

fn server(state: AppState) -> TestServer {
    TestServer::new(build_router(state)).unwrap()
}

fn offline() -> TestServer {
    server(state(DatabaseConnection::Disconnected, "http://127.0.0.1:9"))
}

/// Server whose database answers each query with the next batch of `rows`.
fn answering<M: sea_orm::IntoMockRow>(rows: Vec<M>, match_base_url: &str) -> TestServer {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([rows])
        .into_connection();
    server(state(db, match_base_url))
}

fn user_row(id: i64, is_active: bool) -> users::Model {
    users::Model {
        id,
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
        is_active,
        deactivated_at: (!is_active).then(Utc::now),
        created_at: Utc::now(),
    }
}

fn profile_row(user_id: i64) -> profiles::Model {
    profiles::Model {
        user_id,
        bio: "likes hiking".to_owned(),
        gender: "female".to_owned(),
        date_of_birth: None,
        interests: json!(["hiking"]),
        languages: json!(["en"]),
        country_code: "PT".to_owned(),
        city: "Porto".to_owned(),
        match_synced_at: None,
        updated_at: Utc::now(),
    }
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_live_without_database() {
    let response = offline().get("/healthz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let response = offline().get("/readyz").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_report_ready_when_database_answers() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let response = server(state(db, "http://127.0.0.1:9")).get("/readyz").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn should_attach_request_id_to_responses() {
    let response = offline().get("/healthz").await;
    let id = response.header("x-request-id");
    assert!(!id.is_empty());
}

// ── Authentication and errors ────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_missing_bearer_token() {
    let response = offline().get("/friend-requests/received").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_token_signed_with_other_secret() {
    let mut auth = MockAuth::new(1);
    auth.secret = "not-the-service-secret".to_owned();
    let (name, value) = auth.header();

    let response = offline()
        .post("/friend-requests/10/accept")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_refuse_friend_request_to_self() {
    let (name, value) = MockAuth::new(3).header();

    let response = offline()
        .post("/friend-requests")
        .add_header(name, value)
        .json(&json!({ "receiver_id": 3 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "CANNOT_REQUEST_SELF");
}

#[tokio::test]
async fn should_hide_database_failures_behind_internal_error() {
    let (name, value) = MockAuth::new(2).header();

    let response = offline()
        .get("/friend-requests/received")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INTERNAL");
    assert_eq!(body["message"], "internal error");
}

// ── Account lifecycle ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_accept_deactivation_and_wake_worker() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let state = state(db, "http://127.0.0.1:9");
    let signal = state.outbox_signal.clone();
    let (name, value) = MockAuth::new(7).header();

    let response = server(state)
        .post("/user/deactivate")
        .add_header(name, value)
        .json(&json!({ "reason": "  moving abroad " }))
        .await;

    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["event_type"], "deactivated");
    assert!(body["event_id"].as_str().is_some());
    tokio::time::timeout(Duration::from_millis(100), signal.notified())
        .await
        .expect("handler should signal the outbox worker");
}

#[tokio::test]
async fn should_accept_deactivation_with_empty_json_body() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let (name, value) = MockAuth::new(7).header();

    let response = server(state(db, "http://127.0.0.1:9"))
        .post("/user/deactivate")
        .add_header(name, value)
        .add_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .await;

    assert_eq!(response.status_code(), StatusCode::ACCEPTED);
    let body: Value = response.json();
    assert_eq!(body["event_type"], "deactivated");
}

#[tokio::test]
async fn should_reject_malformed_lifecycle_body() {
    let (name, value) = MockAuth::new(7).header();

    let response = offline()
        .post("/user/deactivate")
        .add_header(name, value)
        .text("{reason")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_BODY");
}

#[tokio::test]
async fn should_report_deactivated_account_status() {
    let (name, value) = MockAuth::new(7).header();

    let response = answering(vec![user_row(7, false)], "http://127.0.0.1:9")
        .get("/user/status")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "status": "deactivated" }));
}

#[tokio::test]
async fn should_report_active_account_status() {
    let (name, value) = MockAuth::new(7).header();

    let response = answering(vec![user_row(7, true)], "http://127.0.0.1:9")
        .get("/user/status")
        .add_header(name, value)
        .await;

    assert_eq!(response.json::<Value>(), json!({ "status": "activated" }));
}

#[tokio::test]
async fn should_return_not_found_status_for_deleted_account() {
    let (name, value) = MockAuth::new(7).header();

    let response = answering(Vec::<users::Model>::new(), "http://127.0.0.1:9")
        .get("/user/status")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["kind"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn should_return_not_found_when_deactivating_inactive_account() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let (name, value) = MockAuth::new(7).header();

    let response = server(state(db, "http://127.0.0.1:9"))
        .post("/user/deactivate")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["kind"], "USER_NOT_FOUND");
}

// ── Profiles and requests ────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_caller_profile() {
    let (name, value) = MockAuth::new(5).header();

    let response = answering(vec![profile_row(5)], "http://127.0.0.1:9")
        .get("/profile")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user_id"], 5);
    assert_eq!(body["interests"], json!(["hiking"]));
    assert_eq!(body["match_synced_at"], Value::Null);
}

#[tokio::test]
async fn should_return_not_found_without_profile() {
    let (name, value) = MockAuth::new(5).header();

    let response = answering(Vec::<profiles::Model>::new(), "http://127.0.0.1:9")
        .get("/profile")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["kind"], "PROFILE_NOT_FOUND");
}

#[tokio::test]
async fn should_report_request_already_sent() {
    let (name, value) = MockAuth::new(1).header();
    let row = friend_requests::Model {
        id: 10,
        sender_id: 1,
        receiver_id: 2,
        status: "pending".to_owned(),
        conversation_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let response = answering(vec![row], "http://127.0.0.1:9")
        .get("/checkReqStatus/2")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "requestStatus": true, "status": "pending" })
    );
}

#[tokio::test]
async fn should_report_no_request_sent() {
    let (name, value) = MockAuth::new(1).header();

    let response = answering(Vec::<friend_requests::Model>::new(), "http://127.0.0.1:9")
        .get("/checkReqStatus/2")
        .add_header(name, value)
        .await;

    assert_eq!(
        response.json::<Value>(),
        json!({ "requestStatus": false, "status": null })
    );
}

// ── Matching proxy ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_enrich_matches_with_local_profiles() {
    let matching = MockHttpServer::start(Router::new().route(
        "/matches/{user_id}",
        get(
            |axum::extract::Path(user_id): axum::extract::Path<i64>| async move {
                axum::Json(json!([
                    { "user_id": user_id * 10, "score": 0.8, "reasons": { "city": true } },
                    { "user_id": user_id * 10 + 1, "score": 0.6 }
                ]))
            },
        ),
    ))
    .await;
    let (name, value) = MockAuth::new(4).header();

    let response = answering(vec![profile_row(40)], &matching.base_url())
        .get("/user/matches")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let matches = body.as_array().expect("array body");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["user_id"], 40);
    assert_eq!(matches[0]["score"], 0.8);
    assert_eq!(matches[0]["reasons"], json!({ "city": true }));
    assert_eq!(matches[0]["city"], "Porto");
}

#[tokio::test]
async fn should_map_matching_outage_to_bad_gateway() {
    let matching = MockHttpServer::start(Router::new().route(
        "/matches/{user_id}",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    ))
    .await;
    let (name, value) = MockAuth::new(4).header();

    let response = server(state(DatabaseConnection::Disconnected, &matching.base_url()))
        .get("/user/matches")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["kind"], "UPSTREAM");
}

#[tokio::test]
async fn should_store_core_preferences_for_caller_only() {
    let matching = MockHttpServer::start(Router::new().route(
        "/core-preferences",
        post(|axum::Json(body): axum::Json<Value>| async move { axum::Json(body) }),
    ))
    .await;
    let (name, value) = MockAuth::new(4).header();

    let response = server(state(DatabaseConnection::Disconnected, &matching.base_url()))
        .post("/user/core-preferences")
        .add_header(name, value)
        .json(&json!({ "user_id": 999, "minAge": 30, "maxAge": 40 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["user_id"], 4);
    assert_eq!(body["minAge"], 30);
}
