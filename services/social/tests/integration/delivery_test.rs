use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, RawQuery};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use uuid::Uuid;

use amora_auth_types::token::validate_access_token;
use amora_social::domain::repository::{ConversationPort, MatchQueryPort, ProfileSyncPort};
use amora_social::domain::types::{ConversationIntent, CorePreferences, UpsertMode};
use amora_social::error::DeliveryError;
use amora_social::infra::conversation::HttpConversationClient;
use amora_social::infra::matching::HttpMatchClient;
use amora_testing::auth::TEST_JWT_SECRET;
use amora_testing::http::MockHttpServer;

use crate::helpers::test_profile;

const TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    headers: HeaderMap,
    query: Option<String>,
    body: Value,
}

type Seen = Arc<Mutex<Vec<Captured>>>;

/// Route that records every request and answers with `status` and `reply`.
fn recording(seen: Seen, status: StatusCode, reply: Value) -> axum::routing::MethodRouter {
    any(
        move |method: Method, headers: HeaderMap, RawQuery(query): RawQuery, body: String| {
            let seen = seen.clone();
            let reply = reply.clone();
            async move {
                seen.lock().unwrap().push(Captured {
                    method,
                    headers,
                    query,
                    body: serde_json::from_str(&body).unwrap_or(Value::Null),
                });
                (status, Json(reply))
            }
        },
    )
}

// ── Conversation service ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_conversation_with_idempotency_key_and_user1_token() {
    let seen = Seen::default();
    let conversation_id = Uuid::new_v4();
    let server = MockHttpServer::start(Router::new().route(
        "/conversations",
        recording(
            seen.clone(),
            StatusCode::CREATED,
            json!({ "conversation_id": conversation_id }),
        ),
    ))
    .await;
    let client = HttpConversationClient::new(&server.base_url(), TEST_JWT_SECRET, TIMEOUT).unwrap();
    let intent = ConversationIntent::new(Uuid::new_v4(), 1, 2);

    let created = client.create_conversation(&intent).await.unwrap();

    assert_eq!(created, conversation_id);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let req = &seen[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(
        req.headers["idempotency-key"].to_str().unwrap(),
        intent.event_id.to_string()
    );
    let bearer = req.headers["authorization"].to_str().unwrap();
    let token = bearer.strip_prefix("Bearer ").expect("bearer scheme");
    let info = validate_access_token(token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, 1);
    assert_eq!(req.body, json!({ "participant_ids": ["2"] }));
}

#[tokio::test]
async fn should_send_same_idempotency_key_on_redelivery() {
    let seen = Seen::default();
    let server = MockHttpServer::start(Router::new().route(
        "/conversations",
        recording(
            seen.clone(),
            StatusCode::CREATED,
            json!({ "conversation_id": Uuid::new_v4() }),
        ),
    ))
    .await;
    let client = HttpConversationClient::new(&server.base_url(), TEST_JWT_SECRET, TIMEOUT).unwrap();
    let intent = ConversationIntent::new(Uuid::new_v4(), 1, 2);

    client.create_conversation(&intent).await.unwrap();
    client.create_conversation(&intent).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0].headers["idempotency-key"],
        seen[1].headers["idempotency-key"]
    );
}

#[tokio::test]
async fn should_treat_non_created_status_as_failure() {
    let server = MockHttpServer::start(Router::new().route(
        "/conversations",
        recording(
            Seen::default(),
            StatusCode::OK,
            json!({ "conversation_id": Uuid::new_v4() }),
        ),
    ))
    .await;
    let client = HttpConversationClient::new(&server.base_url(), TEST_JWT_SECRET, TIMEOUT).unwrap();

    let result = client
        .create_conversation(&ConversationIntent::new(Uuid::new_v4(), 1, 2))
        .await;

    assert!(
        matches!(result, Err(DeliveryError::UnexpectedStatus(200))),
        "expected UnexpectedStatus(200), got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_created_response_without_conversation_id() {
    let server = MockHttpServer::start(Router::new().route(
        "/conversations",
        recording(Seen::default(), StatusCode::CREATED, json!({ "id": 5 })),
    ))
    .await;
    let client = HttpConversationClient::new(&server.base_url(), TEST_JWT_SECRET, TIMEOUT).unwrap();

    let result = client
        .create_conversation(&ConversationIntent::new(Uuid::new_v4(), 1, 2))
        .await;

    assert!(matches!(result, Err(DeliveryError::Decode(_))), "got {result:?}");
}

#[tokio::test]
async fn should_time_out_slow_conversation_service() {
    let server = MockHttpServer::start(Router::new().route(
        "/conversations",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::CREATED
        }),
    ))
    .await;
    let client = HttpConversationClient::new(
        &server.base_url(),
        TEST_JWT_SECRET,
        Duration::from_millis(200),
    )
    .unwrap();

    let result = client
        .create_conversation(&ConversationIntent::new(Uuid::new_v4(), 1, 2))
        .await;

    assert!(matches!(result, Err(DeliveryError::Timeout)), "got {result:?}");
}

#[tokio::test]
async fn should_fail_when_conversation_service_is_unreachable() {
    let client = HttpConversationClient::new("http://127.0.0.1:1", TEST_JWT_SECRET, TIMEOUT).unwrap();

    let result = client
        .create_conversation(&ConversationIntent::new(Uuid::new_v4(), 1, 2))
        .await;

    let Err(DeliveryError::Transport(source)) = result else {
        panic!("expected Transport, got {result:?}");
    };
    let source_text = source.to_string();
    let rendered = format!("{:#}", anyhow::Error::from(DeliveryError::Transport(source)));
    assert_eq!(rendered.matches(source_text.as_str()).count(), 1, "{rendered}");
    assert!(rendered.starts_with("request failed: "), "{rendered}");
}

// ── Matching service: profile sync ───────────────────────────────────────────

#[tokio::test]
async fn should_post_new_profile_and_put_synced_one() {
    let seen = Seen::default();
    let server = MockHttpServer::start(Router::new().route(
        "/profiles",
        recording(seen.clone(), StatusCode::OK, json!({ "user_id": 5 })),
    ))
    .await;
    let client = HttpMatchClient::new(&server.base_url(), TIMEOUT).unwrap();
    let profile = test_profile(5, false);

    client.upsert_profile(&profile, UpsertMode::Create).await.unwrap();
    client.upsert_profile(&profile, UpsertMode::Replace).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[1].method, Method::PUT);
    assert_eq!(seen[0].body["user_id"], 5);
    assert_eq!(seen[0].body["interests"], json!(["hiking", "jazz"]));
    assert_eq!(seen[0].body["country_code"], "PT");
    assert!(seen[0].body.get("match_synced_at").is_none());
}

#[tokio::test]
async fn should_fail_profile_sync_on_error_status() {
    let server = MockHttpServer::start(Router::new().route(
        "/profiles",
        recording(
            Seen::default(),
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "detail": "invalid" }),
        ),
    ))
    .await;
    let client = HttpMatchClient::new(&server.base_url(), TIMEOUT).unwrap();

    let result = client
        .upsert_profile(&test_profile(5, true), UpsertMode::Replace)
        .await;

    assert!(matches!(result, Err(DeliveryError::UnexpectedStatus(422))));
}

// ── Matching service: queries ────────────────────────────────────────────────

#[tokio::test]
async fn should_forward_query_string_to_matches() {
    let seen = Seen::default();
    let server = MockHttpServer::start(Router::new().route(
        "/matches/{user_id}",
        recording(
            seen.clone(),
            StatusCode::OK,
            json!([{ "user_id": 8, "score": 0.92, "reasons": { "interests": 2 } }]),
        ),
    ))
    .await;
    let client = HttpMatchClient::new(&server.base_url(), TIMEOUT).unwrap();

    let matches = client.get_matches(4, Some("limit=5&min_score=0.5")).await.unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].user_id, 8);
    assert_eq!(
        seen.lock().unwrap()[0].query.as_deref(),
        Some("limit=5&min_score=0.5")
    );
}

#[tokio::test]
async fn should_request_matches_for_caller_path() {
    let server = MockHttpServer::start(Router::new().route(
        "/matches/{user_id}",
        get(|Path(user_id): Path<i64>| async move {
            Json(json!([{ "user_id": user_id + 1, "score": 1.0 }]))
        }),
    ))
    .await;
    let client = HttpMatchClient::new(&server.base_url(), TIMEOUT).unwrap();

    let matches = client.get_matches(41, None).await.unwrap();

    assert_eq!(matches[0].user_id, 42);
    assert_eq!(matches[0].reasons, Value::Null);
}

#[tokio::test]
async fn should_send_core_preferences_with_method_per_mode() {
    let seen = Seen::default();
    let server = MockHttpServer::start(Router::new().route(
        "/core-preferences",
        recording(
            seen.clone(),
            StatusCode::OK,
            json!({ "user_id": 4, "minAge": 25, "maxAge": 35 }),
        ),
    ))
    .await;
    let client = HttpMatchClient::new(&server.base_url(), TIMEOUT).unwrap();
    let prefs = CorePreferences {
        user_id: 4,
        min_age: 25,
        max_age: 35,
        ..CorePreferences::default()
    };

    let saved = client.save_core_preferences(&prefs).await.unwrap();
    client.update_core_preferences(&prefs).await.unwrap();

    assert_eq!(saved.min_age, 25);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[1].method, Method::PUT);
    assert_eq!(seen[0].body["minAge"], 25);
}
