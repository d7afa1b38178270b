use amora_domain::friend_request::FriendRequestStatus;
use amora_domain::lifecycle::LifecycleEventType;
use amora_social::domain::types::{MatchCandidate, ProfileInput, UpsertMode};
use amora_social::error::SocialServiceError;
use amora_social::usecase::friend_request::{
    AcceptFriendRequestUseCase, ListFriendRequestsUseCase, RejectFriendRequestUseCase,
    RequestDirection, SendFriendRequestUseCase,
};
use amora_social::usecase::lifecycle::ChangeLifecycleUseCase;
use amora_social::usecase::matching::GetMatchesUseCase;
use amora_social::usecase::profile::{RequestProfileSyncUseCase, SaveProfileUseCase};

use crate::helpers::{InMemoryDb, MockConversations, MockMatching, worker};

// ── Friend requests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_send_then_accept_request_with_one_outbox_row() {
    let db = InMemoryDb::new().with_user(1).with_user(2);

    let request = SendFriendRequestUseCase {
        users: db.clone(),
        requests: db.clone(),
    }
    .execute(1, 2)
    .await
    .unwrap();
    assert_eq!(request.status, FriendRequestStatus::Pending);
    assert!(db.tables.lock().unwrap().conversations.is_empty());

    let intent = AcceptFriendRequestUseCase { requests: db.clone() }
        .execute(request.id, 2)
        .await
        .unwrap();

    assert_eq!(db.request(request.id).status, FriendRequestStatus::Accepted);
    let rows = db.tables.lock().unwrap().conversations.clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].intent, intent);
    assert!(!rows[0].processed);
}

#[tokio::test]
async fn should_abort_acceptance_when_participants_cannot_be_resolved() {
    let db = InMemoryDb::new().with_user(1).with_user(2).with_request(10, 1, 2);
    *db.fail_participant_resolution.lock().unwrap() = true;

    let result = AcceptFriendRequestUseCase { requests: db.clone() }
        .execute(10, 2)
        .await;

    assert!(
        matches!(result, Err(SocialServiceError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
    assert_eq!(db.request(10).status, FriendRequestStatus::Pending);
    assert!(db.tables.lock().unwrap().conversations.is_empty());
}

#[tokio::test]
async fn should_not_accept_request_addressed_to_someone_else() {
    let db = InMemoryDb::new().with_user(1).with_user(2).with_request(10, 1, 2);

    let result = AcceptFriendRequestUseCase { requests: db.clone() }
        .execute(10, 1)
        .await;

    assert!(matches!(result, Err(SocialServiceError::FriendRequestNotFound)));
    assert!(db.tables.lock().unwrap().conversations.is_empty());
}

#[tokio::test]
async fn should_not_accept_request_twice() {
    let db = InMemoryDb::new().with_user(1).with_user(2).with_request(10, 1, 2);
    let usecase = AcceptFriendRequestUseCase { requests: db.clone() };

    usecase.execute(10, 2).await.unwrap();
    let again = usecase.execute(10, 2).await;

    assert!(matches!(again, Err(SocialServiceError::FriendRequestNotFound)));
    assert_eq!(db.tables.lock().unwrap().conversations.len(), 1);
}

#[tokio::test]
async fn should_reject_request_without_enqueueing_conversation() {
    let db = InMemoryDb::new().with_user(1).with_user(2).with_request(10, 1, 2);

    RejectFriendRequestUseCase { requests: db.clone() }
        .execute(10, 2)
        .await
        .unwrap();

    assert_eq!(db.request(10).status, FriendRequestStatus::Rejected);
    assert!(db.tables.lock().unwrap().conversations.is_empty());
}

#[tokio::test]
async fn should_list_received_and_sent_requests() {
    let db = InMemoryDb::new()
        .with_user(1)
        .with_user(2)
        .with_user(3)
        .with_request(10, 1, 2)
        .with_request(11, 3, 2)
        .with_request(12, 2, 3);
    let usecase = ListFriendRequestsUseCase { requests: db.clone() };

    let mut received: Vec<i64> = usecase
        .execute(2, RequestDirection::Received)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    received.sort_unstable();
    let sent: Vec<i64> = usecase
        .execute(2, RequestDirection::Sent)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();

    assert_eq!(received, vec![10, 11]);
    assert_eq!(sent, vec![12]);
}

// ── Account lifecycle ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_not_enqueue_event_when_account_change_fails() {
    let db = InMemoryDb::new().with_user(3);
    let usecase = ChangeLifecycleUseCase { users: db.clone() };

    let reactivate = usecase.execute(3, LifecycleEventType::Reactivated, None).await;
    assert!(matches!(reactivate, Err(SocialServiceError::UserNotFound)));
    assert!(db.lifecycle_rows().is_empty());

    usecase
        .execute(3, LifecycleEventType::Deactivated, None)
        .await
        .unwrap();
    let again = usecase.execute(3, LifecycleEventType::Deactivated, None).await;
    assert!(matches!(again, Err(SocialServiceError::UserNotFound)));
    assert_eq!(db.lifecycle_rows().len(), 1);

    let missing = usecase.execute(99, LifecycleEventType::Deleted, None).await;
    assert!(matches!(missing, Err(SocialServiceError::UserNotFound)));
    assert_eq!(db.lifecycle_rows().len(), 1);
}

#[tokio::test]
async fn should_record_trimmed_reason_in_lifecycle_payload() {
    let db = InMemoryDb::new().with_user(3);

    let intent = ChangeLifecycleUseCase { users: db.clone() }
        .execute(3, LifecycleEventType::Deactivated, Some("  taking a break  "))
        .await
        .unwrap();

    let rows = db.lifecycle_rows();
    assert_eq!(rows[0].intent, intent);
    assert_eq!(rows[0].intent.event_type, LifecycleEventType::Deactivated);
    assert_eq!(
        rows[0].intent.payload,
        serde_json::json!({ "reason": "taking a break" })
    );
    assert!(!db.tables.lock().unwrap().users[&3].is_active);
}

// ── Profiles ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_enqueue_sync_on_every_profile_save() {
    let db = InMemoryDb::new();
    let matching = MockMatching::default();
    let worker = worker(&db, &MockConversations::default(), &matching, None);
    let usecase = SaveProfileUseCase { profiles: db.clone() };
    let input = ProfileInput {
        bio: "runner".to_owned(),
        interests: vec!["running".to_owned()],
        ..ProfileInput::default()
    };

    usecase.execute(4, input.clone()).await.unwrap();
    worker.run_once().await;
    usecase
        .execute(
            4,
            ProfileInput {
                city: "Porto".to_owned(),
                ..input
            },
        )
        .await
        .unwrap();
    worker.run_once().await;

    assert_eq!(db.tables.lock().unwrap().profile_syncs.len(), 2);
    assert_eq!(
        matching.upserts(),
        vec![(4, UpsertMode::Create), (4, UpsertMode::Replace)]
    );
}

#[tokio::test]
async fn should_refuse_resync_without_profile() {
    let db = InMemoryDb::new();

    let result = RequestProfileSyncUseCase { profiles: db.clone() }
        .execute(4)
        .await;

    assert!(matches!(result, Err(SocialServiceError::ProfileNotFound)));
    assert!(db.tables.lock().unwrap().profile_syncs.is_empty());
}

// ── Matches ──────────────────────────────────────────────────────────────────

fn candidate(user_id: i64, score: f64) -> MatchCandidate {
    MatchCandidate {
        user_id,
        score,
        reasons: serde_json::json!({ "interests": ["jazz"] }),
    }
}

#[tokio::test]
async fn should_enrich_matches_and_drop_candidates_without_profile() {
    let db = InMemoryDb::new().with_profile(8, true).with_profile(6, false);
    let matching = MockMatching::default();
    *matching.candidates.lock().unwrap() =
        vec![candidate(8, 0.9), candidate(7, 0.8), candidate(6, 0.5)];

    let matches = GetMatchesUseCase {
        matching: matching.clone(),
        profiles: db.clone(),
    }
    .execute(4, None)
    .await
    .unwrap();

    let ids: Vec<i64> = matches.iter().map(|m| m.profile.user_id).collect();
    assert_eq!(ids, vec![8, 6]);
    assert_eq!(matches[0].score, 0.9);
    assert_eq!(matches[0].reasons, serde_json::json!({ "interests": ["jazz"] }));
    assert_eq!(matches[0].profile.city, "Lisbon");
}

#[tokio::test]
async fn should_return_no_matches_when_no_candidate_has_profile() {
    let matching = MockMatching::default();
    *matching.candidates.lock().unwrap() = vec![candidate(7, 0.8)];

    let matches = GetMatchesUseCase {
        matching,
        profiles: InMemoryDb::new(),
    }
    .execute(4, Some("limit=5"))
    .await
    .unwrap();

    assert!(matches.is_empty());
}
