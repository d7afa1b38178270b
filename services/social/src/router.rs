use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use amora_core::health::healthz;
use amora_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    friend_request::{
        accept_friend_request, check_request_status, list_received, list_sent,
        reject_friend_request, send_friend_request,
    },
    health::readyz,
    lifecycle::{deactivate_user, delete_user, get_user_status, reactivate_user},
    matching::{create_core_preferences, get_matches, update_core_preferences},
    profile::{get_profile, request_profile_sync, save_profile},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Friend requests
        .route("/friend-requests", post(send_friend_request))
        .route("/friend-requests/received", get(list_received))
        .route("/friend-requests/sent", get(list_sent))
        .route("/friend-requests/{id}/accept", post(accept_friend_request))
        .route("/friend-requests/{id}/reject", post(reject_friend_request))
        .route("/checkReqStatus/{receiver_id}", get(check_request_status))
        // Account lifecycle
        .route("/user", delete(delete_user))
        .route("/user/deactivate", post(deactivate_user))
        .route("/user/reactivate", post(reactivate_user))
        .route("/user/status", get(get_user_status))
        // Profile
        .route("/profile", get(get_profile))
        .route("/user/profile", put(save_profile))
        .route("/user/profile/sync", post(request_profile_sync))
        // Matching
        .route("/user/matches", get(get_matches))
        .route(
            "/user/core-preferences",
            post(create_core_preferences).put(update_core_preferences),
        )
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
