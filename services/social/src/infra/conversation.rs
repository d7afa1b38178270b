use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use amora_auth_types::token::{SERVICE_TOKEN_TTL_SECS, issue_token};

use crate::domain::repository::ConversationPort;
use crate::domain::types::ConversationIntent;
use crate::error::DeliveryError;

/// Header the conversation service deduplicates creates on.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// HTTP client for the conversation/messaging service.
///
/// Requests are authenticated as the first participant with a short-lived token signed
/// with the shared JWT secret.
#[derive(Clone)]
pub struct HttpConversationClient {
    client: reqwest::Client,
    base_url: String,
    jwt_secret: String,
}

#[derive(Serialize)]
struct CreateConversationRequest {
    participant_ids: Vec<String>,
}

#[derive(Deserialize)]
struct CreateConversationResponse {
    conversation_id: Uuid,
}

impl HttpConversationClient {
    pub fn new(
        base_url: &str,
        jwt_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            jwt_secret: jwt_secret.into(),
        })
    }
}

impl ConversationPort for HttpConversationClient {
    async fn create_conversation(
        &self,
        intent: &ConversationIntent,
    ) -> Result<Uuid, DeliveryError> {
        let token = issue_token(intent.user1_id, &self.jwt_secret, SERVICE_TOKEN_TTL_SECS)?;
        let resp = self
            .client
            .post(format!("{}/conversations", self.base_url))
            .bearer_auth(token)
            .header(IDEMPOTENCY_KEY_HEADER, intent.event_id.to_string())
            .json(&CreateConversationRequest {
                participant_ids: vec![intent.user2_id.to_string()],
            })
            .send()
            .await?;

        if resp.status() != StatusCode::CREATED {
            return Err(DeliveryError::UnexpectedStatus(resp.status().as_u16()));
        }
        let body: CreateConversationResponse = resp.json().await?;
        Ok(body.conversation_id)
    }
}
