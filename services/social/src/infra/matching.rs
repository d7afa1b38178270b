use std::time::Duration;

use reqwest::{Method, StatusCode};

use crate::domain::repository::{MatchQueryPort, ProfileSyncPort};
use crate::domain::types::{CorePreferences, MatchCandidate, Profile, UpsertMode};
use crate::error::DeliveryError;

/// HTTP client for the matching service.
#[derive(Clone)]
pub struct HttpMatchClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMatchClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn send_core_preferences(
        &self,
        method: Method,
        prefs: &CorePreferences,
    ) -> Result<CorePreferences, DeliveryError> {
        let resp = self
            .client
            .request(method, format!("{}/core-preferences", self.base_url))
            .json(prefs)
            .send()
            .await?;
        if resp.status().is_client_error() || resp.status().is_server_error() {
            return Err(DeliveryError::UnexpectedStatus(resp.status().as_u16()));
        }
        Ok(resp.json().await?)
    }
}

fn upsert_method(mode: UpsertMode) -> Method {
    match mode {
        UpsertMode::Create => Method::POST,
        UpsertMode::Replace => Method::PUT,
    }
}

impl ProfileSyncPort for HttpMatchClient {
    async fn upsert_profile(&self, profile: &Profile, mode: UpsertMode) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .request(upsert_method(mode), format!("{}/profiles", self.base_url))
            .json(&profile.document())
            .send()
            .await?;
        // The echoed representation is not needed; only the status matters.
        if resp.status().is_client_error() || resp.status().is_server_error() {
            return Err(DeliveryError::UnexpectedStatus(resp.status().as_u16()));
        }
        Ok(())
    }
}

impl MatchQueryPort for HttpMatchClient {
    async fn get_matches(
        &self,
        user_id: i64,
        raw_query: Option<&str>,
    ) -> Result<Vec<MatchCandidate>, DeliveryError> {
        let mut url = format!("{}/matches/{user_id}", self.base_url);
        if let Some(query) = raw_query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        let resp = self.client.get(url).send().await?;
        if resp.status() != StatusCode::OK {
            return Err(DeliveryError::UnexpectedStatus(resp.status().as_u16()));
        }
        Ok(resp.json().await?)
    }

    async fn save_core_preferences(
        &self,
        prefs: &CorePreferences,
    ) -> Result<CorePreferences, DeliveryError> {
        self.send_core_preferences(Method::POST, prefs).await
    }

    async fn update_core_preferences(
        &self,
        prefs: &CorePreferences,
    ) -> Result<CorePreferences, DeliveryError> {
        self.send_core_preferences(Method::PUT, prefs).await
    }
}
