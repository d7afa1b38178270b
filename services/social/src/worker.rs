//! Background delivery of outbox rows.
//!
//! One task owns every delivery client. Each pass walks the three outbox tables in turn,
//! oldest rows first, and never lets a failing row or kind stop the others. Rows that
//! fail stay pending and are retried on a later pass; downstream calls are idempotent on
//! `event_id`, so a row delivered twice has a single effect.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Notify, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::SocialConfig;
use crate::domain::repository::{
    ConversationPort, LifecyclePublisher, OutboxStore, ProfileSyncPort,
};
use crate::domain::types::{ConversationIntent, LifecycleIntent, OutboxKind, ProfileSyncIntent};

/// Wakes the worker ahead of its next tick. Handlers call [`OutboxSignal::notify`] after
/// committing an outbox row; the interval remains the fallback.
#[derive(Clone, Default)]
pub struct OutboxSignal(Arc<Notify>);

impl OutboxSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        self.0.notify_one();
    }

    pub async fn notified(&self) {
        self.0.notified().await;
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    pub conversation_batch: u64,
    pub profile_batch: u64,
    pub lifecycle_batch: u64,
    /// `None` retries forever.
    pub max_attempts: Option<i32>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            conversation_batch: 10,
            profile_batch: 10,
            lifecycle_batch: 25,
            max_attempts: None,
        }
    }
}

impl From<&SocialConfig> for WorkerConfig {
    fn from(config: &SocialConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            conversation_batch: config.outbox_conversation_batch,
            profile_batch: config.outbox_profile_batch,
            lifecycle_batch: config.outbox_lifecycle_batch,
            max_attempts: config.outbox_max_attempts,
        }
    }
}

/// Outcome counts for one kind in one pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub delivered: usize,
    /// Marked processed without a downstream call.
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub conversations: PassReport,
    pub profile_syncs: PassReport,
    pub lifecycle: PassReport,
}

enum Delivered {
    Sent,
    Skipped,
}

pub struct OutboxWorker<S, C, M, B> {
    pub store: S,
    pub conversations: C,
    pub matching: M,
    /// Lifecycle rows stay pending while no broker is configured.
    pub lifecycle: Option<B>,
    pub config: WorkerConfig,
    pub signal: OutboxSignal,
}

impl<S, C, M, B> OutboxWorker<S, C, M, B>
where
    S: OutboxStore,
    C: ConversationPort,
    M: ProfileSyncPort,
    B: LifecyclePublisher,
{
    /// Run passes until `shutdown` flips to `true` or its sender is dropped. A pass in
    /// progress always completes first.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            lifecycle_enabled = self.lifecycle.is_some(),
            "outbox worker started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.signal.notified() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let report = self.run_once().await;
            debug!(?report, "outbox pass finished");
        }
        info!("outbox worker stopped");
    }

    /// One full pass over all three kinds.
    pub async fn run_once(&self) -> TickReport {
        TickReport {
            conversations: self.process_conversations().await,
            profile_syncs: self.process_profile_syncs().await,
            lifecycle: self.process_lifecycle_events().await,
        }
    }

    pub async fn process_conversations(&self) -> PassReport {
        let mut report = PassReport::default();
        let batch = match self
            .store
            .fetch_pending_conversations(self.config.conversation_batch, self.config.max_attempts)
            .await
        {
            Ok(batch) => batch,
            Err(e) => {
                warn!(kind = "conversation", error = %e, "fetch pending outbox rows failed");
                return report;
            }
        };

        for intent in batch {
            match self.deliver_conversation(&intent).await {
                Ok(_) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    self.record_failure(OutboxKind::Conversation, intent.event_id, intent.attempts, e)
                        .await;
                }
            }
        }
        report
    }

    async fn deliver_conversation(&self, intent: &ConversationIntent) -> anyhow::Result<Delivered> {
        let conversation_id = self.conversations.create_conversation(intent).await?;
        self.store
            .complete_conversation(intent, conversation_id)
            .await?;
        debug!(
            event_id = %intent.event_id,
            %conversation_id,
            user1_id = intent.user1_id,
            user2_id = intent.user2_id,
            "conversation created"
        );
        Ok(Delivered::Sent)
    }

    pub async fn process_profile_syncs(&self) -> PassReport {
        let mut report = PassReport::default();
        let batch = match self
            .store
            .fetch_pending_profile_syncs(self.config.profile_batch, self.config.max_attempts)
            .await
        {
            Ok(batch) => batch,
            Err(e) => {
                warn!(kind = "profile_sync", error = %e, "fetch pending outbox rows failed");
                return report;
            }
        };

        for intent in batch {
            match self.deliver_profile_sync(&intent).await {
                Ok(Delivered::Sent) => report.delivered += 1,
                Ok(Delivered::Skipped) => report.skipped += 1,
                Err(e) => {
                    report.failed += 1;
                    self.record_failure(OutboxKind::ProfileSync, intent.event_id, intent.attempts, e)
                        .await;
                }
            }
        }
        report
    }

    async fn deliver_profile_sync(&self, intent: &ProfileSyncIntent) -> anyhow::Result<Delivered> {
        let Some(profile) = self.store.load_profile(intent.user_id).await? else {
            self.store.discard_profile_sync(intent.event_id).await?;
            info!(
                event_id = %intent.event_id,
                user_id = intent.user_id,
                "profile no longer exists, sync discarded"
            );
            return Ok(Delivered::Skipped);
        };

        let mode = profile.upsert_mode();
        self.matching.upsert_profile(&profile, mode).await?;
        self.store.complete_profile_sync(intent, Utc::now()).await?;
        debug!(event_id = %intent.event_id, user_id = intent.user_id, ?mode, "profile synced");
        Ok(Delivered::Sent)
    }

    pub async fn process_lifecycle_events(&self) -> PassReport {
        let mut report = PassReport::default();
        let Some(publisher) = &self.lifecycle else {
            return report;
        };
        let batch = match self
            .store
            .fetch_pending_lifecycle(self.config.lifecycle_batch, self.config.max_attempts)
            .await
        {
            Ok(batch) => batch,
            Err(e) => {
                warn!(kind = "lifecycle", error = %e, "fetch pending outbox rows failed");
                return report;
            }
        };

        for intent in batch {
            match self.deliver_lifecycle(publisher, &intent).await {
                Ok(_) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    self.record_failure(OutboxKind::Lifecycle, intent.event_id, intent.attempts, e)
                        .await;
                }
            }
        }
        report
    }

    async fn deliver_lifecycle(
        &self,
        publisher: &B,
        intent: &LifecycleIntent,
    ) -> anyhow::Result<Delivered> {
        publisher.publish(intent).await?;
        self.store
            .complete_lifecycle(intent.event_id, Utc::now())
            .await?;
        debug!(
            event_id = %intent.event_id,
            user_id = intent.user_id,
            event_type = %intent.event_type,
            "lifecycle event published"
        );
        Ok(Delivered::Sent)
    }

    async fn record_failure(
        &self,
        kind: OutboxKind,
        event_id: Uuid,
        previous_attempts: i32,
        error: anyhow::Error,
    ) {
        let message = format!("{error:#}");
        let attempts = previous_attempts.saturating_add(1);
        warn!(
            kind = kind.as_str(),
            %event_id,
            attempts,
            error = %message,
            "outbox delivery failed"
        );
        if let Err(e) = self.store.record_failure(kind, event_id, &message).await {
            warn!(kind = kind.as_str(), %event_id, error = %e, "recording delivery failure failed");
        }
        if self.config.max_attempts.is_some_and(|max| attempts >= max) {
            error!(
                kind = kind.as_str(),
                %event_id,
                attempts,
                last_error = %message,
                "outbox row reached max attempts and will not be retried"
            );
        }
    }
}
