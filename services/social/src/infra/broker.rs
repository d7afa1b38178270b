use std::time::Duration;

use chrono::{DateTime, Utc};
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use amora_domain::lifecycle::LifecycleEventType;

use crate::domain::repository::LifecyclePublisher;
use crate::domain::types::LifecycleIntent;
use crate::error::DeliveryError;

/// AMQP delivery mode for messages that survive a broker restart.
const PERSISTENT: u8 = 2;

/// Broker message body for a lifecycle event.
#[derive(Debug, Serialize)]
pub struct LifecycleMessage<'a> {
    pub event_id: Uuid,
    pub user_id: i64,
    pub event_type: LifecycleEventType,
    pub payload: &'a serde_json::Value,
    #[serde(serialize_with = "amora_core::serde::to_rfc3339_ms")]
    pub occurred_at: DateTime<Utc>,
}

impl<'a> From<&'a LifecycleIntent> for LifecycleMessage<'a> {
    fn from(intent: &'a LifecycleIntent) -> Self {
        Self {
            event_id: intent.event_id,
            user_id: intent.user_id,
            event_type: intent.event_type,
            payload: &intent.payload,
            occurred_at: intent.created_at,
        }
    }
}

struct Session {
    // Held so the connection outlives the channel.
    _connection: Connection,
    channel: Channel,
}

/// Publishes lifecycle events to a durable topic exchange with publisher confirms.
///
/// Connects on first use. A session that errors or times out is dropped and the next
/// publish reconnects.
pub struct AmqpLifecyclePublisher {
    url: String,
    exchange: String,
    timeout: Duration,
    session: Mutex<Option<Session>>,
}

impl AmqpLifecyclePublisher {
    pub fn new(url: impl Into<String>, exchange: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            exchange: exchange.into(),
            timeout,
            session: Mutex::new(None),
        }
    }

    async fn connect(&self) -> Result<Session, DeliveryError> {
        let connection = Connection::connect(&self.url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;
        channel
            .exchange_declare(
                &self.exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        tracing::info!(exchange = %self.exchange, "connected to message broker");
        Ok(Session {
            _connection: connection,
            channel,
        })
    }

    async fn publish_confirmed(&self, routing_key: &str, body: &[u8]) -> Result<(), DeliveryError> {
        let mut guard = self.session.lock().await;
        let session = match guard.take() {
            Some(session) if session.channel.status().connected() => session,
            _ => self.connect().await?,
        };

        let confirmation = session
            .channel
            .basic_publish(
                &self.exchange,
                routing_key,
                BasicPublishOptions::default(),
                body,
                BasicProperties::default()
                    .with_content_type("application/json".into())
                    .with_delivery_mode(PERSISTENT),
            )
            .await?
            .await?;

        // Only a healthy session goes back; transport errors above drop it.
        *guard = Some(session);
        if confirmation.is_nack() {
            return Err(DeliveryError::Rejected);
        }
        Ok(())
    }
}

impl LifecyclePublisher for AmqpLifecyclePublisher {
    async fn publish(&self, intent: &LifecycleIntent) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(&LifecycleMessage::from(intent))?;
        let routing_key = intent.event_type.routing_key();
        tokio::time::timeout(self.timeout, self.publish_confirmed(&routing_key, &body))
            .await
            .map_err(|_| DeliveryError::Timeout)?
    }
}
