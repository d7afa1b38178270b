use std::sync::Arc;

use sea_orm::Database;
use tokio::sync::watch;
use tracing::{info, warn};

use amora_core::config::Config as _;
use amora_core::tracing::init_tracing;

use amora_social::config::SocialConfig;
use amora_social::infra::broker::AmqpLifecyclePublisher;
use amora_social::infra::conversation::HttpConversationClient;
use amora_social::infra::db::DbOutboxStore;
use amora_social::infra::matching::HttpMatchClient;
use amora_social::router::build_router;
use amora_social::state::AppState;
use amora_social::worker::{OutboxSignal, OutboxWorker, WorkerConfig};

#[tokio::main]
async fn main() {
    init_tracing("info,sqlx=warn");

    let config = SocialConfig::from_env();

    let db = Arc::new(
        Database::connect(&config.database_url)
            .await
            .expect("failed to connect to database"),
    );

    let match_client =
        HttpMatchClient::new(&config.match_service_url, config.match_service_timeout())
            .expect("failed to build matching service client");
    // The worker gets its own clients; handlers never share its connection pools.
    let profile_sync_client =
        HttpMatchClient::new(&config.match_service_url, config.match_service_timeout())
            .expect("failed to build matching service client");
    let conversation_client = HttpConversationClient::new(
        &config.messaging_service_url,
        config.jwt_secret.clone(),
        config.delivery_timeout(),
    )
    .expect("failed to build conversation service client");
    let lifecycle_publisher = config.rabbitmq_url.as_deref().map(|url| {
        AmqpLifecyclePublisher::new(
            url,
            config.lifecycle_exchange.clone(),
            config.delivery_timeout(),
        )
    });
    if lifecycle_publisher.is_none() {
        warn!("RABBITMQ_URL not set, lifecycle events will stay pending");
    }

    // Outbox worker
    let outbox_signal = OutboxSignal::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = OutboxWorker {
        store: DbOutboxStore { db: db.clone() },
        conversations: conversation_client,
        matching: profile_sync_client,
        lifecycle: lifecycle_publisher,
        config: WorkerConfig::from(&config),
        signal: outbox_signal.clone(),
    };
    let worker_handle = tokio::spawn(worker.run(shutdown_rx));

    // HTTP server
    let state = AppState {
        db,
        jwt_secret: config.jwt_secret.clone(),
        match_client,
        outbox_signal,
    };
    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.social_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("social service listening on {http_addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_requested())
        .await
        .expect("server error");

    let _ = shutdown_tx.send(true);
    if let Err(e) = worker_handle.await {
        warn!(error = %e, "outbox worker task ended abnormally");
    }
    info!("social service stopped");
}

async fn shutdown_requested() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown requested");
}
