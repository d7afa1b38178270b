use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the JSON stdout subscriber. Call once at service startup.
///
/// `RUST_LOG` takes precedence over `default_filter` (e.g. `"info,sqlx=warn"`).
/// Event fields are flattened into the top-level object so `event_id`, `user_id` and
/// friends are directly queryable. Later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false),
        )
        .try_init();
}
