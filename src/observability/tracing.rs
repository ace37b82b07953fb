use anyhow::{Error, Result};
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Initializes the tracing subscriber exactly once.
///
/// JSON output is the default (production); `RUST_LOG_FORMAT=pretty` switches to
/// the human-readable formatter. Filtering follows `RUST_LOG`, defaulting to `info`.
///
/// # Errors
/// Fails when another global subscriber was already installed.
pub fn init() -> Result<()> {
    TRACING_INIT.get_or_try_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let use_json = std::env::var("RUST_LOG_FORMAT").map_or(true, |v| v != "pretty");

        if use_json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_current_span(true)
                        .with_target(false),
                )
                .try_init()
                .map_err(|e| Error::msg(e.to_string()))?;
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer())
                .try_init()
                .map_err(|e| Error::msg(e.to_string()))?;
        }

        info!(json = use_json, "tracing initialized");
        Ok::<(), Error>(())
    })?;
    Ok(())
}
