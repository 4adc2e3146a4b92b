use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_DIRECTIVES: &str = "info,planner=debug";

/// Installs an `EnvFilter`-driven stdout subscriber. Library code never
/// calls this implicitly — it's for binaries and tests that want planner
/// logs on screen. Idempotent: subsequent calls are no-ops.
pub fn init_tracing() {
    LOGGER_INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVES))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_timer(UtcTime::rfc_3339()))
            .try_init();
    });
}
