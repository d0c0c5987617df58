use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the global fmt subscriber once. `RUST_LOG` wins over `level`.
pub fn init_logging(level: Level) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

pub fn parse_level(s: &str) -> Result<Level, String> {
    s.trim()
        .parse::<Level>()
        .map_err(|_| format!("Invalid log level: {}. Use trace, debug, info, warn or error", s))
}
