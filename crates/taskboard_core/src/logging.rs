//! Opt-in diagnostic logging.
//!
//! Nothing is emitted unless `TASKBOARD_DEBUG` is set. Its value is used as
//! an `EnvFilter` directive; `1` or an empty value selects the default.

use tracing_subscriber::EnvFilter;

pub const DEBUG_ENV_VAR: &str = "TASKBOARD_DEBUG";
const DEFAULT_DIRECTIVE: &str = "taskboard_core=debug,taskboard_cli=debug";

/// Installs a stderr `fmt` subscriber when debugging is requested. Returns
/// whether a subscriber was installed by this call.
pub fn init_logging() -> bool {
    let Ok(raw) = std::env::var(DEBUG_ENV_VAR) else {
        return false;
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive_for(&raw)))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

fn directive_for(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "1" {
        DEFAULT_DIRECTIVE
    } else {
        trimmed
    }
}
