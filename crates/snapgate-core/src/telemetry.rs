//! Tracing initialisation for snapgate binaries and test harnesses.
//!
//! Call [`init_tracing`] once at program start. Without `RUST_LOG`, only the
//! snapgate crates log at the requested level; everything else (the PNG
//! codec included) is held at `warn`. Later calls are ignored.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log targets of the library and the `snapgate` binary.
const SNAPGATE_TARGETS: &[&str] = &["snapgate_core", "snapgate"];

/// Filter directives used when `RUST_LOG` is unset, e.g.
/// `warn,snapgate_core=debug,snapgate=debug`.
pub fn default_directives(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        SNAPGATE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.join(",")
}

/// Initialise the global tracing subscriber.
///
/// `json` switches to newline-delimited JSON lines that carry the current
/// `snapgate.assert` span. Event targets are printed from `DEBUG` up, where
/// they tell comparator, store and orchestrator events apart.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let show_targets = level >= Level::DEBUG;

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(show_targets),
            )
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(show_targets))
            .try_init()
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_scope_level_to_snapgate() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "warn,snapgate_core=debug,snapgate=debug"
        );
        assert_eq!(
            default_directives(Level::INFO),
            "warn,snapgate_core=info,snapgate=info"
        );
    }

    #[test]
    fn default_directives_parse() {
        for level in [Level::ERROR, Level::INFO, Level::TRACE] {
            assert!(EnvFilter::try_new(default_directives(level)).is_ok());
        }
    }
}
