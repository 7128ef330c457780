//! Log subscriber setup for the command-line tool.

use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber at `level`. `RUST_LOG` directives take
/// precedence. Calling it twice is harmless.
pub fn logging_setup(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .without_time()
        .try_init();
}
