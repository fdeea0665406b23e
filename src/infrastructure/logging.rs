//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding a full filter directive, e.g.
/// `CALLGRAPH_LOG=callgraph_dot=debug`.
pub const LOG_ENV: &str = "CALLGRAPH_LOG";

/// Installs a stderr subscriber so stdout only carries the graph.
///
/// `CALLGRAPH_LOG` wins when set; otherwise `verbosity` (the `-v` count)
/// picks warn, info, debug or trace. Safe to call more than once.
pub fn init_tracing(verbosity: u8) {
    INIT.call_once(|| {
        let level = match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .init();
    });
}
