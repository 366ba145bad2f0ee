//! Tracing subscriber setup for the `tale` binary and test harnesses.
//!
//! The filter comes from `TALE_LOG`, falling back to `RUST_LOG`; with
//! neither set nothing is installed. Setting `TALE_LOG_TREE` switches from
//! flat lines to indented span trees.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. Later calls do nothing.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = match EnvFilter::try_from_env("TALE_LOG") {
            Ok(filter) => filter,
            Err(_) => match EnvFilter::try_from_default_env() {
                Ok(filter) => filter,
                Err(_) => return,
            },
        };

        let tree = std::env::var_os("TALE_LOG_TREE").is_some();
        let hierarchical = tree.then(|| {
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
        });
        let flat = (!tree).then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
        });

        // Another subscriber may already be installed by the host.
        let _ = tracing_subscriber::registry()
            .with(hierarchical)
            .with(flat)
            .with(filter)
            .try_init();
    });
}
