//! Testing utilities for the render harness.
//!
//! Provides in-memory stand-ins for the external collaborators (renderer,
//! markup parser, markup comparer) plus test logging setup, so the wait
//! and snapshot machinery can be exercised without a real rendering
//! engine.

pub mod markup;
pub mod stub_renderer;

pub use markup::{SimpleMarkupParser, TreeComparer};
pub use stub_renderer::StubRenderer;

use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Initialize tracing output for tests. Safe to call repeatedly.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .init();
    });
}
