//! Integration test infrastructure for respcache.
//!
//! This crate provides testcontainers-based infrastructure for running
//! the storage backends against a real Redis server, plus a conformance
//! suite that any `CacheInteractor` must pass.
//!
//! # Usage
//!
//! ```ignore
//! use respcache_tests::TestContext;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let ctx = TestContext::redis().await.unwrap();
//!     // Use ctx.cache, ctx.raw_connection(), etc.
//! }
//! ```

pub mod containers;
pub mod context;
pub mod fixtures;
pub mod helpers;

pub use context::TestContext;
pub use fixtures::*;
pub use helpers::*;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,respcache_store=debug")),
        )
        .with_test_writer()
        .try_init();
}
