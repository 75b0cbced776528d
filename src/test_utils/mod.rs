//! Test utilities for cse-manifest
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration test suite.
//!
//! - [`init_test_logging`] installs a test-writer tracing subscriber once
//! - [`fixtures`] provides a sample VCD site and cluster definition
//!
//! # Example
//!
//! ```rust,no_run
//! use cse_manifest::builder::ClusterDefinitionBuilder;
//! use cse_manifest::collaborators::Collaborators;
//! use cse_manifest::test_utils::{init_test_logging, sample_fixture, sample_settings};
//!
//! init_test_logging(None);
//! let site = sample_fixture();
//! let context = ClusterDefinitionBuilder::new(Collaborators::from_backend(&site))
//!     .build(&sample_settings())
//!     .unwrap();
//! assert_eq!(context.cluster_name(), "demo");
//! ```

pub mod fixtures;

pub use fixtures::{
    CLUSTER_TOML, SAMPLE_TEMPLATE, SAMPLE_TOKEN, SAMPLE_USER, SITE_TOML, sample_fixture,
    sample_settings,
};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` if given, otherwise `RUST_LOG`. With neither, logging stays off.
///
/// ```bash
/// RUST_LOG=cse_manifest=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
