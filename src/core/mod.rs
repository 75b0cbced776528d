//! Core types for cse-manifest
//!
//! This module holds the error taxonomy shared by every stage of manifest
//! synthesis, plus the conversion used by the CLI to present errors with
//! suggestions.
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use cse_manifest::core::{CseError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(CseError::NotAKubernetesTemplate {
//!         template: "randomOVA".to_string(),
//!     }
//!     .into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.to_string().contains("is not a Kubernetes template OVA"));
//! }
//! ```

pub mod error;

pub use error::{CseError, ErrorContext, user_friendly_error};

/// Result alias used by the library API.
pub type Result<T, E = CseError> = std::result::Result<T, E>;
