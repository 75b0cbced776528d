//! Integration test suite for cse-manifest
//!
//! End-to-end tests that run the library against the sample site and the
//! `cse-manifest` binary against the same inputs written to a temporary
//! directory.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **build**: Build context assembly and rendering through the public API
//! - **render**: The `render` command and its output modes
//! - **versions**: The `versions` command and the configurable compatibility table

mod build;
mod common;
mod render;
mod versions;
