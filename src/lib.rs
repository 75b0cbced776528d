//! cse-manifest - Cluster manifest synthesis for VCD Container Service Extension
//!
//! Turns a cluster-create request into the Cluster API manifest that CSE
//! embeds in a `CAPVCDCluster` entity. The crate owns the pure part of that
//! work; everything that talks to VCD is a collaborator supplied by the caller.
//!
//! # Architecture Overview
//!
//! Components, leaves first:
//!
//! 1. **Version resolution** ([`version`]): a Kubernetes template OVA name is
//!    mapped to Kubernetes, TKG, TKr, etcd and CoreDNS versions through a
//!    static compatibility table
//! 2. **Name cache** ([`naming`]): storage profile and compute policy IDs are
//!    turned into names, each distinct ID looked up once per build
//! 3. **Cluster definition builder** ([`builder`]): collaborator lookups, the
//!    versions, the names and the backend configuration are gathered into one
//!    immutable [`builder::BuildContext`]
//! 4. **Manifest renderer** ([`templating`]): Tera templates produce the worker
//!    pool and cluster YAML, which is encoded as a JSON string body
//!
//! Everything is synchronous and sequential. The first failure aborts the
//! request with a [`core::CseError`] naming the offending field or ID.
//!
//! # Modules
//!
//! - [`builder`] - Build context assembly and backend configuration decoding
//! - [`cli`] - The `cse-manifest` command-line interface
//! - [`collaborators`] - Traits for external lookups, a file fixture, token sources
//! - [`config`] - User configuration (`~/.cse/config.toml`)
//! - [`constants`] - Markers, limits and defaults
//! - [`core`] - Error types and user-facing error reporting
//! - [`naming`] - Per-build ID-to-name cache
//! - [`settings`] - User-supplied cluster settings and their validation
//! - [`templating`] - Manifest and entity rendering
//! - [`utils`] - File reading helpers
//! - [`version`] - Template name to component version resolution
//!
//! # Example
//!
//! ```rust,no_run
//! use cse_manifest::builder::ClusterDefinitionBuilder;
//! use cse_manifest::collaborators::{Collaborators, Fixture};
//! use cse_manifest::settings::ClusterSettings;
//! use cse_manifest::templating::ManifestRenderer;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let site = Fixture::load(Path::new("site.toml"))?;
//! let settings = ClusterSettings::load(Path::new("cluster.toml"))?;
//!
//! let context = ClusterDefinitionBuilder::new(Collaborators::from_backend(&site)).build(&settings)?;
//! let capi_yaml = ManifestRenderer::new().render(&context, &settings)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Show what a template resolves to
//! cse-manifest versions ubuntu-2004-kube-v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf8
//!
//! # Render the encoded manifest, or the whole cluster entity
//! cse-manifest render --settings cluster.toml --fixture site.toml
//! cse-manifest render --settings cluster.toml --fixture site.toml --payload
//! ```

pub mod builder;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod constants;
pub mod core;
pub mod naming;
pub mod settings;
pub mod templating;
pub mod utils;
pub mod version;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
