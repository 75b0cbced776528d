//! External collaborators consumed by the cluster definition builder.
//!
//! Manifest synthesis never talks to VCD directly. Everything it needs from
//! the outside world comes through the traits in this module:
//!
//! - [`InfrastructureDirectory`] - organization, VDC, network, template and catalog names
//! - [`ResourceNamer`] - storage profile and compute policy names
//! - [`BackendConfigSource`] - the CSE server configuration entity
//! - [`RdeTypeLookup`] - the versioned CAPVCD cluster entity type
//! - [`Session`] - backend URL and the authenticated user
//! - [`CredentialSource`] - the API token embedded in the cluster
//!
//! All calls are blocking. Implementations report failures with
//! [`anyhow::Error`]; the builder wraps them into [`crate::core::CseError`]
//! variants that name the field being resolved.

pub mod credentials;
pub mod fixture;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use credentials::{ApiTokenFile, StaticToken};
pub use fixture::Fixture;

/// Opaque reference to a runtime defined entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdeTypeRef {
    pub id: String,
}

impl fmt::Display for RdeTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A vApp template and the catalog it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub name: String,
    pub catalog_id: String,
}

/// Resolves infrastructure IDs to display names.
pub trait InfrastructureDirectory {
    fn organization_name(&self, id: &str) -> Result<String>;
    fn vdc_name(&self, id: &str) -> Result<String>;
    fn network_name(&self, id: &str) -> Result<String>;
    fn template(&self, id: &str) -> Result<TemplateRef>;
    fn catalog_name(&self, id: &str) -> Result<String>;
}

/// Resolves storage profile and compute policy IDs to their names.
pub trait ResourceNamer {
    fn storage_profile_name(&self, id: &str) -> Result<String>;
    fn compute_policy_name(&self, id: &str) -> Result<String>;
}

/// Fetches the backend's singleton configuration entity.
///
/// The payload shape is not trusted; the builder decodes and validates it.
pub trait BackendConfigSource {
    fn fetch_singleton_config(&self) -> Result<serde_json::Value>;
}

/// Looks up a runtime defined entity type by vendor, NSS and version.
pub trait RdeTypeLookup {
    fn cluster_type(&self, vendor: &str, nss: &str, version: &str) -> Result<RdeTypeRef>;
}

/// The authenticated session the build runs in.
pub trait Session {
    /// Base URL of the backend, e.g. `https://vcd.example.com`.
    fn backend_url(&self) -> String;
    /// Name of the authenticated user.
    fn current_user(&self) -> Result<String>;
}

/// Supplies the API token the cluster uses to talk back to the backend.
pub trait CredentialSource {
    fn api_token(&self) -> Result<String>;
}

/// The set of collaborators one build uses.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub directory: &'a dyn InfrastructureDirectory,
    pub namer: &'a dyn ResourceNamer,
    pub backend: &'a dyn BackendConfigSource,
    pub rde_types: &'a dyn RdeTypeLookup,
    pub session: &'a dyn Session,
    pub credentials: &'a dyn CredentialSource,
}

impl<'a> Collaborators<'a> {
    /// Use one object for every collaborator role.
    pub fn from_backend<B>(backend: &'a B) -> Self
    where
        B: InfrastructureDirectory
            + ResourceNamer
            + BackendConfigSource
            + RdeTypeLookup
            + Session
            + CredentialSource,
    {
        Self {
            directory: backend,
            namer: backend,
            backend,
            rde_types: backend,
            session: backend,
            credentials: backend,
        }
    }

    /// Replace the credential source, e.g. with an [`ApiTokenFile`].
    #[must_use]
    pub fn with_credentials(mut self, credentials: &'a dyn CredentialSource) -> Self {
        self.credentials = credentials;
        self
    }
}
