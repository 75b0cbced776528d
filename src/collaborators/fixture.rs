//! Offline collaborator backed by a static description of a VCD site.
//!
//! A fixture answers every collaborator call from in-memory tables, which
//! makes it possible to render manifests without a live backend (the CLI's
//! `render --fixture` mode) and to drive the builder in tests.
//!
//! # File Format
//!
//! ```toml
//! backend_url = "https://vcd.example.com"
//! current_user = "administrator"
//!
//! [organizations]
//! "urn:vcloud:org:1" = "tenant1"
//!
//! [templates."urn:vcloud:vapptemplate:1"]
//! name = "ubuntu-2004-kube-v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf8"
//! catalog_id = "urn:vcloud:catalog:1"
//!
//! [backend_config.profiles.K8Config.mhc]
//! maxUnhealthyNodes = 100
//! ```
//!
//! Missing IDs produce errors, just as a real backend would.

use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::{
    BackendConfigSource, CredentialSource, InfrastructureDirectory, RdeTypeLookup, RdeTypeRef,
    ResourceNamer, Session, TemplateRef,
};
use crate::utils::read_structured_file;

/// Static description of a VCD site, answering every collaborator call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub backend_url: String,
    pub current_user: Option<String>,
    pub api_token: Option<String>,
    pub organizations: BTreeMap<String, String>,
    pub vdcs: BTreeMap<String, String>,
    pub networks: BTreeMap<String, String>,
    pub catalogs: BTreeMap<String, String>,
    pub templates: BTreeMap<String, TemplateRef>,
    pub storage_profiles: BTreeMap<String, String>,
    pub compute_policies: BTreeMap<String, String>,
    /// `vendor:nss:version` to entity type ID. When empty, IDs are derived
    /// with the standard `urn:vcloud:type:` prefix.
    pub rde_types: BTreeMap<String, String>,
    pub backend_config: Option<serde_json::Value>,
}

impl Fixture {
    /// Load a fixture from a TOML, YAML or JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let fixture: Self = read_structured_file(path)?;
        tracing::debug!(
            "Loaded fixture from {} ({} templates, {} storage profiles, {} compute policies)",
            path.display(),
            fixture.templates.len(),
            fixture.storage_profiles.len(),
            fixture.compute_policies.len()
        );
        Ok(fixture)
    }

    fn lookup(table: &BTreeMap<String, String>, what: &str, id: &str) -> Result<String> {
        table.get(id).cloned().ok_or_else(|| anyhow!("{what} '{id}' not found"))
    }
}

impl InfrastructureDirectory for Fixture {
    fn organization_name(&self, id: &str) -> Result<String> {
        Self::lookup(&self.organizations, "organization", id)
    }

    fn vdc_name(&self, id: &str) -> Result<String> {
        Self::lookup(&self.vdcs, "VDC", id)
    }

    fn network_name(&self, id: &str) -> Result<String> {
        Self::lookup(&self.networks, "network", id)
    }

    fn template(&self, id: &str) -> Result<TemplateRef> {
        self.templates.get(id).cloned().ok_or_else(|| anyhow!("vApp template '{id}' not found"))
    }

    fn catalog_name(&self, id: &str) -> Result<String> {
        Self::lookup(&self.catalogs, "catalog", id)
    }
}

impl ResourceNamer for Fixture {
    fn storage_profile_name(&self, id: &str) -> Result<String> {
        Self::lookup(&self.storage_profiles, "storage profile", id)
    }

    fn compute_policy_name(&self, id: &str) -> Result<String> {
        Self::lookup(&self.compute_policies, "compute policy", id)
    }
}

impl BackendConfigSource for Fixture {
    fn fetch_singleton_config(&self) -> Result<serde_json::Value> {
        self.backend_config
            .clone()
            .ok_or_else(|| anyhow!("the CSE server configuration entity does not exist"))
    }
}

impl RdeTypeLookup for Fixture {
    fn cluster_type(&self, vendor: &str, nss: &str, version: &str) -> Result<RdeTypeRef> {
        let key = format!("{vendor}:{nss}:{version}");
        if self.rde_types.is_empty() {
            return Ok(RdeTypeRef {
                id: format!("urn:vcloud:type:{key}"),
            });
        }
        let id = Self::lookup(&self.rde_types, "entity type", &key)?;
        Ok(RdeTypeRef {
            id,
        })
    }
}

impl Session for Fixture {
    fn backend_url(&self) -> String {
        self.backend_url.clone()
    }

    fn current_user(&self) -> Result<String> {
        self.current_user.clone().ok_or_else(|| anyhow!("the session has no authenticated user"))
    }
}

impl CredentialSource for Fixture {
    fn api_token(&self) -> Result<String> {
        self.api_token.clone().ok_or_else(|| anyhow!("the fixture does not define an api_token"))
    }
}
