//! Aggregation of everything a cluster manifest needs into one [`BuildContext`].
//!
//! [`ClusterDefinitionBuilder::build`] runs the collaborator lookups for one
//! cluster-create request, strictly in order:
//!
//! 1. Validate the settings
//! 2. Resolve organization, VDC, network, template and catalog names
//! 3. Resolve Kubernetes component versions from the template name
//! 4. Look up the CAPVCD cluster entity type
//! 5. Populate the [`NameCache`] with storage profile and policy names
//! 6. Fetch and decode the backend configuration
//! 7. Determine the owner (explicit, or the session's user)
//! 8. Resolve the API token
//!
//! The first failure aborts the build; there are no retries and no partial
//! context. The resulting [`BuildContext`] is immutable and lives only until
//! the manifest has been rendered.

pub mod backend_config;

use std::fmt;

pub use backend_config::BackendConfig;

use crate::collaborators::{Collaborators, RdeTypeRef};
use crate::config::RdeTypeSpec;
use crate::core::{CseError, Result};
use crate::naming::NameCache;
use crate::settings::ClusterSettings;
use crate::version::{VersionBundle, VersionResolver};

/// Resolved inputs for rendering one cluster.
pub struct BuildContext {
    pub(crate) cluster_name: String,
    pub(crate) backend_url: String,
    pub(crate) org_name: String,
    pub(crate) vdc_name: String,
    pub(crate) network_name: String,
    pub(crate) template_name: String,
    pub(crate) catalog_name: String,
    pub(crate) rde_type: RdeTypeRef,
    pub(crate) name_cache: NameCache,
    pub(crate) backend_config: BackendConfig,
    pub(crate) versions: VersionBundle,
    pub(crate) owner: String,
    pub(crate) api_token: String,
}

impl BuildContext {
    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub fn org_name(&self) -> &str {
        &self.org_name
    }

    pub fn vdc_name(&self) -> &str {
        &self.vdc_name
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn catalog_name(&self) -> &str {
        &self.catalog_name
    }

    pub fn rde_type(&self) -> &RdeTypeRef {
        &self.rde_type
    }

    pub fn name_cache(&self) -> &NameCache {
        &self.name_cache
    }

    pub fn backend_config(&self) -> &BackendConfig {
        &self.backend_config
    }

    pub fn versions(&self) -> &VersionBundle {
        &self.versions
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The API token. Never log this.
    pub fn api_token(&self) -> &str {
        &self.api_token
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("cluster_name", &self.cluster_name)
            .field("backend_url", &self.backend_url)
            .field("org_name", &self.org_name)
            .field("vdc_name", &self.vdc_name)
            .field("network_name", &self.network_name)
            .field("template_name", &self.template_name)
            .field("catalog_name", &self.catalog_name)
            .field("rde_type", &self.rde_type)
            .field("name_cache", &self.name_cache)
            .field("backend_config", &self.backend_config)
            .field("versions", &self.versions)
            .field("owner", &self.owner)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Builds a [`BuildContext`] from settings and collaborators.
pub struct ClusterDefinitionBuilder<'a> {
    collaborators: Collaborators<'a>,
    resolver: VersionResolver<'a>,
    rde: RdeTypeSpec,
}

impl<'a> ClusterDefinitionBuilder<'a> {
    /// Builder using the process-wide compatibility table and the default
    /// CAPVCD entity type.
    pub fn new(collaborators: Collaborators<'a>) -> Self {
        Self {
            collaborators,
            resolver: VersionResolver::default(),
            rde: RdeTypeSpec::default(),
        }
    }

    #[must_use]
    pub fn with_version_resolver(mut self, resolver: VersionResolver<'a>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_rde_type(mut self, rde: RdeTypeSpec) -> Self {
        self.rde = rde;
        self
    }

    /// Run every lookup for `settings` and assemble the context.
    ///
    /// # Errors
    ///
    /// - [`CseError::InvalidSettings`] before any collaborator is called
    /// - [`CseError::CollaboratorFailure`] for directory and entity type lookups
    /// - Version resolution errors, unchanged
    /// - [`CseError::ExternalLookupFailure`] from the name cache
    /// - [`CseError::MalformedBackendConfig`] for an unusable configuration entity
    /// - [`CseError::CredentialFailure`] for the owner or API token
    pub fn build(&self, settings: &ClusterSettings) -> Result<BuildContext> {
        settings.validate()?;
        let c = &self.collaborators;

        tracing::debug!("Resolving infrastructure names for cluster '{}'", settings.name);
        let org_name = lookup("organization", &settings.org_id, |id| c.directory.organization_name(id))?;
        let vdc_name = lookup("VDC", &settings.vdc_id, |id| c.directory.vdc_name(id))?;
        let network_name = lookup("network", &settings.network_id, |id| c.directory.network_name(id))?;
        let template = lookup("Kubernetes template", &settings.kubernetes_template_id, |id| {
            c.directory.template(id)
        })?;
        let catalog_name = lookup("catalog", &template.catalog_id, |id| c.directory.catalog_name(id))?;

        let versions = self.resolver.resolve(&template.name)?;

        let rde_key = format!("{}:{}:{}", self.rde.vendor, self.rde.nss, self.rde.version);
        let rde_type = lookup("cluster entity type", &rde_key, |_| {
            c.rde_types.cluster_type(&self.rde.vendor, &self.rde.nss, &self.rde.version)
        })?;

        let mut name_cache = NameCache::new();
        name_cache.populate(settings, c.namer)?;

        tracing::debug!("Fetching backend configuration");
        let raw_config = c.backend.fetch_singleton_config().map_err(|e| CseError::CollaboratorFailure {
            what: "backend configuration".to_string(),
            id: "singleton".to_string(),
            reason: format!("{e:#}"),
        })?;
        let backend_config = BackendConfig::from_value(raw_config)?;

        let owner = match settings.owner.as_deref().filter(|o| !o.is_empty()) {
            Some(owner) => owner.to_string(),
            None => c.session.current_user().map_err(|e| CseError::CredentialFailure {
                reason: format!("could not determine the session user: {e:#}"),
            })?,
        };

        let api_token = c.credentials.api_token().map_err(|e| CseError::CredentialFailure {
            reason: format!("{e:#}"),
        })?;
        if api_token.is_empty() {
            return Err(CseError::CredentialFailure {
                reason: "the API token is empty".to_string(),
            });
        }

        let context = BuildContext {
            cluster_name: settings.name.clone(),
            backend_url: c.session.backend_url(),
            org_name,
            vdc_name,
            network_name,
            template_name: template.name,
            catalog_name,
            rde_type,
            name_cache,
            backend_config,
            versions,
            owner,
            api_token,
        };

        tracing::info!(
            "Build context ready for cluster '{}' (Kubernetes {}, owner {})",
            context.cluster_name,
            context.versions.kubernetes_version,
            context.owner
        );
        Ok(context)
    }
}

fn lookup<T, F>(what: &str, id: &str, call: F) -> Result<T>
where
    F: FnOnce(&str) -> anyhow::Result<T>,
{
    tracing::debug!("Looking up {} '{}'", what, id);
    call(id).map_err(|e| CseError::CollaboratorFailure {
        what: what.to_string(),
        id: id.to_string(),
        reason: format!("{e:#}"),
    })
}
