//! User-supplied cluster settings.
//!
//! [`ClusterSettings`] carries everything the caller decides about a new
//! cluster: which infrastructure it uses (as opaque IDs), the control plane
//! and worker pool topology, networking and optional features. It is loaded
//! from a TOML or YAML file by the CLI, or built directly by library callers.
//!
//! # Example
//!
//! ```toml
//! name = "demo"
//! org_id = "urn:vcloud:org:1"
//! vdc_id = "urn:vcloud:vdc:1"
//! network_id = "urn:vcloud:network:1"
//! kubernetes_template_id = "urn:vcloud:vapptemplate:1"
//! node_health_check = true
//!
//! [control_plane]
//! machine_count = 3
//! disk_size_gi = 40
//! storage_profile_id = "urn:vcloud:vdcstorageProfile:1"
//!
//! [[worker_pools]]
//! name = "workers"
//! machine_count = 2
//! sizing_policy_id = "urn:vcloud:vdcComputePolicy:1"
//! ```
//!
//! [`ClusterSettings::validate`] rejects settings CSE would refuse, before any
//! collaborator is called.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use crate::config::NetworkDefaults;
use crate::constants::{MAX_CLUSTER_NAME_LENGTH, MIN_DISK_SIZE_GI};
use crate::core::{CseError, Result};
use crate::utils::read_structured_file;

static DNS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z](?:[a-z0-9-]*[a-z0-9])?$").expect("DNS label pattern is valid")
});

const fn default_machine_count() -> u32 {
    1
}

const fn default_disk_size_gi() -> u64 {
    MIN_DISK_SIZE_GI
}

/// Settings for one cluster-create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSettings {
    /// Cluster name; also the prefix of the target namespace.
    pub name: String,
    pub org_id: String,
    pub vdc_id: String,
    pub network_id: String,
    /// vApp template used for every node.
    pub kubernetes_template_id: String,
    /// Owner of the cluster. Defaults to the authenticated user.
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub ssh_public_key: Option<String>,
    #[serde(default)]
    pub control_plane: ControlPlaneSettings,
    #[serde(default)]
    pub worker_pools: Vec<WorkerPoolSettings>,
    #[serde(default)]
    pub default_storage_class: Option<DefaultStorageClassSettings>,
    #[serde(default)]
    pub pod_cidr: Option<String>,
    #[serde(default)]
    pub service_cidr: Option<String>,
    /// Subnet the load balancer allocates the control plane virtual IP from.
    #[serde(default)]
    pub virtual_ip_subnet: Option<String>,
    #[serde(default)]
    pub auto_repair_on_errors: bool,
    /// Render a MachineHealthCheck using the backend's thresholds.
    #[serde(default)]
    pub node_health_check: bool,
    /// Path to a VCD API token file.
    #[serde(default)]
    pub api_token_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPlaneSettings {
    #[serde(default = "default_machine_count")]
    pub machine_count: u32,
    #[serde(default = "default_disk_size_gi")]
    pub disk_size_gi: u64,
    #[serde(default)]
    pub sizing_policy_id: Option<String>,
    #[serde(default)]
    pub placement_policy_id: Option<String>,
    #[serde(default)]
    pub storage_profile_id: Option<String>,
    /// Fixed control plane endpoint IP.
    #[serde(default)]
    pub ip: Option<String>,
}

impl Default for ControlPlaneSettings {
    fn default() -> Self {
        Self {
            machine_count: default_machine_count(),
            disk_size_gi: default_disk_size_gi(),
            sizing_policy_id: None,
            placement_policy_id: None,
            storage_profile_id: None,
            ip: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPoolSettings {
    pub name: String,
    #[serde(default = "default_machine_count")]
    pub machine_count: u32,
    #[serde(default = "default_disk_size_gi")]
    pub disk_size_gi: u64,
    #[serde(default)]
    pub sizing_policy_id: Option<String>,
    #[serde(default)]
    pub placement_policy_id: Option<String>,
    #[serde(default)]
    pub vgpu_policy_id: Option<String>,
    #[serde(default)]
    pub storage_profile_id: Option<String>,
}

impl WorkerPoolSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            machine_count: default_machine_count(),
            disk_size_gi: default_disk_size_gi(),
            sizing_policy_id: None,
            placement_policy_id: None,
            vgpu_policy_id: None,
            storage_profile_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultStorageClassSettings {
    /// Kubernetes StorageClass name.
    pub name: String,
    pub storage_profile_id: String,
    #[serde(default)]
    pub reclaim_policy: ReclaimPolicy,
    #[serde(default)]
    pub filesystem: Filesystem,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReclaimPolicy {
    #[default]
    Delete,
    Retain,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filesystem {
    #[default]
    Ext4,
    Xfs,
}

impl Filesystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ext4 => "ext4",
            Self::Xfs => "xfs",
        }
    }
}

impl ClusterSettings {
    /// Load settings from a TOML, YAML or JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        read_structured_file(path)
    }

    /// Fill unset CIDRs from the configured defaults.
    pub fn fill_defaults(&mut self, defaults: &NetworkDefaults) {
        if self.pod_cidr.is_none() {
            self.pod_cidr = Some(defaults.pod_cidr.clone());
        }
        if self.service_cidr.is_none() {
            self.service_cidr = Some(defaults.service_cidr.clone());
        }
    }

    /// Check the settings against the rules CSE enforces.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::InvalidSettings`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, reason: String| CseError::InvalidSettings {
            field: field.to_string(),
            reason,
        };

        if self.name.len() > MAX_CLUSTER_NAME_LENGTH || !DNS_LABEL.is_match(&self.name) {
            return Err(invalid(
                "name",
                format!(
                    "'{}' must be a lowercase DNS label of at most {} characters",
                    self.name, MAX_CLUSTER_NAME_LENGTH
                ),
            ));
        }

        for (field, value) in [
            ("org_id", &self.org_id),
            ("vdc_id", &self.vdc_id),
            ("network_id", &self.network_id),
            ("kubernetes_template_id", &self.kubernetes_template_id),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty".to_string()));
            }
        }

        // Spliced into double-quoted YAML scalars in every machine template
        if let Some(key) = &self.ssh_public_key {
            if let Some(bad) = key.chars().find(|c| *c == '"' || *c == '\\' || c.is_control()) {
                return Err(invalid(
                    "ssh_public_key",
                    format!("must be a single-line key without quotes or backslashes, found {bad:?}"),
                ));
            }
        }

        let control_plane = &self.control_plane;
        if control_plane.machine_count == 0 || control_plane.machine_count % 2 == 0 {
            return Err(invalid(
                "control_plane.machine_count",
                format!("must be an odd number, got {}", control_plane.machine_count),
            ));
        }
        if control_plane.disk_size_gi < MIN_DISK_SIZE_GI {
            return Err(invalid(
                "control_plane.disk_size_gi",
                format!("must be at least {MIN_DISK_SIZE_GI}, got {}", control_plane.disk_size_gi),
            ));
        }

        if self.worker_pools.is_empty() {
            return Err(invalid("worker_pools", "at least one worker pool is required".to_string()));
        }

        let mut seen = HashSet::new();
        for (i, pool) in self.worker_pools.iter().enumerate() {
            let field = |name: &str| format!("worker_pools[{i}].{name}");

            if !DNS_LABEL.is_match(&pool.name) {
                return Err(invalid(
                    &field("name"),
                    format!("'{}' must be a lowercase DNS label", pool.name),
                ));
            }
            if !seen.insert(pool.name.as_str()) {
                return Err(invalid(&field("name"), format!("duplicate pool name '{}'", pool.name)));
            }
            if pool.machine_count == 0 {
                return Err(invalid(&field("machine_count"), "must be at least 1".to_string()));
            }
            if pool.disk_size_gi < MIN_DISK_SIZE_GI {
                return Err(invalid(
                    &field("disk_size_gi"),
                    format!("must be at least {MIN_DISK_SIZE_GI}, got {}", pool.disk_size_gi),
                ));
            }
            if pool.placement_policy_id.is_some() && pool.vgpu_policy_id.is_some() {
                return Err(invalid(
                    &field("vgpu_policy_id"),
                    "a pool cannot have both a placement policy and a vGPU policy".to_string(),
                ));
            }
        }

        if let Some(storage_class) = &self.default_storage_class {
            if storage_class.storage_profile_id.trim().is_empty() {
                return Err(invalid(
                    "default_storage_class.storage_profile_id",
                    "must not be empty".to_string(),
                ));
            }
            if !DNS_LABEL.is_match(&storage_class.name) {
                return Err(invalid(
                    "default_storage_class.name",
                    format!("'{}' must be a lowercase DNS label", storage_class.name),
                ));
            }
        }

        Ok(())
    }
}
