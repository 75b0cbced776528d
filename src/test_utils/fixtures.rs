//! Sample site and cluster definitions shared by unit and integration tests.
//!
//! The TOML documents are the same ones the CLI tests write to disk, so the
//! library and binary are exercised against identical inputs.

use crate::collaborators::Fixture;
use crate::settings::ClusterSettings;

/// Template name with a known compatibility entry.
pub const SAMPLE_TEMPLATE: &str =
    "ubuntu-2004-kube-v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf8";

/// API token served by [`SITE_TOML`].
pub const SAMPLE_TOKEN: &str = "Pkn0dP2C6bJGBD6t5vnYeaThoGk3W2Ua";

/// User the sample session is authenticated as.
pub const SAMPLE_USER: &str = "administrator";

/// A VCD site with one of everything the sample cluster references.
pub const SITE_TOML: &str = r#"
backend_url = "https://vcd.example.com"
current_user = "administrator"
api_token = "Pkn0dP2C6bJGBD6t5vnYeaThoGk3W2Ua"

[organizations]
"urn:vcloud:org:1" = "tenant1"

[vdcs]
"urn:vcloud:vdc:1" = "tenant1-vdc"

[networks]
"urn:vcloud:network:1" = "tenant1-net"

[catalogs]
"urn:vcloud:catalog:1" = "tkgm-catalog"

[templates."urn:vcloud:vapptemplate:1"]
name = "ubuntu-2004-kube-v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf8"
catalog_id = "urn:vcloud:catalog:1"

[templates."urn:vcloud:vapptemplate:2"]
name = "photon-3-kube-v1.27.5+vmware.1-tkg.1-cac282289bb29b217b808a2b9b0c0c46"
catalog_id = "urn:vcloud:catalog:1"

[storage_profiles]
"urn:vcloud:vdcstorageProfile:1" = "*"
"urn:vcloud:vdcstorageProfile:2" = "gold"

[compute_policies]
"urn:vcloud:vdcComputePolicy:1" = "TKG small"
"urn:vcloud:vdcComputePolicy:2" = "TKG medium"
"urn:vcloud:vdcComputePolicy:3" = "gpu-placement"
"urn:vcloud:vdcComputePolicy:4" = "a100-vgpu"

[[backend_config.profiles]]
name = "production"
active = true
containerRegistryUrl = "projects.registry.vmware.com"

[backend_config.profiles.K8Config.mhc]
maxUnhealthyNodes = 100
nodeStartupTimeout = 900
nodeNotReadyTimeout = 300
nodeUnknownTimeout = 200
"#;

/// A three-node control plane with a plain and a vGPU worker pool.
pub const CLUSTER_TOML: &str = r#"
name = "demo"
org_id = "urn:vcloud:org:1"
vdc_id = "urn:vcloud:vdc:1"
network_id = "urn:vcloud:network:1"
kubernetes_template_id = "urn:vcloud:vapptemplate:1"
ssh_public_key = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIE demo@example.com"

[control_plane]
machine_count = 3
disk_size_gi = 40
sizing_policy_id = "urn:vcloud:vdcComputePolicy:1"
storage_profile_id = "urn:vcloud:vdcstorageProfile:1"

[[worker_pools]]
name = "workers"
machine_count = 2
sizing_policy_id = "urn:vcloud:vdcComputePolicy:2"
placement_policy_id = "urn:vcloud:vdcComputePolicy:3"
storage_profile_id = "urn:vcloud:vdcstorageProfile:1"

[[worker_pools]]
name = "gpu"
machine_count = 1
disk_size_gi = 100
sizing_policy_id = "urn:vcloud:vdcComputePolicy:2"
vgpu_policy_id = "urn:vcloud:vdcComputePolicy:4"
storage_profile_id = "urn:vcloud:vdcstorageProfile:2"

[default_storage_class]
name = "default-storage-class"
storage_profile_id = "urn:vcloud:vdcstorageProfile:2"
reclaim_policy = "retain"
filesystem = "xfs"
"#;

/// Parse [`SITE_TOML`].
///
/// # Panics
///
/// Panics if the sample does not parse.
pub fn sample_fixture() -> Fixture {
    toml::from_str(SITE_TOML).unwrap_or_else(|e| panic!("sample site fixture is invalid: {e}"))
}

/// Parse [`CLUSTER_TOML`].
///
/// # Panics
///
/// Panics if the sample does not parse.
pub fn sample_settings() -> ClusterSettings {
    toml::from_str(CLUSTER_TOML).unwrap_or_else(|e| panic!("sample cluster settings are invalid: {e}"))
}
