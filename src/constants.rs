//! Global constants used throughout cse-manifest.
//!
//! Naming markers, size limits and defaults that more than one module relies
//! on are defined here so the values stay consistent between validation,
//! building and rendering.

/// Marker preceding the composite version key in a Kubernetes template name.
pub const KUBE_MARKER: &str = "kube-";

/// Suffix stripped from template names before the composite key is taken.
pub const OVA_SUFFIX: &str = ".ova";

/// Template names containing this marker are built on Photon OS, which CSE
/// does not support.
pub const UNSUPPORTED_OS_MARKER: &str = "photon";

/// Suffix appended to the cluster name to form its target namespace.
pub const NAMESPACE_SUFFIX: &str = "-ns";

/// Maximum cluster name length accepted by CSE.
pub const MAX_CLUSTER_NAME_LENGTH: usize = 31;

/// Minimum node disk size, in GiB.
pub const MIN_DISK_SIZE_GI: u64 = 20;

/// Default pod CIDR for new clusters.
pub const DEFAULT_POD_CIDR: &str = "100.96.0.0/11";

/// Default service CIDR for new clusters.
pub const DEFAULT_SERVICE_CIDR: &str = "100.64.0.0/13";

/// Vendor of the CAPVCD cluster entity type.
pub const DEFAULT_RDE_VENDOR: &str = "vmware";

/// Namespace-specific string of the CAPVCD cluster entity type.
pub const DEFAULT_RDE_NSS: &str = "capvcdCluster";

/// Version of the CAPVCD cluster entity type.
pub const DEFAULT_RDE_VERSION: &str = "1.2.0";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "CSE_CONFIG_PATH";
