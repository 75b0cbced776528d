//! Kubernetes component version resolution from template OVA names.
//!
//! A Kubernetes template OVA encodes the release it was built from in its
//! name, after the last `kube-` marker:
//!
//! ```text
//! ubuntu-2004-kube-v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf8
//!                  └──────────────── composite key ────────────────────────┘
//! ```
//!
//! [`VersionResolver`] turns that name into a [`VersionBundle`] using the
//! [`compatibility`] table:
//!
//! 1. Names containing `photon` are rejected (unsupported base OS)
//! 2. The last `kube-` marker is located; names without it are rejected
//! 3. A trailing `.ova` is stripped and the composite key extracted
//! 4. The key is looked up in the compatibility table
//! 5. The Kubernetes version is the key up to its first `-`
//! 6. The TKr version is the Kubernetes version with `+` replaced by `---`,
//!    followed by `-` and the key's second segment
//!
//! # Examples
//!
//! ```rust
//! use cse_manifest::version::VersionResolver;
//!
//! let bundle = VersionResolver::default()
//!     .resolve("ubuntu-2004-kube-v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf8")?;
//! assert_eq!(bundle.kubernetes_version, "v1.26.8+vmware.1");
//! assert_eq!(bundle.tkr_version, "v1.26.8---vmware.1-tkg.1");
//! # Ok::<(), cse_manifest::core::CseError>(())
//! ```

pub mod compatibility;

use serde::Serialize;
use strsim::levenshtein;

use crate::constants::{KUBE_MARKER, OVA_SUFFIX, UNSUPPORTED_OS_MARKER};
use crate::core::{CseError, Result};
pub use compatibility::{CompatibilityEntry, CompatibilityTable};

/// Maximum Levenshtein distance, as a percentage of the key length, for a
/// known key to be offered as a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Kubernetes component versions for one template OVA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionBundle {
    pub kubernetes_version: String,
    pub tkg_version: String,
    pub tkr_version: String,
    pub etcd_version: String,
    pub core_dns_version: String,
}

/// Resolves template OVA names against a compatibility table.
#[derive(Debug, Clone, Copy)]
pub struct VersionResolver<'a> {
    table: &'a CompatibilityTable,
}

impl Default for VersionResolver<'static> {
    /// A resolver over the process-wide table.
    fn default() -> Self {
        Self::new(compatibility::active())
    }
}

impl<'a> VersionResolver<'a> {
    #[must_use]
    pub const fn new(table: &'a CompatibilityTable) -> Self {
        Self {
            table,
        }
    }

    /// Resolve a template OVA name into its [`VersionBundle`].
    ///
    /// # Errors
    ///
    /// - [`CseError::UnsupportedBaseOs`] if the name contains `photon`
    /// - [`CseError::NotAKubernetesTemplate`] if the name has no `kube-` marker
    /// - [`CseError::UnsupportedVersionCombination`] if the composite key is
    ///   unknown or does not have the expected segments
    pub fn resolve(&self, template_name: &str) -> Result<VersionBundle> {
        if template_name.contains(UNSUPPORTED_OS_MARKER) {
            return Err(CseError::UnsupportedBaseOs {
                template: template_name.to_string(),
            });
        }

        let key = composite_key(template_name).ok_or_else(|| CseError::NotAKubernetesTemplate {
            template: template_name.to_string(),
        })?;

        let unsupported = || CseError::UnsupportedVersionCombination {
            template: template_name.to_string(),
            key: key.to_string(),
        };

        let entry = self.table.get(key).ok_or_else(unsupported)?;

        let mut segments = key.split('-');
        let kubernetes_version = segments.next().filter(|s| !s.is_empty()).ok_or_else(unsupported)?;
        let tkg_build = segments.next().filter(|s| !s.is_empty()).ok_or_else(unsupported)?;

        let bundle = VersionBundle {
            kubernetes_version: kubernetes_version.to_string(),
            tkg_version: entry.tkg.clone(),
            tkr_version: format!("{}-{}", kubernetes_version.replace('+', "---"), tkg_build),
            etcd_version: entry.etcd.clone(),
            core_dns_version: entry.core_dns.clone(),
        };

        tracing::debug!(
            "Resolved template '{}' to Kubernetes {} (TKG {})",
            template_name,
            bundle.kubernetes_version,
            bundle.tkg_version
        );
        Ok(bundle)
    }
}

/// Extract the composite key: everything after the last `kube-` marker, with
/// a trailing `.ova` removed. `None` when the marker is absent.
fn composite_key(template_name: &str) -> Option<&str> {
    let marker = template_name.rfind(KUBE_MARKER)?;
    let trimmed = template_name.strip_suffix(OVA_SUFFIX).unwrap_or(template_name);
    Some(trimmed.get(marker + KUBE_MARKER.len()..).unwrap_or_default())
}

/// Find the known composite key most similar to `key`, if any is close enough.
#[must_use]
pub fn closest_known_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return None;
    }
    let max_distance = key.len() * SIMILARITY_THRESHOLD_PERCENT / 100;

    compatibility::active()
        .keys()
        .map(|candidate| (levenshtein(key, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.to_string())
}
