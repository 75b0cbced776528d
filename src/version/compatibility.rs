//! TKG compatibility table.
//!
//! Maps the composite version key found in a Kubernetes template OVA name
//! (`v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf8`) to the TKG,
//! etcd and CoreDNS versions that were released with it.
//!
//! The table ships embedded in the binary (`assets/tkg_versions.json`) and is
//! parsed once per process. A replacement file can be installed at startup
//! with [`install`], so new template combinations do not need a rebuild.
//!
//! # File Format
//!
//! ```json
//! {
//!   "v1.26.8+vmware.1-tkg.1-0edd4dafbefbdb503f64d5472e500cf8": {
//!     "tkg": "v2.3.1",
//!     "etcd": "v3.5.6_vmware.20",
//!     "coreDns": "v1.9.3_vmware.16"
//!   }
//! }
//! ```

use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use crate::core::{CseError, Result};

const EMBEDDED_TABLE: &str = include_str!("../../assets/tkg_versions.json");

static ACTIVE_TABLE: OnceLock<CompatibilityTable> = OnceLock::new();

/// Component versions released together with one Kubernetes template OVA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityEntry {
    /// TKG release, e.g. `v2.3.1`
    pub tkg: String,
    /// etcd image tag
    pub etcd: String,
    /// CoreDNS image tag
    pub core_dns: String,
}

/// Immutable lookup table from composite version key to [`CompatibilityEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityTable {
    entries: BTreeMap<String, CompatibilityEntry>,
}

impl CompatibilityTable {
    /// Parse a table from its JSON representation.
    ///
    /// Every key is checked with [`validate_key`] so that the resolver can
    /// rely on the key layout when it derives the Kubernetes and TKr versions.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::CompatibilityTable`] if the JSON is invalid, the
    /// table is empty, or a key does not have the expected shape.
    pub fn from_json(source_name: &str, json: &str) -> Result<Self> {
        let entries: BTreeMap<String, CompatibilityEntry> =
            serde_json::from_str(json).map_err(|e| CseError::CompatibilityTable {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;

        if entries.is_empty() {
            return Err(CseError::CompatibilityTable {
                source_name: source_name.to_string(),
                reason: "the table has no entries".to_string(),
            });
        }

        for key in entries.keys() {
            validate_key(key).map_err(|reason| CseError::CompatibilityTable {
                source_name: source_name.to_string(),
                reason: format!("key '{key}': {reason}"),
            })?;
        }

        tracing::debug!("Loaded {} compatibility entries from {}", entries.len(), source_name);
        Ok(Self {
            entries,
        })
    }

    /// Read and parse a table file.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::CompatibilityTable`] naming the path if the file
    /// cannot be read or is not a valid table.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source_name = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|e| CseError::CompatibilityTable {
            source_name: source_name.clone(),
            reason: e.to_string(),
        })?;
        Self::from_json(&source_name, &json)
    }

    /// The table compiled into the binary.
    ///
    /// # Panics
    ///
    /// Panics if the embedded asset is malformed. The asset is a build input,
    /// so this can only happen on a broken build and is covered by tests.
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_json("embedded tkg_versions.json", EMBEDDED_TABLE)
            .unwrap_or_else(|e| panic!("embedded compatibility table is malformed: {e}"))
    }

    /// Look up a composite key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CompatibilityEntry> {
        self.entries.get(key)
    }

    /// All known composite keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Install the process-wide table. Must happen before the first [`active`] call.
///
/// # Errors
///
/// Returns [`CseError::CompatibilityTable`] if a table is already active.
pub fn install(table: CompatibilityTable) -> Result<()> {
    let count = table.len();
    ACTIVE_TABLE.set(table).map_err(|_| CseError::CompatibilityTable {
        source_name: "configuration".to_string(),
        reason: "a compatibility table is already active for this process".to_string(),
    })?;
    tracing::info!("Using compatibility table with {} entries", count);
    Ok(())
}

/// The process-wide table: the installed one, or the embedded table.
pub fn active() -> &'static CompatibilityTable {
    ACTIVE_TABLE.get_or_init(CompatibilityTable::embedded)
}

/// Check that a composite key has the layout
/// `v<semver with build metadata>-<tkg build>-<hash>`.
///
/// # Errors
///
/// Returns a description of the first problem found.
pub fn validate_key(key: &str) -> std::result::Result<(), String> {
    let segments: Vec<&str> = key.split('-').collect();
    if segments.len() < 3 {
        return Err(format!(
            "expected at least 3 '-' separated segments, found {}",
            segments.len()
        ));
    }
    if let Some(empty) = segments.iter().position(|s| s.is_empty()) {
        return Err(format!("segment {} is empty", empty + 1));
    }

    let kubernetes = segments[0];
    let Some(bare) = kubernetes.strip_prefix('v') else {
        return Err(format!("Kubernetes version '{kubernetes}' must start with 'v'"));
    };
    Version::parse(bare)
        .map_err(|e| format!("Kubernetes version '{kubernetes}' is not a semantic version: {e}"))?;

    Ok(())
}
