//! User configuration for cse-manifest.
//!
//! The configuration file is optional. When present it lives at:
//! - Unix/macOS: `~/.cse/config.toml`
//! - Windows: `%LOCALAPPDATA%\cse\config.toml`
//!
//! The location can be overridden with the `CSE_CONFIG_PATH` environment
//! variable or the CLI's `--config` flag.
//!
//! ```toml
//! # Replacement for the embedded compatibility table
//! compatibility_table = "~/.cse/tkg_versions.json"
//!
//! # CAPVCD cluster entity type used for new clusters
//! [rde]
//! vendor = "vmware"
//! nss = "capvcdCluster"
//! version = "1.2.0"
//!
//! # Networking defaults for settings that leave them unset
//! [defaults]
//! pod_cidr = "100.96.0.0/11"
//! service_cidr = "100.64.0.0/13"
//! ```
//!
//! Every key is optional; a missing file is the same as an empty one.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_POD_CIDR, DEFAULT_RDE_NSS, DEFAULT_RDE_VENDOR, DEFAULT_RDE_VERSION,
    DEFAULT_SERVICE_CIDR,
};
use crate::core::{CseError, Result};
use crate::utils::expand_path;
use crate::version::{CompatibilityTable, compatibility};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CseConfig {
    /// Path to a compatibility table replacing the embedded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_table: Option<String>,
    pub rde: RdeTypeSpec,
    pub defaults: NetworkDefaults,
}

/// Identity of the CAPVCD cluster entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdeTypeSpec {
    pub vendor: String,
    pub nss: String,
    pub version: String,
}

impl Default for RdeTypeSpec {
    fn default() -> Self {
        Self {
            vendor: DEFAULT_RDE_VENDOR.to_string(),
            nss: DEFAULT_RDE_NSS.to_string(),
            version: DEFAULT_RDE_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkDefaults {
    pub pod_cidr: String,
    pub service_cidr: String,
}

impl Default for NetworkDefaults {
    fn default() -> Self {
        Self {
            pod_cidr: DEFAULT_POD_CIDR.to_string(),
            service_cidr: DEFAULT_SERVICE_CIDR.to_string(),
        }
    }
}

impl CseConfig {
    /// Load from `path` if given, otherwise from [`Self::default_path`].
    ///
    /// A file that does not exist yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::ConfigError`] if the file exists but cannot be
    /// read or parsed.
    pub fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::ConfigError`] naming the path on read or parse failure.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CseError::ConfigError {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| CseError::ConfigError {
            message: format!("failed to parse {}: {e}", path.display()),
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Configuration file location, honouring `CSE_CONFIG_PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::ConfigError`] if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        Self::path_from_env(std::env::var_os(CONFIG_PATH_ENV))
    }

    fn path_from_env(value: Option<OsString>) -> Result<PathBuf> {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(value));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| CseError::ConfigError {
                    message: "unable to determine local data directory".to_string(),
                })?
                .join("cse")
        } else {
            dirs::home_dir()
                .ok_or_else(|| CseError::ConfigError {
                    message: "unable to determine home directory".to_string(),
                })?
                .join(".cse")
        };
        Ok(config_dir.join("config.toml"))
    }

    /// Load the configured replacement compatibility table, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::ConfigError`] for an unexpandable path and
    /// [`CseError::CompatibilityTable`] for an unreadable or invalid table.
    pub fn load_compatibility_table(&self) -> Result<Option<CompatibilityTable>> {
        let Some(raw) = &self.compatibility_table else {
            return Ok(None);
        };
        let path = expand_path(raw).map_err(|e| CseError::ConfigError {
            message: format!("compatibility_table: {e:#}"),
        })?;
        CompatibilityTable::from_file(&path).map(Some)
    }

    /// Make the configured table the process-wide one. Without a configured
    /// table the embedded table stays active.
    ///
    /// # Errors
    ///
    /// See [`Self::load_compatibility_table`] and [`compatibility::install`].
    pub fn install_compatibility_table(&self) -> Result<()> {
        match self.load_compatibility_table()? {
            Some(table) => compatibility::install(table),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = CseConfig::default();
        assert_eq!(config.rde.vendor, "vmware");
        assert_eq!(config.rde.nss, "capvcdCluster");
        assert_eq!(config.defaults.pod_cidr, DEFAULT_POD_CIDR);
        assert!(config.compatibility_table.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rde]\nversion = \"1.3.0\"\n")?;

        let config = CseConfig::load_from(&path)?;
        assert_eq!(config.rde.version, "1.3.0");
        assert_eq!(config.rde.vendor, "vmware");
        assert_eq!(config.defaults, NetworkDefaults::default());
        Ok(())
    }

    #[test]
    fn test_parse_error_names_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rde\n")?;

        let err = CseConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, CseError::ConfigError { .. }));
        assert!(err.to_string().contains("config.toml"));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_default() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = CseConfig::load_with_optional(Some(dir.path().join("absent.toml")))?;
        assert_eq!(config, CseConfig::default());
        Ok(())
    }

    #[test]
    fn test_path_from_env() -> Result<()> {
        let path = CseConfig::path_from_env(Some(OsString::from("/etc/cse/config.toml")))?;
        assert_eq!(path, PathBuf::from("/etc/cse/config.toml"));

        if dirs::home_dir().is_some() {
            let path = CseConfig::path_from_env(Some(OsString::new()))?;
            assert!(path.ends_with("config.toml"));
        }
        Ok(())
    }

    #[test]
    #[serial]
    fn test_default_path_honours_env() -> Result<()> {
        let previous = std::env::var_os(CONFIG_PATH_ENV);
        // SAFETY: serialised with other tests touching the environment
        unsafe { std::env::set_var(CONFIG_PATH_ENV, "/tmp/cse-test/config.toml") };
        let path = CseConfig::default_path();
        match previous {
            Some(value) => unsafe { std::env::set_var(CONFIG_PATH_ENV, value) },
            None => unsafe { std::env::remove_var(CONFIG_PATH_ENV) },
        }
        assert_eq!(path?, PathBuf::from("/tmp/cse-test/config.toml"));
        Ok(())
    }

    #[test]
    fn test_load_replacement_table() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let table = dir.path().join("table.json");
        std::fs::write(
            &table,
            r#"{"v1.28.4+vmware.1-tkg.1-abc": {"tkg": "v2.5.0", "etcd": "v3.5.10", "coreDns": "v1.10.1"}}"#,
        )?;

        let config = CseConfig {
            compatibility_table: Some(table.display().to_string()),
            ..CseConfig::default()
        };
        let loaded = config.load_compatibility_table()?.expect("table configured");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("v1.28.4+vmware.1-tkg.1-abc").map(|e| e.tkg.as_str()), Some("v2.5.0"));
        Ok(())
    }

    #[test]
    fn test_missing_table_file_is_an_error() {
        let config = CseConfig {
            compatibility_table: Some("/no/such/table.json".to_string()),
            ..CseConfig::default()
        };
        assert!(matches!(
            config.load_compatibility_table(),
            Err(CseError::CompatibilityTable { .. })
        ));
    }
}
