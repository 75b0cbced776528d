//! Decoding of the CSE server configuration entity.
//!
//! The backend stores its configuration as a runtime defined entity whose
//! shape this crate does not control. Only the parts the manifest needs are
//! decoded:
//!
//! ```json
//! {
//!   "profiles": [
//!     {
//!       "K8Config": {
//!         "mhc": {
//!           "maxUnhealthyNodes": 100,
//!           "nodeStartupTimeout": 900,
//!           "nodeNotReadyTimeout": 300,
//!           "nodeUnknownTimeout": 200
//!         }
//!       },
//!       "containerRegistryUrl": "projects.registry.vmware.com"
//!     }
//!   ]
//! }
//! ```
//!
//! Numbers may also arrive as strings (`"900"`, `"900s"`, `"100%"`); older
//! CSE releases wrote them that way.

use serde::Deserialize;

use crate::core::{CseError, Result};

/// Health-check thresholds and registry location from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Percentage of unhealthy nodes tolerated before remediation stops.
    pub max_unhealthy_node_percentage: u8,
    /// Seconds a node may take to join before it is considered unhealthy.
    pub node_startup_timeout: u64,
    /// Seconds a node may report `Ready=False`.
    pub node_not_ready_timeout: u64,
    /// Seconds a node may report `Ready=Unknown`.
    pub node_unknown_timeout: u64,
    /// Registry hosting the TKG images, without scheme.
    pub container_registry_url: String,
}

#[derive(Debug, Deserialize)]
struct ConfigEntity {
    profiles: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(rename = "K8Config")]
    k8s_config: K8sConfig,
    #[serde(rename = "containerRegistryUrl")]
    container_registry_url: String,
}

#[derive(Debug, Deserialize)]
struct K8sConfig {
    mhc: HealthCheckConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HealthCheckConfig {
    max_unhealthy_nodes: Numeric,
    node_startup_timeout: Numeric,
    node_not_ready_timeout: Numeric,
    node_unknown_timeout: Numeric,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn value(&self, field: &str, unit: char) -> Result<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => {
                let trimmed = s.trim();
                let digits = trimmed.strip_suffix(unit).unwrap_or(trimmed);
                digits.parse::<f64>().map_err(|_| malformed(format!("{field} '{s}' is not a number")))?
            }
        };
        if !value.is_finite() || value < 0.0 {
            return Err(malformed(format!("{field} must be a non-negative number, got {value}")));
        }
        Ok(value)
    }

    /// Whole, non-negative value; `what` describes the unit in errors.
    fn whole(&self, field: &str, unit: char, what: &str) -> Result<u64> {
        let value = self.value(field, unit)?;
        if value.fract() != 0.0 {
            return Err(malformed(format!("{field} must be a whole number of {what}, got {value}")));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(value as u64)
    }

    fn seconds(&self, field: &str) -> Result<u64> {
        self.whole(field, 's', "seconds")
    }

    /// Cluster API reads `maxUnhealthy` as an integer percentage.
    fn percentage(&self, field: &str) -> Result<u8> {
        let value = self.whole(field, '%', "percent")?;
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= 100)
            .ok_or_else(|| malformed(format!("{field} must be a percentage, got {value}")))
    }
}

fn malformed(reason: String) -> CseError {
    CseError::MalformedBackendConfig {
        reason,
    }
}

impl BackendConfig {
    /// Decode the configuration entity.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::MalformedBackendConfig`] unless the entity has
    /// exactly one profile carrying complete health-check settings and a
    /// registry URL.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let entity: ConfigEntity =
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;

        let [profile] = <[Profile; 1]>::try_from(entity.profiles).map_err(|profiles| {
            malformed(format!("expected exactly one profile, found {}", profiles.len()))
        })?;

        let mhc = &profile.k8s_config.mhc;
        let max_unhealthy_node_percentage = mhc.max_unhealthy_nodes.percentage("maxUnhealthyNodes")?;

        let container_registry_url = profile.container_registry_url.trim().to_string();
        if container_registry_url.is_empty() {
            return Err(malformed("containerRegistryUrl is empty".to_string()));
        }

        Ok(Self {
            max_unhealthy_node_percentage,
            node_startup_timeout: mhc.node_startup_timeout.seconds("nodeStartupTimeout")?,
            node_not_ready_timeout: mhc.node_not_ready_timeout.seconds("nodeNotReadyTimeout")?,
            node_unknown_timeout: mhc.node_unknown_timeout.seconds("nodeUnknownTimeout")?,
            container_registry_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile() -> serde_json::Value {
        json!({
            "name": "production",
            "active": true,
            "K8Config": {
                "mhc": {
                    "maxUnhealthyNodes": 100,
                    "nodeStartupTimeout": 900,
                    "nodeNotReadyTimeout": 300,
                    "nodeUnknownTimeout": 200
                },
                "certificateAuthorities": []
            },
            "containerRegistryUrl": "projects.registry.vmware.com"
        })
    }

    fn reason(result: Result<BackendConfig>) -> String {
        match result {
            Err(CseError::MalformedBackendConfig {
                reason,
            }) => reason,
            other => panic!("expected MalformedBackendConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_decodes_single_profile() -> Result<()> {
        let config = BackendConfig::from_value(json!({ "profiles": [profile()] }))?;
        assert_eq!(config.max_unhealthy_node_percentage, 100);
        assert_eq!(config.node_startup_timeout, 900);
        assert_eq!(config.node_not_ready_timeout, 300);
        assert_eq!(config.node_unknown_timeout, 200);
        assert_eq!(config.container_registry_url, "projects.registry.vmware.com");
        Ok(())
    }

    #[test]
    fn test_requires_exactly_one_profile() {
        let none = BackendConfig::from_value(json!({ "profiles": [] }));
        assert!(reason(none).contains("found 0"));

        let two = BackendConfig::from_value(json!({ "profiles": [profile(), profile()] }));
        assert!(reason(two).contains("found 2"));

        let missing = BackendConfig::from_value(json!({ "vcdKeInstances": [] }));
        assert!(reason(missing).contains("profiles"));
    }

    #[test]
    fn test_accepts_string_numbers() -> Result<()> {
        let mut p = profile();
        p["K8Config"]["mhc"] = json!({
            "maxUnhealthyNodes": "35%",
            "nodeStartupTimeout": "900s",
            "nodeNotReadyTimeout": "300",
            "nodeUnknownTimeout": 200.0
        });
        let config = BackendConfig::from_value(json!({ "profiles": [p] }))?;
        assert_eq!(config.max_unhealthy_node_percentage, 35);
        assert_eq!(config.node_startup_timeout, 900);
        assert_eq!(config.node_not_ready_timeout, 300);
        assert_eq!(config.node_unknown_timeout, 200);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut p = profile();
        p["K8Config"]["mhc"]["maxUnhealthyNodes"] = json!(150);
        assert!(reason(BackendConfig::from_value(json!({ "profiles": [p] }))).contains("percentage"));

        let mut p = profile();
        p["K8Config"]["mhc"]["nodeStartupTimeout"] = json!(-1);
        assert!(reason(BackendConfig::from_value(json!({ "profiles": [p] }))).contains("non-negative"));

        let mut p = profile();
        p["K8Config"]["mhc"]["nodeUnknownTimeout"] = json!("soon");
        assert!(reason(BackendConfig::from_value(json!({ "profiles": [p] }))).contains("soon"));

        let mut p = profile();
        p["containerRegistryUrl"] = json!(" ");
        assert!(reason(BackendConfig::from_value(json!({ "profiles": [p] }))).contains("containerRegistryUrl"));
    }

    #[test]
    fn test_rejects_fractional_percentage() {
        for value in [json!(33.5), json!("33.5%")] {
            let mut p = profile();
            p["K8Config"]["mhc"]["maxUnhealthyNodes"] = value;
            let reason = reason(BackendConfig::from_value(json!({ "profiles": [p] })));
            assert!(reason.contains("whole number of percent"), "{reason}");
        }
    }
}
