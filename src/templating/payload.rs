//! CAPVCD cluster entity payload.
//!
//! CSE creates a cluster by storing a `CAPVCDCluster` runtime defined entity.
//! The rendered manifest travels inside it as the string `spec.capiYaml`,
//! next to the API token and the optional default storage class.

use semver::Version;
use serde::Serialize;

use super::renderer::{ManifestRenderer, execute};
use super::utils::encode_json_string;
use crate::builder::BuildContext;
use crate::core::{CseError, Result};
use crate::settings::{ClusterSettings, ReclaimPolicy};

const ENTITY_TEMPLATE: &str = include_str!("../../assets/entity.json.tera");

const CAPVCD_API_GROUP: &str = "capvcd.vmware.com";

/// String fields are pre-encoded JSON string bodies.
#[derive(Debug, Serialize)]
struct EntityVars {
    api_version: String,
    cluster_name: String,
    org: String,
    vdc: String,
    vcd_site: String,
    auto_repair_on_errors: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_storage_class: Option<StorageClassVars>,
    api_token: String,
    capi_yaml: String,
}

#[derive(Debug, Serialize)]
struct StorageClassVars {
    name: String,
    storage_profile: String,
    filesystem: &'static str,
    use_delete_reclaim_policy: bool,
}

/// Render the entity document for a cluster.
///
/// # Errors
///
/// - Any error from [`ManifestRenderer::render`]
/// - [`CseError::EncodingFailure`] if the document is not valid JSON
/// - [`CseError::CollaboratorFailure`] if the entity type ID does not end in a
///   version
pub fn render_entity(
    renderer: &ManifestRenderer,
    context: &BuildContext,
    settings: &ClusterSettings,
) -> Result<String> {
    let capi_yaml = renderer.render(context, settings)?;

    let default_storage_class = match &settings.default_storage_class {
        Some(sc) => Some(StorageClassVars {
            name: encode_json_string(&sc.name)?,
            storage_profile: encode_json_string(
                context.name_cache().get(&sc.storage_profile_id).unwrap_or_default(),
            )?,
            filesystem: sc.filesystem.as_str(),
            use_delete_reclaim_policy: sc.reclaim_policy == ReclaimPolicy::Delete,
        }),
        None => None,
    };

    let vars = EntityVars {
        api_version: api_version(&context.rde_type().id)?,
        cluster_name: encode_json_string(context.cluster_name())?,
        org: encode_json_string(context.org_name())?,
        vdc: encode_json_string(context.vdc_name())?,
        vcd_site: encode_json_string(context.backend_url())?,
        auto_repair_on_errors: settings.auto_repair_on_errors,
        default_storage_class,
        api_token: encode_json_string(context.api_token())?,
        capi_yaml,
    };

    let name = format!("{}-entity", context.cluster_name());
    let document = execute(&name, ENTITY_TEMPLATE, &vars)?;

    serde_json::from_str::<serde_json::Value>(&document).map_err(|e| CseError::EncodingFailure {
        reason: format!("the cluster entity is not valid JSON: {e}"),
    })?;

    tracing::info!("Rendered cluster entity for '{}'", context.cluster_name());
    Ok(document)
}

/// `capvcd.vmware.com/v<major>.<minor>` from an entity type ID ending in a
/// semantic version, e.g. `urn:vcloud:type:vmware:capvcdCluster:1.2.0`.
fn api_version(rde_type_id: &str) -> Result<String> {
    let raw = rde_type_id.rsplit(':').next().unwrap_or_default();
    let version = Version::parse(raw).map_err(|e| CseError::CollaboratorFailure {
        what: "cluster entity type".to_string(),
        id: rde_type_id.to_string(),
        reason: format!("the ID does not end in a version: {e}"),
    })?;
    Ok(format!("{CAPVCD_API_GROUP}/v{}.{}", version.major, version.minor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version() -> Result<()> {
        assert_eq!(
            api_version("urn:vcloud:type:vmware:capvcdCluster:1.2.0")?,
            "capvcd.vmware.com/v1.2"
        );
        Ok(())
    }

    #[test]
    fn test_api_version_rejects_unversioned_entity_type() {
        match api_version("urn:vcloud:type:vmware:capvcdCluster:latest") {
            Err(CseError::CollaboratorFailure {
                what,
                id,
                ..
            }) => {
                assert_eq!(what, "cluster entity type");
                assert_eq!(id, "urn:vcloud:type:vmware:capvcdCluster:latest");
            }
            other => panic!("expected CollaboratorFailure, got {other:?}"),
        }
    }
}
