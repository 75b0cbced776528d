//! Substitution data for the manifest templates.
//!
//! The templates see exactly the fields of [`ClusterTemplateVars`] and
//! [`NodePoolTemplateVars`]. Optional sections are driven by `Option` fields
//! that are left out of the serialized context when unset, so the templates'
//! `is defined` checks drop the whole section.

use serde::Serialize;

use super::utils::base64_encode;
use crate::builder::BuildContext;
use crate::constants::{DEFAULT_POD_CIDR, DEFAULT_SERVICE_CIDR, NAMESPACE_SUFFIX};
use crate::core::{CseError, Result};
use crate::settings::{ClusterSettings, WorkerPoolSettings};

/// Variables for the primary cluster template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterTemplateVars {
    pub cluster_name: String,
    pub target_namespace: String,
    pub tkr_version: String,
    pub tkg_version: String,
    pub kubernetes_version: String,
    pub etcd_version: String,
    pub dns_version: String,
    pub pod_cidr: String,
    pub service_cidr: String,
    pub username_b64: String,
    pub api_token_b64: String,
    pub vcd_site: String,
    pub org: String,
    pub ovdc: String,
    pub ovdc_network: String,
    pub catalog: String,
    pub vapp_template: String,
    pub control_plane_sizing_policy: String,
    pub control_plane_placement_policy: String,
    pub control_plane_storage_profile: String,
    pub control_plane_disk_size: String,
    pub control_plane_machine_count: String,
    pub container_registry_url: String,
    pub ssh_public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_plane_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_ip_subnet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_unhealthy_node_percentage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_startup_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_not_ready_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_unknown_timeout: Option<String>,
}

/// Variables for one worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodePoolTemplateVars {
    pub node_pool_name: String,
    pub cluster_name: String,
    pub target_namespace: String,
    pub catalog: String,
    pub vapp_template: String,
    pub sizing_policy: String,
    pub placement_policy: String,
    pub storage_profile: String,
    pub disk_size: String,
    pub enable_nvidia_gpu: bool,
    pub machine_count: String,
    pub ssh_public_key: String,
    pub kubernetes_version: String,
}

/// Namespace the cluster's CAPI objects live in.
pub fn target_namespace(cluster_name: &str) -> String {
    format!("{cluster_name}{NAMESPACE_SUFFIX}")
}

fn disk_size(gi: u64) -> String {
    format!("{gi}Gi")
}

fn seconds(value: u64) -> String {
    format!("{value}s")
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

/// Name the build resolved for an optional ID.
fn resolved_name(context: &BuildContext, id: Option<&String>) -> Result<String> {
    context
        .name_cache()
        .name_of(id.map(String::as_str))
        .map(str::to_string)
        .ok_or_else(|| CseError::TemplateExecutionFailure {
            template: context.cluster_name().to_string(),
            reason: format!(
                "no name was resolved for ID '{}'",
                id.map(String::as_str).unwrap_or_default()
            ),
        })
}

impl ClusterTemplateVars {
    /// Assemble the variables from a build context and the settings it was
    /// built from.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::TemplateExecutionFailure`] if a referenced storage
    /// profile or policy ID was not resolved during the build.
    pub fn new(context: &BuildContext, settings: &ClusterSettings) -> Result<Self> {
        let versions = context.versions();
        let backend = context.backend_config();
        let control_plane = &settings.control_plane;
        let health_check = settings.node_health_check;

        Ok(Self {
            cluster_name: context.cluster_name().to_string(),
            target_namespace: target_namespace(context.cluster_name()),
            tkr_version: versions.tkr_version.clone(),
            tkg_version: versions.tkg_version.clone(),
            kubernetes_version: versions.kubernetes_version.clone(),
            etcd_version: versions.etcd_version.clone(),
            dns_version: versions.core_dns_version.clone(),
            pod_cidr: settings.pod_cidr.clone().unwrap_or_else(|| DEFAULT_POD_CIDR.to_string()),
            service_cidr: settings
                .service_cidr
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVICE_CIDR.to_string()),
            username_b64: base64_encode(context.owner()),
            api_token_b64: base64_encode(context.api_token()),
            vcd_site: context.backend_url().to_string(),
            org: context.org_name().to_string(),
            ovdc: context.vdc_name().to_string(),
            ovdc_network: context.network_name().to_string(),
            catalog: context.catalog_name().to_string(),
            vapp_template: context.template_name().to_string(),
            control_plane_sizing_policy: resolved_name(context, control_plane.sizing_policy_id.as_ref())?,
            control_plane_placement_policy: resolved_name(
                context,
                control_plane.placement_policy_id.as_ref(),
            )?,
            control_plane_storage_profile: resolved_name(
                context,
                control_plane.storage_profile_id.as_ref(),
            )?,
            control_plane_disk_size: disk_size(control_plane.disk_size_gi),
            control_plane_machine_count: control_plane.machine_count.to_string(),
            container_registry_url: backend.container_registry_url.clone(),
            ssh_public_key: settings.ssh_public_key.clone().unwrap_or_default(),
            control_plane_endpoint: non_empty(control_plane.ip.as_ref()),
            virtual_ip_subnet: non_empty(settings.virtual_ip_subnet.as_ref()),
            max_unhealthy_node_percentage: health_check
                .then(|| format!("{}%", backend.max_unhealthy_node_percentage)),
            node_startup_timeout: health_check.then(|| seconds(backend.node_startup_timeout)),
            node_not_ready_timeout: health_check.then(|| seconds(backend.node_not_ready_timeout)),
            node_unknown_timeout: health_check.then(|| seconds(backend.node_unknown_timeout)),
        })
    }
}

impl NodePoolTemplateVars {
    /// Variables for `pool`. A vGPU policy, when set, takes the place of the
    /// placement policy.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::TemplateExecutionFailure`] if a referenced ID was
    /// not resolved during the build.
    pub fn new(
        context: &BuildContext,
        settings: &ClusterSettings,
        pool: &WorkerPoolSettings,
    ) -> Result<Self> {
        let placement_id = pool.vgpu_policy_id.as_ref().or(pool.placement_policy_id.as_ref());

        Ok(Self {
            node_pool_name: format!("{}-{}", context.cluster_name(), pool.name),
            cluster_name: context.cluster_name().to_string(),
            target_namespace: target_namespace(context.cluster_name()),
            catalog: context.catalog_name().to_string(),
            vapp_template: context.template_name().to_string(),
            sizing_policy: resolved_name(context, pool.sizing_policy_id.as_ref())?,
            placement_policy: resolved_name(context, placement_id)?,
            storage_profile: resolved_name(context, pool.storage_profile_id.as_ref())?,
            disk_size: disk_size(pool.disk_size_gi),
            enable_nvidia_gpu: pool.vgpu_policy_id.is_some(),
            machine_count: pool.machine_count.to_string(),
            ssh_public_key: settings.ssh_public_key.clone().unwrap_or_default(),
            kubernetes_version: context.versions().kubernetes_version.clone(),
        })
    }
}
