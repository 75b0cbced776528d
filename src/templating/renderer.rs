//! Manifest rendering with Tera.
//!
//! [`ManifestRenderer`] turns a [`BuildContext`] into the string CSE embeds
//! in the cluster entity:
//!
//! 1. Escape cloud-init instance-data expressions in the embedded templates
//! 2. Parse the cluster template, registered under the cluster name
//! 3. Build [`ClusterTemplateVars`] and execute the template
//! 4. Render every worker pool with [`NodePoolTemplateVars`] and place the
//!    pools ahead of the cluster document
//! 5. Encode the YAML as a JSON string body

use serde::Serialize;
use tera::{Context as TeraContext, Tera};

use super::context::{ClusterTemplateVars, NodePoolTemplateVars};
use super::utils::{encode_json_string, escape_instance_data, format_tera_error};
use crate::builder::BuildContext;
use crate::core::{CseError, Result};
use crate::settings::ClusterSettings;

const CLUSTER_TEMPLATE: &str = include_str!("../../assets/cluster.yaml.tera");
const NODE_POOL_TEMPLATE: &str = include_str!("../../assets/node_pool.yaml.tera");

/// Separator placed after each rendered worker pool.
const DOCUMENT_SEPARATOR: &str = "---";

/// Renders the two-part cluster manifest.
#[derive(Debug, Clone)]
pub struct ManifestRenderer {
    cluster_template: &'static str,
    node_pool_template: &'static str,
}

impl Default for ManifestRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestRenderer {
    /// Renderer over the embedded templates.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cluster_template: CLUSTER_TEMPLATE,
            node_pool_template: NODE_POOL_TEMPLATE,
        }
    }

    #[cfg(test)]
    pub(crate) const fn with_templates(
        cluster_template: &'static str,
        node_pool_template: &'static str,
    ) -> Self {
        Self {
            cluster_template,
            node_pool_template,
        }
    }

    /// Render the manifest and encode it for embedding in a JSON string.
    ///
    /// # Errors
    ///
    /// - [`CseError::TemplateExecutionFailure`] if a template cannot be executed
    /// - [`CseError::EncodingFailure`] if the result cannot be encoded
    ///
    /// # Panics
    ///
    /// Panics if an embedded template does not parse.
    pub fn render(&self, context: &BuildContext, settings: &ClusterSettings) -> Result<String> {
        let yaml = self.render_yaml(context, settings)?;
        let encoded = encode_json_string(&yaml)?;
        tracing::info!(
            "Rendered manifest for cluster '{}' ({} bytes encoded)",
            context.cluster_name(),
            encoded.len()
        );
        Ok(encoded)
    }

    /// Render the manifest as plain multi-document YAML: worker pools first,
    /// then the cluster documents.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::TemplateExecutionFailure`] if a template cannot be
    /// executed.
    ///
    /// # Panics
    ///
    /// Panics if an embedded template does not parse.
    pub fn render_yaml(&self, context: &BuildContext, settings: &ClusterSettings) -> Result<String> {
        let cluster_name = context.cluster_name();

        let mut pools = Vec::with_capacity(settings.worker_pools.len());
        for pool in &settings.worker_pools {
            let vars = NodePoolTemplateVars::new(context, settings, pool)?;
            let rendered = execute(&vars.node_pool_name, self.node_pool_template, &vars)?;
            tracing::debug!("Rendered node pool '{}'", vars.node_pool_name);
            pools.push(format!("{}\n{DOCUMENT_SEPARATOR}", rendered.trim_end()));
        }

        let vars = ClusterTemplateVars::new(context, settings)?;
        let cluster = execute(cluster_name, self.cluster_template, &vars)?;
        tracing::debug!("Rendered cluster template '{}'", cluster_name);

        if pools.is_empty() {
            return Ok(cluster);
        }
        Ok(format!("{}\n{}", pools.join("\n"), cluster))
    }
}

/// Parse `source` under `name` and render it with `vars`.
///
/// # Panics
///
/// Panics if `source` does not parse; templates are compiled into the crate.
pub(crate) fn execute<T: Serialize>(name: &str, source: &str, vars: &T) -> Result<String> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);

    if let Err(e) = tera.add_raw_template(name, &escape_instance_data(source)) {
        panic!("embedded template for '{name}' does not parse: {}", format_tera_error(&e));
    }

    let context = TeraContext::from_serialize(vars).map_err(|e| CseError::TemplateExecutionFailure {
        template: name.to_string(),
        reason: format_tera_error(&e),
    })?;

    tera.render(name, &context).map_err(|e| CseError::TemplateExecutionFailure {
        template: name.to_string(),
        reason: format_tera_error(&e),
    })
}
