//! Tera-based rendering of the CSE cluster manifest.
//!
//! The manifest is two groups of YAML documents rendered from templates
//! compiled into the crate:
//!
//! - **Worker pools** (`assets/node_pool.yaml.tera`): a `VCDMachineTemplate`,
//!   `KubeadmConfigTemplate` and `MachineDeployment` per pool
//! - **Cluster** (`assets/cluster.yaml.tera`): `Cluster`, the
//!   `capi-user-credentials` Secret, `VCDCluster`, the control plane
//!   `VCDMachineTemplate` and `KubeadmControlPlane`, plus a
//!   `MachineHealthCheck` when node health checks are on
//!
//! Pools come first, each closed by `---`, followed by the cluster documents.
//!
//! # Template Variables
//!
//! Templates only see the fields of [`ClusterTemplateVars`] and
//! [`NodePoolTemplateVars`]. Values are pre-formatted: disk sizes as `20Gi`,
//! timeouts as `900s`, the unhealthy threshold as `100%`, and the owner and
//! API token base64-encoded for the Secret.
//!
//! # Instance Data
//!
//! The kubeadm node registration uses cloud-init expressions such as
//! `{{ ds.meta_data.hostname }}`. They share Tera's delimiters, so they are
//! wrapped in `{% raw %}` before parsing and reach the node unchanged.
//!
//! # Output Encoding
//!
//! [`ManifestRenderer::render`] returns the YAML encoded as the body of a
//! JSON string: quotes, backslashes and control characters are escaped,
//! `<`, `>` and `&` are not. [`payload::render_entity`] embeds that string in
//! the `CAPVCDCluster` entity.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cse_manifest::builder::ClusterDefinitionBuilder;
//! use cse_manifest::collaborators::{Collaborators, Fixture};
//! use cse_manifest::settings::ClusterSettings;
//! use cse_manifest::templating::ManifestRenderer;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let fixture = Fixture::load(Path::new("site.toml"))?;
//! let settings = ClusterSettings::load(Path::new("cluster.toml"))?;
//!
//! let context = ClusterDefinitionBuilder::new(Collaborators::from_backend(&fixture)).build(&settings)?;
//! let manifest = ManifestRenderer::new().render(&context, &settings)?;
//! println!("{manifest}");
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod payload;
pub mod renderer;
pub mod utils;

pub use context::{ClusterTemplateVars, NodePoolTemplateVars, target_namespace};
pub use payload::render_entity;
pub use renderer::ManifestRenderer;
pub use utils::{encode_json_string, escape_instance_data};
