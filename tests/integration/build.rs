//! Building and rendering through the public API.

use anyhow::Result;
use cse_manifest::builder::ClusterDefinitionBuilder;
use cse_manifest::collaborators::{Collaborators, Fixture, ResourceNamer, StaticToken};
use cse_manifest::core::CseError;
use cse_manifest::templating::{ManifestRenderer, render_entity};
use cse_manifest::test_utils::{init_test_logging, sample_fixture, sample_settings};
use std::cell::Cell;

/// Counts namer calls and forwards them to a fixture.
struct CountingNamer<'a> {
    inner: &'a Fixture,
    calls: Cell<usize>,
}

impl ResourceNamer for CountingNamer<'_> {
    fn storage_profile_name(&self, id: &str) -> anyhow::Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.inner.storage_profile_name(id)
    }

    fn compute_policy_name(&self, id: &str) -> anyhow::Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.inner.compute_policy_name(id)
    }
}

#[test]
fn test_build_and_render_entity() -> Result<()> {
    init_test_logging(None);
    let site = sample_fixture();
    let settings = sample_settings();

    let context = ClusterDefinitionBuilder::new(Collaborators::from_backend(&site)).build(&settings)?;
    assert_eq!(context.org_name(), "tenant1");
    assert_eq!(context.catalog_name(), "tkgm-catalog");
    assert_eq!(context.rde_type().id, "urn:vcloud:type:vmware:capvcdCluster:1.2.0");
    assert_eq!(context.versions().tkr_version, "v1.26.8---vmware.1-tkg.1");

    let renderer = ManifestRenderer::new();
    let entity: serde_json::Value = serde_json::from_str(&render_entity(&renderer, &context, &settings)?)?;
    assert_eq!(entity["apiVersion"], "capvcd.vmware.com/v1.2");
    assert_eq!(entity["metadata"]["virtualDataCenterName"], "tenant1-vdc");
    assert_eq!(entity["spec"]["vcdKe"]["defaultStorageClassOptions"]["vcdStorageProfileName"], "gold");

    let capi_yaml = entity["spec"]["capiYaml"].as_str().unwrap();
    assert_eq!(capi_yaml.trim_end(), renderer.render_yaml(&context, &settings)?.trim_end());
    Ok(())
}

#[test]
fn test_each_distinct_id_is_named_once() -> Result<()> {
    let site = sample_fixture();
    let namer = CountingNamer {
        inner: &site,
        calls: Cell::new(0),
    };
    let collaborators = Collaborators {
        namer: &namer,
        ..Collaborators::from_backend(&site)
    };

    let context = ClusterDefinitionBuilder::new(collaborators).build(&sample_settings())?;

    // Two storage profiles and four compute policies, several referenced twice
    assert_eq!(namer.calls.get(), 6);
    assert_eq!(context.name_cache().name_of(None), Some(""));
    assert_eq!(context.name_cache().get("urn:vcloud:vdcComputePolicy:4"), Some("a100-vgpu"));
    Ok(())
}

#[test]
fn test_rendering_is_deterministic() -> Result<()> {
    let site = sample_fixture();
    let settings = sample_settings();
    let builder = ClusterDefinitionBuilder::new(Collaborators::from_backend(&site));
    let renderer = ManifestRenderer::new();

    let first = renderer.render(&builder.build(&settings)?, &settings)?;
    let second = renderer.render(&builder.build(&settings)?, &settings)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_explicit_credentials_override_session_token() -> Result<()> {
    let site = sample_fixture();
    let token = StaticToken::new("override-token");
    let collaborators = Collaborators::from_backend(&site).with_credentials(&token);

    let context = ClusterDefinitionBuilder::new(collaborators).build(&sample_settings())?;
    assert_eq!(context.api_token(), "override-token");
    Ok(())
}

#[test]
fn test_unknown_storage_profile_names_the_pool() {
    let mut site = sample_fixture();
    site.storage_profiles.remove("urn:vcloud:vdcstorageProfile:2");
    let mut settings = sample_settings();
    settings.default_storage_class = None;

    let err = ClusterDefinitionBuilder::new(Collaborators::from_backend(&site))
        .build(&settings)
        .unwrap_err();
    match err {
        CseError::ExternalLookupFailure {
            field,
            id,
            ..
        } => {
            assert_eq!(field, "storage profile of node pool 'gpu'");
            assert_eq!(id, "urn:vcloud:vdcstorageProfile:2");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_photon_template_is_rejected() {
    let site = sample_fixture();
    let mut settings = sample_settings();
    settings.kubernetes_template_id = "urn:vcloud:vapptemplate:2".to_string();

    let err = ClusterDefinitionBuilder::new(Collaborators::from_backend(&site))
        .build(&settings)
        .unwrap_err();
    assert!(matches!(err, CseError::UnsupportedBaseOs { .. }), "unexpected error: {err:?}");
}

#[test]
fn test_missing_backend_config_fails_the_build() {
    let mut site = sample_fixture();
    site.backend_config = None;

    let err = ClusterDefinitionBuilder::new(Collaborators::from_backend(&site))
        .build(&sample_settings())
        .unwrap_err();
    assert!(
        matches!(err, CseError::CollaboratorFailure { ref what, .. } if what == "backend configuration"),
        "unexpected error: {err:?}"
    );
}
