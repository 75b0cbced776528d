//! Memoizing ID-to-name cache for storage profiles and compute policies.
//!
//! The cluster manifest refers to storage profiles and compute policies by
//! name, while the user supplies them by ID. Many pools usually share the
//! same profile or policy, so [`NameCache`] asks the [`ResourceNamer`] for each
//! distinct ID once and serves repeats from memory.
//!
//! The cache lives for exactly one build. It is pre-seeded with `"" -> ""` so
//! an optional field the user left unset renders as an empty string without
//! a collaborator call.
//!
//! # Thread Safety
//!
//! `NameCache` is `!Sync` and all mutation goes through `&mut self`. Builds
//! are sequential; parallel resolution is not supported.

use std::cell::Cell;
use std::collections::HashMap;
use std::marker::PhantomData;

use crate::collaborators::ResourceNamer;
use crate::core::{CseError, Result};
use crate::settings::ClusterSettings;

/// Kind of resource an ID names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    StorageProfile,
    ComputePolicy,
}

/// Per-build map from opaque resource IDs to display names.
#[derive(Debug)]
pub struct NameCache {
    names: HashMap<String, String>,
    hits: usize,
    misses: usize,
    _not_sync: PhantomData<Cell<()>>,
}

impl Default for NameCache {
    fn default() -> Self {
        Self::new()
    }
}

impl NameCache {
    /// Create a cache holding only the empty-ID entry.
    pub fn new() -> Self {
        let mut names = HashMap::new();
        names.insert(String::new(), String::new());
        Self {
            names,
            hits: 0,
            misses: 0,
            _not_sync: PhantomData,
        }
    }

    /// Resolve `id`, calling `lookup` only on a miss.
    ///
    /// `field` names the setting that required the ID and ends up in the
    /// error when the lookup fails.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::ExternalLookupFailure`] if `lookup` fails.
    pub fn resolve_with<F>(&mut self, id: &str, field: &str, lookup: F) -> Result<String>
    where
        F: FnOnce(&str) -> anyhow::Result<String>,
    {
        if let Some(name) = self.names.get(id) {
            self.hits += 1;
            tracing::debug!("Name cache hit for {} '{}'", field, id);
            return Ok(name.clone());
        }

        self.misses += 1;
        tracing::debug!("Name cache miss for {} '{}', asking the backend", field, id);
        let name = lookup(id).map_err(|e| CseError::ExternalLookupFailure {
            field: field.to_string(),
            id: id.to_string(),
            reason: format!("{e:#}"),
        })?;
        self.names.insert(id.to_string(), name.clone());
        Ok(name)
    }

    /// Resolve an ID of the given kind through `namer`.
    ///
    /// # Errors
    ///
    /// Returns [`CseError::ExternalLookupFailure`] if the namer fails.
    pub fn resolve(
        &mut self,
        namer: &dyn ResourceNamer,
        kind: ResourceKind,
        id: &str,
        field: &str,
    ) -> Result<String> {
        match kind {
            ResourceKind::StorageProfile => {
                self.resolve_with(id, field, |id| namer.storage_profile_name(id))
            }
            ResourceKind::ComputePolicy => {
                self.resolve_with(id, field, |id| namer.compute_policy_name(id))
            }
        }
    }

    /// Resolve every storage profile and compute policy the settings mention.
    ///
    /// Order: default storage class profile, control plane profile, each
    /// pool's profile, control plane sizing and placement policies, then each
    /// pool's sizing, placement and vGPU policies. Unset fields are skipped.
    ///
    /// # Errors
    ///
    /// Stops at the first failed lookup with [`CseError::ExternalLookupFailure`].
    pub fn populate(&mut self, settings: &ClusterSettings, namer: &dyn ResourceNamer) -> Result<()> {
        let mut wanted: Vec<(ResourceKind, &str, String)> = Vec::new();

        if let Some(storage_class) = &settings.default_storage_class {
            wanted.push((
                ResourceKind::StorageProfile,
                &storage_class.storage_profile_id,
                "default storage class storage profile".to_string(),
            ));
        }
        if let Some(id) = &settings.control_plane.storage_profile_id {
            wanted.push((
                ResourceKind::StorageProfile,
                id,
                "control plane storage profile".to_string(),
            ));
        }
        for pool in &settings.worker_pools {
            if let Some(id) = &pool.storage_profile_id {
                wanted.push((
                    ResourceKind::StorageProfile,
                    id,
                    format!("storage profile of node pool '{}'", pool.name),
                ));
            }
        }

        let control_plane = &settings.control_plane;
        for (id, label) in [
            (&control_plane.sizing_policy_id, "sizing"),
            (&control_plane.placement_policy_id, "placement"),
        ] {
            if let Some(id) = id {
                wanted.push((
                    ResourceKind::ComputePolicy,
                    id,
                    format!("control plane {label} policy"),
                ));
            }
        }
        for pool in &settings.worker_pools {
            for (id, label) in [
                (&pool.sizing_policy_id, "sizing"),
                (&pool.placement_policy_id, "placement"),
                (&pool.vgpu_policy_id, "vGPU"),
            ] {
                if let Some(id) = id {
                    wanted.push((
                        ResourceKind::ComputePolicy,
                        id,
                        format!("{label} policy of node pool '{}'", pool.name),
                    ));
                }
            }
        }

        for (kind, id, field) in wanted {
            self.resolve(namer, kind, id, &field)?;
        }

        tracing::debug!(
            "Name cache populated: {} names, {} lookups, {} hits",
            self.len(),
            self.misses,
            self.hits
        );
        Ok(())
    }

    /// Name previously resolved for `id`.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Name for an optional ID; unset maps to the empty name.
    pub fn name_of(&self, id: Option<&str>) -> Option<&str> {
        self.get(id.unwrap_or_default())
    }

    /// Number of cached entries, including the empty-ID entry.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Cache statistics as `(hits, misses)`.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ControlPlaneSettings, WorkerPoolSettings};
    use anyhow::anyhow;
    use std::cell::RefCell;

    /// Namer that records every call.
    #[derive(Default)]
    struct RecordingNamer {
        calls: RefCell<Vec<String>>,
        storage_calls: Cell<usize>,
        policy_calls: Cell<usize>,
    }

    impl ResourceNamer for RecordingNamer {
        fn storage_profile_name(&self, id: &str) -> anyhow::Result<String> {
            self.storage_calls.set(self.storage_calls.get() + 1);
            self.calls.borrow_mut().push(id.to_string());
            if id.contains("missing") {
                return Err(anyhow!("no such storage profile"));
            }
            Ok(format!("sp-{id}"))
        }

        fn compute_policy_name(&self, id: &str) -> anyhow::Result<String> {
            self.policy_calls.set(self.policy_calls.get() + 1);
            self.calls.borrow_mut().push(id.to_string());
            Ok(format!("cp-{id}"))
        }
    }

    fn settings() -> ClusterSettings {
        let mut gpu = WorkerPoolSettings::new("gpu");
        gpu.storage_profile_id = Some("sp1".to_string());
        gpu.sizing_policy_id = Some("size1".to_string());
        gpu.vgpu_policy_id = Some("vgpu1".to_string());

        let mut workers = WorkerPoolSettings::new("workers");
        workers.storage_profile_id = Some("sp2".to_string());
        workers.sizing_policy_id = Some("size1".to_string());
        workers.placement_policy_id = Some("place1".to_string());

        ClusterSettings {
            name: "demo".to_string(),
            org_id: "org".to_string(),
            vdc_id: "vdc".to_string(),
            network_id: "net".to_string(),
            kubernetes_template_id: "tpl".to_string(),
            owner: None,
            ssh_public_key: None,
            control_plane: ControlPlaneSettings {
                storage_profile_id: Some("sp1".to_string()),
                sizing_policy_id: Some("size0".to_string()),
                ..ControlPlaneSettings::default()
            },
            worker_pools: vec![gpu, workers],
            default_storage_class: None,
            pod_cidr: None,
            service_cidr: None,
            virtual_ip_subnet: None,
            auto_repair_on_errors: false,
            node_health_check: false,
            api_token_file: None,
        }
    }

    #[test]
    fn test_empty_id_is_preseeded() -> Result<()> {
        let namer = RecordingNamer::default();
        let mut cache = NameCache::new();
        assert_eq!(cache.resolve(&namer, ResourceKind::StorageProfile, "", "x")?, "");
        assert_eq!(namer.storage_calls.get(), 0);
        assert_eq!(cache.name_of(None), Some(""));
        Ok(())
    }

    #[test]
    fn test_same_id_resolved_once() -> Result<()> {
        let namer = RecordingNamer::default();
        let mut cache = NameCache::new();

        let first = cache.resolve(&namer, ResourceKind::StorageProfile, "sp1", "first")?;
        let second = cache.resolve(&namer, ResourceKind::StorageProfile, "sp1", "second")?;

        assert_eq!(first, "sp-sp1");
        assert_eq!(first, second);
        assert_eq!(namer.storage_calls.get(), 1);
        assert_eq!(cache.stats(), (1, 1));
        Ok(())
    }

    #[test]
    fn test_failure_names_field_and_id() {
        let namer = RecordingNamer::default();
        let mut cache = NameCache::new();

        let err = cache
            .resolve(&namer, ResourceKind::StorageProfile, "missing-sp", "control plane storage profile")
            .unwrap_err();
        match err {
            CseError::ExternalLookupFailure {
                field,
                id,
                reason,
            } => {
                assert_eq!(field, "control plane storage profile");
                assert_eq!(id, "missing-sp");
                assert!(reason.contains("no such storage profile"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(cache.get("missing-sp").is_none());
    }

    #[test]
    fn test_populate_order_and_deduplication() -> Result<()> {
        let namer = RecordingNamer::default();
        let mut cache = NameCache::new();
        cache.populate(&settings(), &namer)?;

        assert_eq!(*namer.calls.borrow(), vec!["sp1", "sp2", "size0", "size1", "vgpu1", "place1"]);
        assert_eq!(cache.get("vgpu1"), Some("cp-vgpu1"));
        assert_eq!(cache.get("place1"), Some("cp-place1"));
        // "" plus six distinct IDs
        assert_eq!(cache.len(), 7);
        Ok(())
    }

    #[test]
    fn test_populate_stops_at_first_failure() {
        let namer = RecordingNamer::default();
        let mut s = settings();
        s.control_plane.storage_profile_id = Some("missing-cp".to_string());

        let mut cache = NameCache::new();
        let err = cache.populate(&s, &namer).unwrap_err();
        assert!(err.to_string().contains("control plane storage profile"));
        assert_eq!(namer.policy_calls.get(), 0);
    }
}
