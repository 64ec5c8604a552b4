//! Hub state store
//!
//! Holds the latest raw object JSON per resource kind together with the
//! kind's loaded/error flags. Every change bumps a generation counter;
//! derived views memoize on it.

use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use super::{HubResource, HubResourceKind, WatchEvent, WatchResult};
use crate::error::LoadError;
use crate::models::{
    Application, ApplicationSet, DrCluster, DrPlacementControl, DrPolicy, ManagedCluster,
    PlacementDecision, Subscription,
};

#[derive(Debug, Default)]
struct KindStore {
    objects: BTreeMap<String, serde_json::Value>,
    /// Objects received since the last `Restarting`, swapped in on `Synced`
    relist: Option<BTreeMap<String, serde_json::Value>>,
    loaded: bool,
    error: Option<LoadError>,
}

#[derive(Debug, Default)]
struct Inner {
    kinds: HashMap<HubResourceKind, KindStore>,
    generation: u64,
}

/// Thread-safe hub state store
#[derive(Clone, Default)]
pub struct HubState {
    inner: Arc<RwLock<Inner>>,
}

/// Immutable, typed copy of the store at one generation
#[derive(Debug, Clone, Default)]
pub struct HubSnapshot {
    pub generation: u64,
    pub dr_clusters: WatchResult<Vec<DrCluster>>,
    pub dr_policies: WatchResult<Vec<DrPolicy>>,
    pub dr_placement_controls: WatchResult<Vec<DrPlacementControl>>,
    pub placement_decisions: WatchResult<Vec<PlacementDecision>>,
    pub managed_clusters: WatchResult<Vec<ManagedCluster>>,
    pub application_sets: WatchResult<Vec<ApplicationSet>>,
    pub applications: WatchResult<Vec<Application>>,
    pub subscriptions: WatchResult<Vec<Subscription>>,
}

impl HubState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a watch event. Returns true when the store changed.
    pub fn apply(&self, event: WatchEvent) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let changed = match event {
            WatchEvent::Restarting(kind) => {
                inner.kinds.entry(kind).or_default().relist = Some(BTreeMap::new());
                false
            }
            WatchEvent::Listed(kind, key, obj) => {
                let store = inner.kinds.entry(kind).or_default();
                match store.relist.as_mut() {
                    Some(relist) => {
                        relist.insert(key, obj);
                        false
                    }
                    None => {
                        store.objects.insert(key, obj);
                        true
                    }
                }
            }
            WatchEvent::Synced(kind) => {
                let store = inner.kinds.entry(kind).or_default();
                if let Some(relist) = store.relist.take() {
                    store.objects = relist;
                }
                store.loaded = true;
                store.error = None;
                true
            }
            WatchEvent::Applied(kind, key, obj) => {
                let store = inner.kinds.entry(kind).or_default();
                store.error = None;
                store.objects.insert(key, obj.clone()) != Some(obj)
            }
            WatchEvent::Deleted(kind, key) => {
                let store = inner.kinds.entry(kind).or_default();
                store.objects.remove(&key).is_some()
            }
            WatchEvent::Error(kind, message) => {
                let store = inner.kinds.entry(kind).or_default();
                let error = LoadError::watch(kind.display_name(), message);
                let changed = store.error.as_ref() != Some(&error);
                store.error = Some(error);
                changed
            }
        };
        if changed {
            inner.generation += 1;
        }
        changed
    }

    /// Replace every object of a kind and mark it loaded
    pub fn replace_all(&self, kind: HubResourceKind, objects: Vec<(String, serde_json::Value)>) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let store = inner.kinds.entry(kind).or_default();
        store.objects = objects.into_iter().collect();
        store.relist = None;
        store.loaded = true;
        store.error = None;
        inner.generation += 1;
    }

    /// Settle a kind as failed
    pub fn mark_failed(&self, kind: HubResourceKind, error: LoadError) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let store = inner.kinds.entry(kind).or_default();
        store.loaded = true;
        store.error = Some(error);
        inner.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .generation
    }

    /// Number of objects currently held per kind
    pub fn count_by_kind(&self) -> HashMap<HubResourceKind, usize> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .kinds
            .iter()
            .map(|(kind, store)| (*kind, store.objects.len()))
            .collect()
    }

    /// Take a typed snapshot of the whole store
    pub fn snapshot(&self) -> HubSnapshot {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        HubSnapshot {
            generation: inner.generation,
            dr_clusters: decode(&inner),
            dr_policies: decode(&inner),
            dr_placement_controls: decode(&inner),
            placement_decisions: decode(&inner),
            managed_clusters: decode(&inner),
            application_sets: decode(&inner),
            applications: decode(&inner),
            subscriptions: decode(&inner),
        }
    }
}

/// Decode one kind's objects. Objects that fail to decode are skipped so a
/// single malformed object degrades the view instead of blocking it.
fn decode<K>(inner: &Inner) -> WatchResult<Vec<K>>
where
    K: HubResource + DeserializeOwned,
{
    let kind = K::hub_kind();
    let Some(store) = inner.kinds.get(&kind) else {
        return WatchResult::pending();
    };

    let data = store
        .objects
        .iter()
        .filter_map(|(key, value)| match serde_json::from_value::<K>(value.clone()) {
            Ok(obj) => Some(obj),
            Err(e) => {
                tracing::warn!("Skipping {} {}: failed to decode: {}", kind, key, e);
                None
            }
        })
        .collect();

    WatchResult {
        data,
        loaded: store.loaded,
        error: store.error.clone(),
    }
}

/// Generate the store key for an object
pub fn resource_key(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}/{}", ns, name),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dr_cluster_json(name: &str, region: &str) -> serde_json::Value {
        json!({
            "apiVersion": "ramendr.openshift.io/v1alpha1",
            "kind": "DRCluster",
            "metadata": { "name": name },
            "spec": { "region": region }
        })
    }

    #[test]
    fn test_resource_key_generation() {
        assert_eq!(resource_key(Some("busybox"), "drpc"), "busybox/drpc");
        assert_eq!(resource_key(None, "east"), "east");
        assert_eq!(resource_key(Some(""), "east"), "east");
    }

    #[test]
    fn test_unseen_kind_is_pending() {
        let state = HubState::new();
        let snapshot = state.snapshot();
        assert!(!snapshot.dr_clusters.loaded);
        assert!(snapshot.dr_clusters.data.is_empty());
        assert_eq!(snapshot.generation, 0);
    }

    #[test]
    fn test_relist_replaces_objects_on_sync() {
        let state = HubState::new();
        let kind = HubResourceKind::DrCluster;

        state.apply(WatchEvent::Applied(
            kind,
            "stale".to_string(),
            dr_cluster_json("stale", "us-east-1"),
        ));
        state.apply(WatchEvent::Restarting(kind));
        state.apply(WatchEvent::Listed(
            kind,
            "east".to_string(),
            dr_cluster_json("east", "us-east-1"),
        ));

        // Still the old view until the relist completes
        assert_eq!(state.snapshot().dr_clusters.data.len(), 1);
        assert!(!state.snapshot().dr_clusters.loaded);

        state.apply(WatchEvent::Synced(kind));
        let snapshot = state.snapshot();
        assert!(snapshot.dr_clusters.loaded);
        assert_eq!(snapshot.dr_clusters.data.len(), 1);
        assert_eq!(
            snapshot.dr_clusters.data[0].metadata.name.as_deref(),
            Some("east")
        );
    }

    #[test]
    fn test_generation_only_moves_on_change() {
        let state = HubState::new();
        let kind = HubResourceKind::DrCluster;
        let obj = dr_cluster_json("east", "us-east-1");

        assert!(state.apply(WatchEvent::Applied(kind, "east".to_string(), obj.clone())));
        let generation = state.generation();

        assert!(!state.apply(WatchEvent::Applied(kind, "east".to_string(), obj)));
        assert_eq!(state.generation(), generation);

        assert!(state.apply(WatchEvent::Deleted(kind, "east".to_string())));
        assert_eq!(state.generation(), generation + 1);
    }

    #[test]
    fn test_watch_error_is_reported_and_cleared() {
        let state = HubState::new();
        let kind = HubResourceKind::ManagedCluster;

        state.apply(WatchEvent::Error(kind, "forbidden".to_string()));
        let snapshot = state.snapshot();
        assert_eq!(
            snapshot.managed_clusters.error,
            Some(LoadError::watch("ManagedCluster", "forbidden"))
        );

        state.apply(WatchEvent::Synced(kind));
        assert!(state.snapshot().managed_clusters.is_ready());
    }

    #[test]
    fn test_malformed_object_is_skipped() {
        let state = HubState::new();
        state.replace_all(
            HubResourceKind::DrCluster,
            vec![
                ("east".to_string(), dr_cluster_json("east", "r1")),
                (
                    "broken".to_string(),
                    json!({ "metadata": { "name": "broken" }, "spec": { "region": 42 } }),
                ),
            ],
        );

        let snapshot = state.snapshot();
        assert!(snapshot.dr_clusters.is_ready());
        assert_eq!(snapshot.dr_clusters.data.len(), 1);
        assert_eq!(
            state.count_by_kind().get(&HubResourceKind::DrCluster),
            Some(&2)
        );
    }
}
