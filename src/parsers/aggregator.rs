//! Aggregator

use std::collections::btree_map::Entry;

use crate::models::DrClusterAppsMap;
use crate::watcher::{LoadStatus, WatchResult};

/// Union per-type maps into one
///
/// The first map reporting a cluster supplies its entry; later maps add
/// their counts and append their protected apps after the existing ones.
/// Applications reported by more than one map stay separate entries.
pub fn aggregate(maps: impl IntoIterator<Item = DrClusterAppsMap>) -> DrClusterAppsMap {
    let mut merged = DrClusterAppsMap::new();

    for map in maps {
        for (cluster, entry) in map {
            match merged.entry(cluster) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
                Entry::Occupied(mut slot) => {
                    let cluster = slot.key().clone();
                    let acc = slot.get_mut();
                    for app in &entry.protected_apps {
                        if acc
                            .protected_apps
                            .iter()
                            .any(|p| p.is(&app.app_name, &app.app_namespace))
                        {
                            tracing::warn!(
                                "Application {}/{} on cluster {} is reported as both {} and another workload type",
                                app.app_namespace,
                                app.app_name,
                                cluster,
                                app.app_type
                            );
                        }
                    }
                    acc.total_app_count += entry.total_app_count;
                    acc.protected_apps.extend(entry.protected_apps);
                    if acc.managed_cluster.is_none() {
                        acc.managed_cluster = entry.managed_cluster;
                    }
                }
            }
        }
    }

    merged
}

/// Combine parser results
///
/// Loaded when every input is loaded; the first error wins. The map is
/// only populated when every input is loaded and error free.
pub fn aggregate_results(
    results: impl IntoIterator<Item = WatchResult<DrClusterAppsMap>>,
) -> WatchResult<DrClusterAppsMap> {
    let results: Vec<_> = results.into_iter().collect();
    let status = LoadStatus::combine(results.iter().map(WatchResult::status));
    WatchResult::gated(status, || aggregate(results.into_iter().map(|r| r.data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::models::{ClusterAppsEntry, ManagedCluster};

    fn map(cluster: &str, total: usize, managed: Option<ManagedCluster>) -> DrClusterAppsMap {
        let mut entry = ClusterAppsEntry::new(managed);
        entry.total_app_count = total;
        DrClusterAppsMap::from([(cluster.to_string(), entry)])
    }

    #[test]
    fn test_disjoint_clusters_are_copied() {
        let merged = aggregate([map("east", 2, None), map("west", 1, None)]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["east"].total_app_count, 2);
        assert_eq!(merged["west"].total_app_count, 1);
    }

    #[test]
    fn test_missing_managed_cluster_filled_from_later_map() {
        let managed = ManagedCluster::new("east", Default::default());
        let merged = aggregate([map("east", 0, None), map("east", 1, Some(managed.clone()))]);
        assert_eq!(merged["east"].managed_cluster, Some(managed));
    }

    #[test]
    fn test_results_pending_until_all_loaded() {
        let result = aggregate_results([
            WatchResult::ready(map("east", 1, None)),
            WatchResult::pending(),
        ]);
        assert!(!result.loaded);
        assert!(result.data.is_empty());
    }

    #[test]
    fn test_results_error_discards_data() {
        let error = LoadError::watch("Subscription", "connection refused");
        let result = aggregate_results([
            WatchResult::ready(map("east", 1, None)),
            WatchResult::failed(error.clone()),
        ]);
        assert!(result.loaded);
        assert_eq!(result.error, Some(error));
        assert!(result.data.is_empty());
    }
}
