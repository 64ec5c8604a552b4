//! Aggregation engine
//!
//! Two parsers turn joined workload resources into per-cluster
//! application maps; the aggregator unions them. Every function here is a
//! pure computation over one snapshot: maps are built from scratch in
//! locals and returned, nothing is carried between calls.

mod aggregator;
mod application_set;
mod subscription;

pub use aggregator::*;
pub use application_set::*;
pub use subscription::*;

use kube::ResourceExt;

use crate::models::{
    ClusterAppsEntry, DrCluster, DrClusterAppsMap, DrPlacementControl, DrPolicy, ManagedCluster,
    PlacementInfo,
};
use crate::resources::DisasterRecoveryResources;
use crate::utils::{DrResolver, drpc_identity};
use crate::watcher::{LoadStatus, WatchResult};

/// Everything one parser reads
#[derive(Debug, Clone, Default)]
pub struct ParserInput<T> {
    /// Joined workload resources
    pub resources: WatchResult<Vec<T>>,
    pub dr_resources: WatchResult<DisasterRecoveryResources>,
    pub managed_clusters: WatchResult<Vec<ManagedCluster>>,
}

impl<T> ParserInput<T> {
    /// Combined status; workload errors take precedence over managed
    /// cluster errors, which take precedence over DR resource errors
    pub fn status(&self) -> LoadStatus {
        LoadStatus::combine([
            self.resources.status(),
            self.managed_clusters.status(),
            self.dr_resources.status(),
        ])
    }

    fn managed_cluster(&self, name: &str) -> Option<ManagedCluster> {
        self.managed_clusters
            .data
            .iter()
            .find(|c| c.name_any() == name)
            .cloned()
    }

    /// One empty entry per known DR cluster
    fn empty_cluster_map(&self, attach_managed_clusters: bool) -> DrClusterAppsMap {
        self.dr_resources
            .data
            .dr_cluster_names()
            .into_iter()
            .map(|name| {
                let managed = attach_managed_clusters
                    .then(|| self.managed_cluster(&name))
                    .flatten();
                (name, ClusterAppsEntry::new(managed))
            })
            .collect()
    }
}

/// DR detail of one placement control for one deployment cluster
struct PlacementSource<'a> {
    drpc: &'a DrPlacementControl,
    dr_policy: Option<&'a DrPolicy>,
    dr_clusters: &'a [DrCluster],
}

impl PlacementSource<'_> {
    fn placement_info<R: DrResolver + ?Sized>(
        &self,
        resolver: &R,
        deployment_cluster: &str,
        workload_namespace: Option<String>,
        subscriptions: Vec<String>,
    ) -> PlacementInfo {
        let (drpc_name, drpc_namespace) = drpc_identity(self.drpc);
        let status = self.drpc.status.as_ref();
        PlacementInfo {
            drpc_name: Some(drpc_name),
            drpc_namespace,
            workload_namespace,
            replication_type: resolver.dr_type(self.dr_clusters),
            sync_interval: self
                .dr_policy
                .and_then(|p| p.spec.scheduling_interval.clone()),
            deployment_cluster_name: Some(deployment_cluster.to_string()),
            failover_cluster: self.drpc.spec.failover_cluster.clone(),
            preferred_cluster: self.drpc.spec.preferred_cluster.clone(),
            last_group_sync_time: status.and_then(|s| s.last_group_sync_time),
            status: status.and_then(|s| s.phase),
            protected_pvcs: resolver.protected_pvcs(self.drpc),
            subscriptions,
        }
    }
}
