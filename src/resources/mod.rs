//! Resource joins
//!
//! Assemble the per-workload views the parsers consume out of a
//! `HubSnapshot`: which placement decision, placement control, policy and
//! DR clusters belong to each ApplicationSet or subscription group.
//!
//! Joins never fail. A reference that cannot be resolved leaves the field
//! empty; the parsers treat that as "not protected" or "not placed".

mod application_set;
mod subscription;

pub use application_set::*;
pub use subscription::*;

use kube::ResourceExt;

use crate::constants::{DEFAULT_PLACEMENT_KIND, PLACEMENT_LABEL};
use crate::models::{DrCluster, DrPlacementControl, DrPolicy, PlacementDecision};
use crate::watcher::{HubSnapshot, LoadStatus, WatchResult};

/// The Ramen objects every workload join draws from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisasterRecoveryResources {
    pub dr_clusters: Vec<DrCluster>,
    pub dr_policies: Vec<DrPolicy>,
    pub dr_placement_controls: Vec<DrPlacementControl>,
}

impl DisasterRecoveryResources {
    /// Names of every known DR cluster, in name order
    pub fn dr_cluster_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dr_clusters.iter().map(|c| c.name_any()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Placement control protecting the placement `name` in `namespace`
    pub fn find_drpc(&self, namespace: &str, placement_name: &str) -> Option<&DrPlacementControl> {
        self.dr_placement_controls.iter().find(|drpc| {
            let Some(placement_ref) = drpc.spec.placement_ref.as_ref() else {
                return false;
            };
            let drpc_ns = drpc.namespace().unwrap_or_default();
            let ref_ns = placement_ref.namespace.as_deref().unwrap_or(drpc_ns.as_str());
            let ref_kind = placement_ref
                .kind
                .as_deref()
                .unwrap_or(DEFAULT_PLACEMENT_KIND);
            ref_kind == DEFAULT_PLACEMENT_KIND
                && ref_ns == namespace
                && placement_ref.name.as_deref() == Some(placement_name)
        })
    }

    pub fn find_policy(&self, drpc: &DrPlacementControl) -> Option<&DrPolicy> {
        let name = drpc.spec.dr_policy_ref.as_ref()?.name.as_deref()?;
        self.dr_policies.iter().find(|p| p.name_any() == name)
    }

    /// DR clusters a policy replicates across, in policy order
    pub fn clusters_for_policy(&self, policy: &DrPolicy) -> Vec<DrCluster> {
        policy
            .spec
            .dr_clusters
            .iter()
            .filter_map(|name| self.dr_clusters.iter().find(|c| &c.name_any() == name))
            .cloned()
            .collect()
    }
}

/// Collect the Ramen objects of a snapshot
///
/// Loaded once all three kinds are loaded; the first failing kind (in
/// cluster, policy, placement control order) is reported.
pub fn disaster_recovery_resources(snapshot: &HubSnapshot) -> WatchResult<DisasterRecoveryResources> {
    let status = LoadStatus::combine([
        snapshot.dr_clusters.status(),
        snapshot.dr_policies.status(),
        snapshot.dr_placement_controls.status(),
    ]);
    WatchResult::gated(status, || DisasterRecoveryResources {
        dr_clusters: snapshot.dr_clusters.data.clone(),
        dr_policies: snapshot.dr_policies.data.clone(),
        dr_placement_controls: snapshot.dr_placement_controls.data.clone(),
    })
}

/// First placement decision OCM produced for a placement
fn find_placement_decision<'a>(
    decisions: &'a [PlacementDecision],
    namespace: &str,
    placement_name: &str,
) -> Option<&'a PlacementDecision> {
    decisions.iter().find(|d| {
        d.namespace().as_deref() == Some(namespace)
            && d.labels().get(PLACEMENT_LABEL).map(String::as_str) == Some(placement_name)
    })
}
