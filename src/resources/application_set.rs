//! ApplicationSet joins

use kube::ResourceExt;

use super::{DisasterRecoveryResources, find_placement_decision};
use crate::models::{ApplicationSet, DrCluster, DrPlacementControl, DrPolicy, PlacementDecision};
use crate::watcher::{HubSnapshot, LoadStatus, WatchResult};

/// One placement of an ApplicationSet with its DR wiring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppSetPlacement {
    pub placement_decision: Option<PlacementDecision>,
    pub dr_placement_control: Option<DrPlacementControl>,
    pub dr_policy: Option<DrPolicy>,
    /// DR clusters of the policy, in policy order
    pub dr_clusters: Vec<DrCluster>,
}

/// An ApplicationSet with its resolved placements
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationSetResource {
    pub application: ApplicationSet,
    pub placements: Vec<AppSetPlacement>,
}

/// Join every ApplicationSet of a snapshot with its placement data
///
/// ApplicationSets that do not select an OCM placement are not managed by
/// the hub and are left out.
pub fn application_set_resources(
    snapshot: &HubSnapshot,
    dr: &DisasterRecoveryResources,
) -> WatchResult<Vec<ApplicationSetResource>> {
    let status = LoadStatus::combine([
        snapshot.application_sets.status(),
        snapshot.placement_decisions.status(),
    ]);
    WatchResult::gated(status, || {
        snapshot
            .application_sets
            .data
            .iter()
            .filter_map(|app_set| {
                let placement_name = app_set.placement_name()?;
                let namespace = app_set.namespace().unwrap_or_default();
                let placement = resolve_placement(
                    &snapshot.placement_decisions.data,
                    dr,
                    &namespace,
                    placement_name,
                );
                Some(ApplicationSetResource {
                    application: app_set.clone(),
                    placements: vec![placement],
                })
            })
            .collect()
    })
}

fn resolve_placement(
    decisions: &[PlacementDecision],
    dr: &DisasterRecoveryResources,
    namespace: &str,
    placement_name: &str,
) -> AppSetPlacement {
    let placement_decision = find_placement_decision(decisions, namespace, placement_name).cloned();
    let Some(drpc) = dr.find_drpc(namespace, placement_name) else {
        return AppSetPlacement {
            placement_decision,
            ..Default::default()
        };
    };

    let dr_policy = dr.find_policy(drpc).cloned();
    let dr_clusters = dr_policy
        .as_ref()
        .map(|policy| dr.clusters_for_policy(policy))
        .unwrap_or_default();

    AppSetPlacement {
        placement_decision,
        dr_placement_control: Some(drpc.clone()),
        dr_policy,
        dr_clusters,
    }
}
