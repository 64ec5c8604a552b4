//! Identity and classification helpers
//!
//! Pure functions the parsers use to decide where a workload runs, what
//! kind of replication protects it and how it is keyed. The parsers reach
//! them through `DrResolver` so tests can substitute fixed answers.

use kube::ResourceExt;

use crate::constants::APP_ID_SEPARATOR;
use crate::models::{
    ApplicationSet, DrAction, DrCluster, DrPlacementControl, PlacementDecision, ReplicationType,
};

/// Clusters a workload is currently deployed to
///
/// Decision clusters win, in decision order with duplicates dropped. An
/// empty decision (e.g. mid failover) falls back to the placement
/// control: its preferred decision, then the cluster its action points at.
pub fn find_deployment_clusters(
    decision: Option<&PlacementDecision>,
    drpc: Option<&DrPlacementControl>,
) -> Vec<String> {
    let mut clusters: Vec<String> = Vec::new();
    for name in decision.into_iter().flat_map(|d| d.cluster_names()) {
        if !clusters.iter().any(|c| c == name) {
            clusters.push(name.to_string());
        }
    }
    if !clusters.is_empty() {
        return clusters;
    }

    let Some(drpc) = drpc else {
        return clusters;
    };

    let from_status = drpc
        .status
        .as_ref()
        .and_then(|s| s.preferred_decision.as_ref())
        .and_then(|d| d.cluster_name.clone());
    let from_spec = match drpc.spec.action {
        Some(DrAction::Failover) => drpc.spec.failover_cluster.clone(),
        _ => drpc.spec.preferred_cluster.clone(),
    };

    from_status
        .or(from_spec)
        .filter(|name| !name.is_empty())
        .into_iter()
        .collect()
}

/// Replication type of a DR cluster set
///
/// Clusters sharing one region replicate synchronously (metro DR);
/// clusters spread over regions replicate asynchronously (regional DR).
pub fn find_dr_type(dr_clusters: &[DrCluster]) -> ReplicationType {
    let Some(first) = dr_clusters.first() else {
        return ReplicationType::Unknown;
    };
    let region = first.spec.region.as_deref();
    if dr_clusters
        .iter()
        .all(|c| c.spec.region.as_deref() == region)
    {
        ReplicationType::Sync
    } else {
        ReplicationType::Async
    }
}

/// PVC names the placement control reports as protected
pub fn get_protected_pvcs_from_drpc(drpc: &DrPlacementControl) -> Vec<String> {
    drpc.status
        .as_ref()
        .and_then(|s| s.resource_conditions.as_ref())
        .and_then(|c| c.resource_meta.as_ref())
        .map(|m| m.protectedpvcs.clone())
        .unwrap_or_default()
}

/// Key identifying one application on one cluster
pub fn get_app_unique_id(app_name: &str, app_namespace: &str, cluster_name: &str) -> String {
    [app_name, app_namespace, cluster_name].join(APP_ID_SEPARATOR)
}

/// Namespace the generated Argo CD applications deploy into
pub fn get_remote_namespace_from_app_set(app_set: &ApplicationSet) -> Option<String> {
    app_set
        .spec
        .template
        .as_ref()
        .and_then(|t| t.spec.as_ref())
        .and_then(|s| s.destination.as_ref())
        .and_then(|d| d.namespace.clone())
}

/// Name and namespace of a placement control, as recorded in placement info
pub fn drpc_identity(drpc: &DrPlacementControl) -> (String, Option<String>) {
    (drpc.name_any(), drpc.namespace())
}

/// Resolution seam between the parsers and the helpers above
#[cfg_attr(test, mockall::automock)]
pub trait DrResolver {
    fn deployment_clusters<'a>(
        &self,
        decision: Option<&'a PlacementDecision>,
        drpc: Option<&'a DrPlacementControl>,
    ) -> Vec<String>;

    fn dr_type(&self, dr_clusters: &[DrCluster]) -> ReplicationType;

    fn protected_pvcs(&self, drpc: &DrPlacementControl) -> Vec<String>;

    fn app_unique_id(&self, app_name: &str, app_namespace: &str, cluster_name: &str) -> String;
}

/// Resolver backed by the functions in this module
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResolver;

impl DrResolver for DefaultResolver {
    fn deployment_clusters<'a>(
        &self,
        decision: Option<&'a PlacementDecision>,
        drpc: Option<&'a DrPlacementControl>,
    ) -> Vec<String> {
        find_deployment_clusters(decision, drpc)
    }

    fn dr_type(&self, dr_clusters: &[DrCluster]) -> ReplicationType {
        find_dr_type(dr_clusters)
    }

    fn protected_pvcs(&self, drpc: &DrPlacementControl) -> Vec<String> {
        get_protected_pvcs_from_drpc(drpc)
    }

    fn app_unique_id(&self, app_name: &str, app_namespace: &str, cluster_name: &str) -> String {
        get_app_unique_id(app_name, app_namespace, cluster_name)
    }
}
