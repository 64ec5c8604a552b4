//! ApplicationSet parser

use kube::{Resource, ResourceExt};

use super::{ParserInput, PlacementSource};
use crate::models::{ApplicationSet, ApplicationType, DrClusterAppsMap, ProtectedApp};
use crate::resources::ApplicationSetResource;
use crate::utils::{DrResolver, get_remote_namespace_from_app_set};
use crate::watcher::WatchResult;

/// Build the per-cluster map for ApplicationSet workloads
///
/// Only the first placement of each ApplicationSet is considered. Each
/// ApplicationSet counts once per deployment cluster and yields one
/// `ProtectedApp` per cluster when a placement control protects it.
pub fn parse_application_sets<R: DrResolver + ?Sized>(
    input: &ParserInput<ApplicationSetResource>,
    resolver: &R,
) -> WatchResult<DrClusterAppsMap> {
    WatchResult::gated(input.status(), || {
        let mut clusters = input.empty_cluster_map(true);

        for resource in &input.resources.data {
            let Some(placement) = resource.placements.first() else {
                continue;
            };
            let app_set = &resource.application;
            let deployment_clusters = resolver.deployment_clusters(
                placement.placement_decision.as_ref(),
                placement.dr_placement_control.as_ref(),
            );

            for cluster_name in &deployment_clusters {
                let Some(entry) = clusters.get_mut(cluster_name) else {
                    continue;
                };
                entry.total_app_count += 1;

                let Some(drpc) = placement.dr_placement_control.as_ref() else {
                    continue;
                };
                let source = PlacementSource {
                    drpc,
                    dr_policy: placement.dr_policy.as_ref(),
                    dr_clusters: &placement.dr_clusters,
                };
                entry.protected_apps.push(ProtectedApp {
                    app_name: app_set.name_any(),
                    app_namespace: app_set.namespace().unwrap_or_default(),
                    app_kind: ApplicationSet::kind(&()).to_string(),
                    app_api_version: ApplicationSet::api_version(&()).to_string(),
                    app_type: ApplicationType::AppSet,
                    placement_info: vec![source.placement_info(
                        resolver,
                        cluster_name,
                        get_remote_namespace_from_app_set(app_set),
                        Vec::new(),
                    )],
                });
            }
        }

        tracing::debug!(
            "ApplicationSet parser: {} resources over {} clusters",
            input.resources.data.len(),
            clusters.len()
        );
        clusters
    })
}
