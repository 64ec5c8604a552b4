//! Subscription parser

use kube::{Resource, ResourceExt};
use std::collections::HashSet;

use super::{ParserInput, PlacementSource};
use crate::models::{Application, ApplicationType, DrClusterAppsMap, ProtectedApp};
use crate::resources::SubscriptionResource;
use crate::utils::DrResolver;
use crate::watcher::WatchResult;

/// Build the per-cluster map for subscription-based workloads
///
/// An application counts once per cluster however many of its groups
/// deploy there. Each protected group contributes one `PlacementInfo` to
/// the application's single `ProtectedApp` on that cluster, in group
/// order. Managed clusters are attached the first time an application is
/// counted on a cluster.
pub fn parse_subscriptions<R: DrResolver + ?Sized>(
    input: &ParserInput<SubscriptionResource>,
    resolver: &R,
) -> WatchResult<DrClusterAppsMap> {
    WatchResult::gated(input.status(), || {
        let mut clusters = input.empty_cluster_map(false);
        let mut seen: HashSet<String> = HashSet::new();

        for resource in &input.resources.data {
            let app = &resource.application;
            let app_name = app.name_any();
            let app_namespace = app.namespace().unwrap_or_default();

            for group in &resource.subscription_group_info {
                let dr_info = group.dr_info.as_ref();
                let deployment_clusters = resolver.deployment_clusters(
                    group.placement_decision.as_ref(),
                    dr_info.map(|info| &info.dr_placement_control),
                );

                for cluster_name in &deployment_clusters {
                    let Some(entry) = clusters.get_mut(cluster_name) else {
                        continue;
                    };

                    if seen.insert(resolver.app_unique_id(&app_name, &app_namespace, cluster_name)) {
                        if entry.managed_cluster.is_none() {
                            entry.managed_cluster = input.managed_cluster(cluster_name);
                        }
                        entry.total_app_count += 1;
                    }

                    let Some(dr_info) = dr_info else {
                        continue;
                    };
                    let source = PlacementSource {
                        drpc: &dr_info.dr_placement_control,
                        dr_policy: dr_info.dr_policy.as_ref(),
                        dr_clusters: &dr_info.dr_clusters,
                    };
                    let info = source.placement_info(
                        resolver,
                        cluster_name,
                        Some(app_namespace.clone()),
                        group.subscription_names(),
                    );

                    match entry
                        .protected_apps
                        .iter_mut()
                        .find(|p| p.is(&app_name, &app_namespace))
                    {
                        Some(protected) => protected.placement_info.push(info),
                        None => entry.protected_apps.push(ProtectedApp {
                            app_name: app_name.clone(),
                            app_namespace: app_namespace.clone(),
                            app_kind: Application::kind(&()).to_string(),
                            app_api_version: Application::api_version(&()).to_string(),
                            app_type: ApplicationType::Subscription,
                            placement_info: vec![info],
                        }),
                    }
                }
            }
        }

        tracing::debug!(
            "Subscription parser: {} resources, {} app/cluster pairs",
            input.resources.data.len(),
            seen.len()
        );
        clusters
    })
}
