//! Selections over the aggregated map

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::placement_activity;
use crate::models::{DrClusterAppsMap, ProtectedApp, ProtectedPvcData};

/// Protected application `namespace/name` on one cluster
pub fn find_protected_app<'a>(
    clusters: &'a DrClusterAppsMap,
    cluster: &str,
    app_name: &str,
    app_namespace: &str,
) -> Option<&'a ProtectedApp> {
    clusters
        .get(cluster)?
        .protected_apps
        .iter()
        .find(|app| app.is(app_name, app_namespace))
}

/// One subscription of a subscription-based application
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRow {
    pub name: String,
    pub activity: String,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub failover_cluster: Option<String>,
    pub preferred_cluster: Option<String>,
}

/// Flatten placements x subscriptions, in placement order
pub fn subscription_rows(app: &ProtectedApp) -> Vec<SubscriptionRow> {
    app.placement_info
        .iter()
        .flat_map(|placement| {
            placement.subscriptions.iter().map(move |name| SubscriptionRow {
                name: name.clone(),
                activity: placement_activity(placement),
                last_sync_time: placement.last_group_sync_time,
                failover_cluster: placement.failover_cluster.clone(),
                preferred_cluster: placement.preferred_cluster.clone(),
            })
        })
        .collect()
}

/// Number of subscriptions across every placement of an application
pub fn subscription_count(app: &ProtectedApp) -> usize {
    app.placement_info
        .iter()
        .map(|placement| placement.subscriptions.len())
        .sum()
}

/// Protected PVCs of a set of applications with their DR context
pub fn protected_pvc_data<'a>(
    apps: impl IntoIterator<Item = &'a ProtectedApp>,
) -> Vec<ProtectedPvcData> {
    apps.into_iter()
        .flat_map(|app| app.placement_info.iter())
        .flat_map(|placement| {
            placement.protected_pvcs.iter().map(move |pvc| ProtectedPvcData {
                drpc_name: placement.drpc_name.clone(),
                drpc_namespace: placement.drpc_namespace.clone(),
                pvc_name: Some(pvc.clone()),
                pvc_namespace: placement.workload_namespace.clone(),
                last_sync_time: placement.last_group_sync_time,
                scheduling_interval: placement.sync_interval.clone(),
            })
        })
        .collect()
}

/// Keep PVCs whose placement control belongs to one of `apps`
pub fn filter_pvc_data_using_apps(
    pvcs: &[ProtectedPvcData],
    apps: &[ProtectedApp],
) -> Vec<ProtectedPvcData> {
    pvcs.iter()
        .filter(|pvc| {
            apps.iter()
                .flat_map(|app| app.placement_info.iter())
                .any(|placement| {
                    placement.drpc_name.is_some()
                        && placement.drpc_name == pvc.drpc_name
                        && placement.drpc_namespace == pvc.drpc_namespace
                })
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplicationType, ClusterAppsEntry, DrpcStatus, PlacementInfo};

    fn placement(drpc: &str, subscriptions: &[&str], pvcs: &[&str]) -> PlacementInfo {
        PlacementInfo {
            drpc_name: Some(drpc.to_string()),
            drpc_namespace: Some("busybox".to_string()),
            workload_namespace: Some("busybox".to_string()),
            failover_cluster: Some("west".to_string()),
            preferred_cluster: Some("east".to_string()),
            status: Some(DrpcStatus::FailedOver),
            protected_pvcs: pvcs.iter().map(|p| p.to_string()).collect(),
            subscriptions: subscriptions.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn app(name: &str, placements: Vec<PlacementInfo>) -> ProtectedApp {
        ProtectedApp {
            app_name: name.to_string(),
            app_namespace: "busybox".to_string(),
            app_kind: "Application".to_string(),
            app_api_version: "app.k8s.io/v1beta1".to_string(),
            app_type: ApplicationType::Subscription,
            placement_info: placements,
        }
    }

    #[test]
    fn test_subscription_rows_follow_placement_order() {
        let app = app(
            "busybox",
            vec![
                placement("drpc-a", &["sub-1", "sub-2"], &[]),
                placement("drpc-b", &["sub-3"], &[]),
            ],
        );

        let rows = subscription_rows(&app);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["sub-1", "sub-2", "sub-3"]);
        assert_eq!(rows[0].activity, "FailedOver to west");
        assert_eq!(subscription_count(&app), 3);
    }

    #[test]
    fn test_find_protected_app() {
        let mut entry = ClusterAppsEntry::new(None);
        entry.protected_apps.push(app("busybox", vec![placement("drpc-a", &[], &[])]));
        let clusters = DrClusterAppsMap::from([("east".to_string(), entry)]);

        assert!(find_protected_app(&clusters, "east", "busybox", "busybox").is_some());
        assert!(find_protected_app(&clusters, "east", "busybox", "other").is_none());
        assert!(find_protected_app(&clusters, "west", "busybox", "busybox").is_none());
    }

    #[test]
    fn test_filter_pvc_data_using_apps() {
        let first = app("first", vec![placement("drpc-a", &[], &["data-a"])]);
        let second = app("second", vec![placement("drpc-b", &[], &["data-b", "logs-b"])]);
        let pvcs = protected_pvc_data([&first, &second]);
        assert_eq!(pvcs.len(), 3);

        let filtered = filter_pvc_data_using_apps(&pvcs, std::slice::from_ref(&second));
        let names: Vec<_> = filtered.iter().filter_map(|p| p.pvc_name.as_deref()).collect();
        assert_eq!(names, vec!["data-b", "logs-b"]);
        assert!(filtered.iter().all(|p| p.pvc_namespace.as_deref() == Some("busybox")));
    }
}
