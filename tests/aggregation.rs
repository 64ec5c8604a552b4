//! Aggregator tests

use drlens::LoadError;
use drlens::models::{
    ApplicationType, ClusterAppsEntry, DrClusterAppsMap, ManagedCluster, ManagedClusterSpec,
    PlacementInfo, ProtectedApp,
};
use drlens::parsers::{aggregate, aggregate_results};
use drlens::watcher::WatchResult;

fn protected(name: &str, app_type: ApplicationType) -> ProtectedApp {
    ProtectedApp {
        app_name: name.to_string(),
        app_namespace: "busybox".to_string(),
        app_kind: match app_type {
            ApplicationType::AppSet => "ApplicationSet".to_string(),
            ApplicationType::Subscription => "Application".to_string(),
        },
        app_api_version: "v1".to_string(),
        app_type,
        placement_info: vec![PlacementInfo::default()],
    }
}

fn cluster_map(cluster: &str, total: usize, apps: Vec<ProtectedApp>) -> DrClusterAppsMap {
    DrClusterAppsMap::from([(
        cluster.to_string(),
        ClusterAppsEntry {
            managed_cluster: None,
            total_app_count: total,
            protected_apps: apps,
        },
    )])
}

#[test]
fn test_counts_add_and_apps_concatenate() {
    let app_sets = cluster_map(
        "east",
        3,
        vec![
            protected("busybox-appset", ApplicationType::AppSet),
            protected("nginx-appset", ApplicationType::AppSet),
        ],
    );
    let subscriptions = cluster_map(
        "east",
        5,
        vec![protected("busybox-sub", ApplicationType::Subscription)],
    );

    let merged = aggregate([app_sets, subscriptions]);
    let east = &merged["east"];
    assert_eq!(east.total_app_count, 8);

    let names: Vec<&str> = east.protected_apps.iter().map(|a| a.app_name.as_str()).collect();
    assert_eq!(names, vec!["busybox-appset", "nginx-appset", "busybox-sub"]);
}

#[test]
fn test_same_app_from_both_types_is_not_merged() {
    let merged = aggregate([
        cluster_map("east", 1, vec![protected("busybox", ApplicationType::AppSet)]),
        cluster_map("east", 1, vec![protected("busybox", ApplicationType::Subscription)]),
    ]);

    let east = &merged["east"];
    assert_eq!(east.total_app_count, 2);
    assert_eq!(east.protected_apps.len(), 2);
    assert_eq!(east.protected_apps[0].app_type, ApplicationType::AppSet);
    assert_eq!(east.protected_apps[1].app_type, ApplicationType::Subscription);
}

#[test]
fn test_aggregation_is_associative() {
    let a = cluster_map("east", 1, vec![protected("a", ApplicationType::AppSet)]);
    let b = cluster_map("east", 2, vec![protected("b", ApplicationType::Subscription)]);
    let mut c = cluster_map("west", 4, vec![]);
    c.extend(cluster_map("east", 1, vec![protected("c", ApplicationType::Subscription)]));

    let left = aggregate([aggregate([a.clone(), b.clone()]), c.clone()]);
    let right = aggregate([a, aggregate([b, c])]);
    assert_eq!(left, right);
    assert_eq!(left["east"].total_app_count, 4);
    assert_eq!(left["west"].total_app_count, 4);
}

#[test]
fn test_input_order_does_not_change_counts_or_apps() {
    let mut app_sets = cluster_map(
        "east",
        3,
        vec![
            protected("busybox-appset", ApplicationType::AppSet),
            protected("shared", ApplicationType::AppSet),
        ],
    );
    app_sets.extend(cluster_map("west", 1, vec![]));

    let mut subscriptions = cluster_map(
        "east",
        2,
        vec![protected("shared", ApplicationType::Subscription)],
    );
    subscriptions.extend(cluster_map(
        "north",
        4,
        vec![protected("nginx-sub", ApplicationType::Subscription)],
    ));
    // Only the subscription side knows the east managed cluster
    subscriptions.get_mut("east").unwrap().managed_cluster =
        Some(ManagedCluster::new("east", ManagedClusterSpec::default()));

    let forward = aggregate([app_sets.clone(), subscriptions.clone()]);
    let reverse = aggregate([subscriptions, app_sets]);

    let app_names = |map: &DrClusterAppsMap, cluster: &str| {
        let mut names: Vec<(String, ApplicationType)> = map[cluster]
            .protected_apps
            .iter()
            .map(|a| (a.app_name.clone(), a.app_type))
            .collect();
        names.sort_by(|a, b| (&a.0, a.1.to_string()).cmp(&(&b.0, b.1.to_string())));
        names
    };

    assert_eq!(
        forward.keys().collect::<Vec<_>>(),
        reverse.keys().collect::<Vec<_>>()
    );
    for cluster in ["east", "west", "north"] {
        assert_eq!(
            forward[cluster].total_app_count,
            reverse[cluster].total_app_count,
            "{}",
            cluster
        );
        assert_eq!(app_names(&forward, cluster), app_names(&reverse, cluster), "{}", cluster);
        assert_eq!(
            forward[cluster].managed_cluster,
            reverse[cluster].managed_cluster,
            "{}",
            cluster
        );
    }
    assert_eq!(forward["east"].total_app_count, 5);
    assert_eq!(app_names(&forward, "east").len(), 3);
    assert!(forward["east"].managed_cluster.is_some());
}

#[test]
fn test_empty_inputs() {
    assert!(aggregate(Vec::<DrClusterAppsMap>::new()).is_empty());

    let result = aggregate_results(Vec::<WatchResult<DrClusterAppsMap>>::new());
    assert!(result.is_ready());
    assert!(result.data.is_empty());
}

#[test]
fn test_results_gate_on_every_input() {
    let ready = WatchResult::ready(cluster_map("east", 3, vec![]));

    let pending = aggregate_results([ready.clone(), WatchResult::pending()]);
    assert!(!pending.loaded);
    assert!(pending.data.is_empty());

    let failed = aggregate_results([
        ready.clone(),
        WatchResult::failed(LoadError::watch("Subscription", "forbidden")),
        WatchResult::failed(LoadError::watch("ApplicationSet", "timeout")),
    ]);
    assert!(failed.loaded);
    assert!(failed.data.is_empty());
    assert_eq!(failed.error, Some(LoadError::watch("Subscription", "forbidden")));

    let merged = aggregate_results([ready.clone(), ready]);
    assert_eq!(merged.data["east"].total_app_count, 6);
}
