//! End-to-end pipeline tests: bundle -> state -> view -> report

use std::sync::Arc;

use drlens::LoadError;
use drlens::config::OutputFormat;
use drlens::models::{ApplicationType, ReplicationType};
use drlens::report::{cluster_summaries, find_protected_app, placement_activity, render_summary};
use drlens::services::{DashboardPipeline, PipelineState, compute_view};
use drlens::sources::{FileSource, SnapshotSource};
use drlens::utils::DefaultResolver;
use drlens::watcher::{HubResourceKind, HubState};

const BUNDLE: &str = include_str!("fixtures/hub_bundle.yaml");

async fn load_bundle() -> HubState {
    let file = write_bundle();
    let state = HubState::new();
    FileSource::new(file.path()).load(&state).await.unwrap();
    state
}

#[tokio::test]
async fn test_view_over_bundle() {
    let state = load_bundle().await;
    let view = compute_view(&state.snapshot(), &DefaultResolver);

    assert_eq!(view.state, PipelineState::Ready);
    assert_eq!(view.clusters.len(), 2);

    let east = &view.clusters["east"];
    assert_eq!(east.total_app_count, 2);
    let apps: Vec<(&str, ApplicationType)> = east
        .protected_apps
        .iter()
        .map(|a| (a.app_name.as_str(), a.app_type))
        .collect();
    assert_eq!(
        apps,
        vec![
            ("busybox-appset", ApplicationType::AppSet),
            ("app1", ApplicationType::Subscription),
        ]
    );
    assert_eq!(
        east.managed_cluster.as_ref().and_then(|c| c.is_available()),
        Some(true)
    );

    let west = &view.clusters["west"];
    assert_eq!(west.total_app_count, 1);
    assert!(west.protected_apps.is_empty());
}

#[tokio::test]
async fn test_protected_app_detail() {
    let state = load_bundle().await;
    let view = compute_view(&state.snapshot(), &DefaultResolver);

    let app_set = find_protected_app(&view.clusters, "east", "busybox-appset", "openshift-gitops")
        .unwrap();
    let info = &app_set.placement_info[0];
    assert_eq!(info.workload_namespace.as_deref(), Some("busybox-workload"));
    assert_eq!(info.replication_type, ReplicationType::Async);
    assert_eq!(info.sync_interval.as_deref(), Some("5m"));
    assert_eq!(info.protected_pvcs, vec!["busybox-pvc"]);
    assert!(info.last_group_sync_time.is_some());
    assert_eq!(placement_activity(info), "Unknown");

    let app1 = find_protected_app(&view.clusters, "east", "app1", "nsA").unwrap();
    assert_eq!(app1.placement_info.len(), 1);
    assert_eq!(app1.placement_info[0].subscriptions, vec!["app1-sub-a"]);
    assert_eq!(app1.placement_info[0].failover_cluster.as_deref(), Some("west"));

    assert!(find_protected_app(&view.clusters, "west", "app1", "nsA").is_none());
}

#[tokio::test]
async fn test_summary_report_filters_unprotected_clusters() {
    let state = load_bundle().await;
    let view = compute_view(&state.snapshot(), &DefaultResolver);

    let all = cluster_summaries(&view.clusters, true);
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].available, Some(false));

    let protected_only = cluster_summaries(&view.clusters, false);
    assert_eq!(protected_only.len(), 1);
    assert_eq!(protected_only[0].cluster, "east");
    assert_eq!(protected_only[0].protected_app_count, 2);

    let json = render_summary(&protected_only, OutputFormat::Json).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["totalAppCount"], 2);
    assert_eq!(parsed[0]["protectedApps"][1]["appName"], "app1");
    assert_eq!(
        parsed[0]["protectedApps"][0]["placementInfo"][0]["drpcName"],
        "busybox-appset-drpc"
    );
}

#[tokio::test]
async fn test_pipeline_follows_state_changes() {
    let state = load_bundle().await;
    let mut pipeline = DashboardPipeline::new();
    assert_eq!(pipeline.state(), PipelineState::Idle);

    let first = pipeline.compute(&state.snapshot());
    assert!(first.is_ready());

    // Same generation: the memoized view is handed back
    let again = pipeline.compute(&state.snapshot());
    assert!(Arc::ptr_eq(&first, &again));

    state.mark_failed(
        HubResourceKind::ManagedCluster,
        LoadError::watch("ManagedCluster", "forbidden"),
    );
    let failed = pipeline.compute(&state.snapshot());
    assert_eq!(
        failed.state,
        PipelineState::Failed(LoadError::watch("ManagedCluster", "forbidden"))
    );
    assert!(failed.clusters.is_empty());

    // A fresh load clears the failure
    let file = write_bundle();
    FileSource::new(file.path()).load(&state).await.unwrap();
    let recovered = pipeline.compute(&state.snapshot());
    assert!(recovered.is_ready());
    assert_eq!(recovered.clusters, first.clusters);
}

#[test]
fn test_pipeline_reports_loading_until_every_kind_settles() {
    let state = HubState::new();
    for kind in HubResourceKind::ALL {
        if kind != HubResourceKind::Subscription {
            state.replace_all(kind, Vec::new());
        }
    }

    let mut pipeline = DashboardPipeline::new();
    let view = pipeline.compute(&state.snapshot());
    assert_eq!(view.state, PipelineState::Loading);
    assert!(view.clusters.is_empty());

    state.replace_all(HubResourceKind::Subscription, Vec::new());
    let view = pipeline.compute(&state.snapshot());
    assert!(view.is_ready());
    assert!(view.clusters.is_empty());
}

fn write_bundle() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, BUNDLE.as_bytes()).unwrap();
    file
}
