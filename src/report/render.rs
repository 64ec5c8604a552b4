//! Text, JSON and YAML renderers

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{placement_activity, subscription_count, subscription_rows};
use crate::config::OutputFormat;
use crate::models::{DrClusterAppsMap, ProtectedApp, ProtectedPvcData};

const COLUMN_GAP: &str = "   ";

/// Per-cluster line of the summary report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub cluster: String,
    /// Managed cluster availability; unknown when not yet reported
    pub available: Option<bool>,
    pub total_app_count: usize,
    pub protected_app_count: usize,
    pub protected_apps: Vec<ProtectedApp>,
}

/// Summaries in cluster name order
///
/// Without `show_unprotected`, clusters with no protected application are
/// left out.
pub fn cluster_summaries(clusters: &DrClusterAppsMap, show_unprotected: bool) -> Vec<ClusterSummary> {
    clusters
        .iter()
        .filter(|(_, entry)| show_unprotected || !entry.protected_apps.is_empty())
        .map(|(name, entry)| ClusterSummary {
            cluster: name.clone(),
            available: entry.managed_cluster.as_ref().and_then(|mc| mc.is_available()),
            total_app_count: entry.total_app_count,
            protected_app_count: entry.protected_apps.len(),
            protected_apps: entry.protected_apps.clone(),
        })
        .collect()
}

/// Serialize any report value in a machine readable format
pub fn render_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to serialize report to JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).context("Failed to serialize report to YAML")
        }
        OutputFormat::Table => Err(anyhow::anyhow!("table output is not a structured format")),
    }
}

/// Render the cluster summary report
pub fn render_summary(summaries: &[ClusterSummary], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_summary_table(summaries)),
        _ => render_structured(&summaries, format),
    }
}

/// Render one protected application's detail
pub fn render_app(cluster: &str, app: &ProtectedApp, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_app_table(cluster, app)),
        _ => render_structured(app, format),
    }
}

/// Render a protected PVC listing
pub fn render_pvcs(pvcs: &[ProtectedPvcData], format: OutputFormat) -> Result<String> {
    if format != OutputFormat::Table {
        return render_structured(&pvcs, format);
    }
    if pvcs.is_empty() {
        return Ok("No protected PVCs found\n".to_string());
    }

    let rows: Vec<Vec<String>> = pvcs
        .iter()
        .map(|pvc| {
            vec![
                optional(pvc.pvc_namespace.as_deref()),
                optional(pvc.pvc_name.as_deref()),
                optional(pvc.drpc_name.as_deref()),
                optional(pvc.scheduling_interval.as_deref()),
                sync_time(pvc.last_sync_time),
            ]
        })
        .collect();
    Ok(format_table(
        &["NAMESPACE", "PVC", "DRPC", "INTERVAL", "LAST SYNC"],
        &rows,
    ))
}

/// Cluster table, then a protected application table when there is any
pub fn render_summary_table(summaries: &[ClusterSummary]) -> String {
    if summaries.is_empty() {
        return "No DR clusters found\n".to_string();
    }

    let cluster_rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| {
            vec![
                s.cluster.clone(),
                availability(s.available).to_string(),
                s.total_app_count.to_string(),
                s.protected_app_count.to_string(),
            ]
        })
        .collect();
    let mut out = format_table(&["CLUSTER", "AVAILABLE", "APPS", "PROTECTED"], &cluster_rows);

    let app_rows: Vec<Vec<String>> = summaries
        .iter()
        .flat_map(|s| {
            s.protected_apps.iter().flat_map(move |app| {
                app.placement_info.iter().map(move |placement| {
                    vec![
                        s.cluster.clone(),
                        format!("{}/{}", app.app_namespace, app.app_name),
                        app.app_type.to_string(),
                        placement.replication_type.to_string(),
                        optional(placement.status),
                        placement_activity(placement),
                        sync_time(placement.last_group_sync_time),
                    ]
                })
            })
        })
        .collect();

    if !app_rows.is_empty() {
        out.push('\n');
        out.push_str(&format_table(
            &[
                "CLUSTER",
                "APPLICATION",
                "TYPE",
                "REPLICATION",
                "STATUS",
                "ACTIVITY",
                "LAST SYNC",
            ],
            &app_rows,
        ));
    }

    out
}

fn render_app_table(cluster: &str, app: &ProtectedApp) -> String {
    let mut out = format!(
        "Application: {}/{}\nType: {} ({} {})\nCluster: {}\n\n",
        app.app_namespace, app.app_name, app.app_type, app.app_api_version, app.app_kind, cluster
    );

    let placement_rows: Vec<Vec<String>> = app
        .placement_info
        .iter()
        .map(|p| {
            vec![
                optional(p.drpc_name.as_deref()),
                optional(p.deployment_cluster_name.as_deref()),
                p.replication_type.to_string(),
                optional(p.sync_interval.as_deref()),
                placement_activity(p),
                sync_time(p.last_group_sync_time),
                p.protected_pvcs.len().to_string(),
            ]
        })
        .collect();
    out.push_str(&format_table(
        &[
            "DRPC",
            "DEPLOYED TO",
            "REPLICATION",
            "INTERVAL",
            "ACTIVITY",
            "LAST SYNC",
            "PVCS",
        ],
        &placement_rows,
    ));

    if subscription_count(app) > 0 {
        let rows: Vec<Vec<String>> = subscription_rows(app)
            .into_iter()
            .map(|row| vec![row.name, row.activity, sync_time(row.last_sync_time)])
            .collect();
        out.push('\n');
        out.push_str(&format_table(&["SUBSCRIPTION", "ACTIVITY", "LAST SYNC"], &rows));
    }

    out
}

fn availability(available: Option<bool>) -> &'static str {
    match available {
        Some(true) => "True",
        Some(false) => "False",
        None => "Unknown",
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn sync_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Left aligned columns; the last column is not padded
fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    for cells in std::iter::once(&header_cells).chain(rows) {
        let mut line = String::new();
        for (idx, (cell, width)) in cells.iter().zip(&widths).enumerate() {
            if idx > 0 {
                line.push_str(COLUMN_GAP);
            }
            line.push_str(&format!("{:<width$}", cell, width = *width));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ApplicationType, ClusterAppsEntry, ClusterCondition, DrpcStatus, MANAGED_CLUSTER_AVAILABLE,
        ManagedCluster, ManagedClusterStatus, PlacementInfo, ReplicationType,
    };
    use chrono::TimeZone;

    fn sample_clusters() -> DrClusterAppsMap {
        let mut managed = ManagedCluster::new("east", Default::default());
        managed.status = Some(ManagedClusterStatus {
            conditions: vec![ClusterCondition {
                type_: MANAGED_CLUSTER_AVAILABLE.to_string(),
                status: "True".to_string(),
                message: None,
            }],
        });

        let mut east = ClusterAppsEntry::new(Some(managed));
        east.total_app_count = 2;
        east.protected_apps.push(ProtectedApp {
            app_name: "busybox".to_string(),
            app_namespace: "gitops".to_string(),
            app_kind: "ApplicationSet".to_string(),
            app_api_version: "argoproj.io/v1alpha1".to_string(),
            app_type: ApplicationType::AppSet,
            placement_info: vec![PlacementInfo {
                drpc_name: Some("busybox-drpc".to_string()),
                replication_type: ReplicationType::Async,
                deployment_cluster_name: Some("east".to_string()),
                preferred_cluster: Some("east".to_string()),
                status: Some(DrpcStatus::Relocated),
                last_group_sync_time: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).single(),
                ..Default::default()
            }],
        });

        DrClusterAppsMap::from([
            ("east".to_string(), east),
            ("west".to_string(), ClusterAppsEntry::new(None)),
        ])
    }

    #[test]
    fn test_summary_table() {
        let summaries = cluster_summaries(&sample_clusters(), true);
        insta::assert_snapshot!(render_summary_table(&summaries), @r"
CLUSTER   AVAILABLE   APPS   PROTECTED
east      True        2      1
west      Unknown     0      0

CLUSTER   APPLICATION      TYPE             REPLICATION   STATUS      ACTIVITY            LAST SYNC
east      gitops/busybox   ApplicationSet   async         Relocated   Relocated to east   2024-05-01T10:00:00Z
");
    }

    #[test]
    fn test_hide_unprotected_clusters() {
        let summaries = cluster_summaries(&sample_clusters(), false);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].cluster, "east");
        assert_eq!(summaries[0].available, Some(true));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(render_summary_table(&[]), "No DR clusters found\n");
    }

    #[test]
    fn test_json_summary_uses_camel_case() {
        let summaries = cluster_summaries(&sample_clusters(), true);
        let json = render_summary(&summaries, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["totalAppCount"], 2);
        assert_eq!(value[0]["protectedApps"][0]["appType"], "ApplicationSet");
        assert_eq!(value[1]["available"], serde_json::Value::Null);
    }

    #[test]
    fn test_pvc_table() {
        let pvcs = vec![ProtectedPvcData {
            drpc_name: Some("busybox-drpc".to_string()),
            pvc_name: Some("busybox-pvc".to_string()),
            pvc_namespace: Some("busybox".to_string()),
            scheduling_interval: Some("5m".to_string()),
            ..Default::default()
        }];
        insta::assert_snapshot!(render_pvcs(&pvcs, OutputFormat::Table).unwrap(), @r"
NAMESPACE   PVC           DRPC           INTERVAL   LAST SYNC
busybox     busybox-pvc   busybox-drpc   5m         -
");
        assert_eq!(
            render_pvcs(&[], OutputFormat::Table).unwrap(),
            "No protected PVCs found\n"
        );
    }

    #[test]
    fn test_app_detail_lists_placements() {
        let clusters = sample_clusters();
        let app = &clusters["east"].protected_apps[0];
        let text = render_app("east", app, OutputFormat::Table).unwrap();
        assert!(text.starts_with("Application: gitops/busybox\n"));
        assert!(text.contains("busybox-drpc"));
        assert!(!text.contains("SUBSCRIPTION"));
    }
}
