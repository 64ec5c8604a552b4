//! Derived per-cluster application view
//!
//! These records are rebuilt from scratch on every computation cycle and
//! never mutated after being handed to a consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ApplicationType, DrpcStatus, ManagedCluster, ReplicationType};

/// Cluster name to its application entry. Keys are the DR clusters known
/// when the map was built.
pub type DrClusterAppsMap = BTreeMap<String, ClusterAppsEntry>;

/// One DR placement's detail for one deployment cluster of one application
///
/// Every field may be absent: absence means not yet known, or not
/// applicable to the replication type (e.g. no sync interval for metro DR).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drpc_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drpc_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload_namespace: Option<String>,
    #[serde(default)]
    pub replication_type: ReplicationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_cluster_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failover_cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_group_sync_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DrpcStatus>,
    #[serde(default)]
    pub protected_pvcs: Vec<String>,
    /// Subscription names of the group; empty for ApplicationSets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscriptions: Vec<String>,
}

/// One logical application under DR protection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedApp {
    pub app_name: String,
    pub app_namespace: String,
    pub app_kind: String,
    #[serde(rename = "appAPIVersion")]
    pub app_api_version: String,
    pub app_type: ApplicationType,
    /// One entry per deployment-cluster/placement-control pairing, in the
    /// order the source resources were visited
    pub placement_info: Vec<PlacementInfo>,
}

impl ProtectedApp {
    pub fn is(&self, name: &str, namespace: &str) -> bool {
        self.app_name == name && self.app_namespace == namespace
    }
}

/// Per managed cluster totals and protected applications
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAppsEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_cluster: Option<ManagedCluster>,
    /// Distinct workloads deployed here, protected or not
    pub total_app_count: usize,
    pub protected_apps: Vec<ProtectedApp>,
}

impl ClusterAppsEntry {
    pub fn new(managed_cluster: Option<ManagedCluster>) -> Self {
        Self {
            managed_cluster,
            total_app_count: 0,
            protected_apps: Vec::new(),
        }
    }
}

/// A protected PVC with the DR context it replicates under
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedPvcData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drpc_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drpc_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvc_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvc_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_interval: Option<String>,
}
