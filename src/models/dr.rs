//! Ramen disaster-recovery resources
//!
//! Only the fields drlens reads are modelled; everything else is ignored
//! on deserialization.

use chrono::{DateTime, Utc};
use kube::CustomResource;
use serde::{Deserialize, Serialize};

use super::DrpcStatus;

/// A cluster participating in DR replication
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "ramendr.openshift.io",
    version = "v1alpha1",
    kind = "DRCluster",
    plural = "drclusters",
    root = "DrCluster",
    schema = "disabled",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct DrClusterSpec {
    /// Region of the cluster; clusters sharing a region replicate synchronously
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_profile_name: Option<String>,
}

/// Replication policy spanning a set of DR clusters
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "ramendr.openshift.io",
    version = "v1alpha1",
    kind = "DRPolicy",
    plural = "drpolicies",
    root = "DrPolicy",
    schema = "disabled",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct DrPolicySpec {
    /// Names of the DRCluster objects this policy replicates across
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dr_clusters: Vec<String>,

    /// Replication schedule, e.g. "5m". Empty for metro (sync) policies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduling_interval: Option<String>,
}

/// Ties an application's placement to a DR policy
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "ramendr.openshift.io",
    version = "v1alpha1",
    kind = "DRPlacementControl",
    plural = "drplacementcontrols",
    root = "DrPlacementControl",
    namespaced,
    schema = "disabled",
    status = "DrPlacementControlStatus",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct DrPlacementControlSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_ref: Option<ObjectRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dr_policy_ref: Option<ObjectRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_cluster: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failover_cluster: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<DrAction>,
}

/// Reference to another object by kind/name (namespace optional)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Action requested on a DRPC
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrAction {
    Failover,
    Relocate,
    #[serde(other)]
    Unknown,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DrPlacementControlStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<DrpcStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_group_sync_time: Option<DateTime<Utc>>,

    /// Cluster Ramen last decided the workload should run on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_decision: Option<PreferredDecision>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_conditions: Option<ResourceConditions>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferredDecision {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_namespace: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_meta: Option<ResourceMeta>,
}

/// Metadata of the VolumeReplicationGroup backing a DRPC
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ResourceMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// PVC names in replication scope (the field is all lowercase on the wire)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protectedpvcs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::ResourceExt;

    #[test]
    fn test_drpc_deserialization_with_partial_status() {
        let json = serde_json::json!({
            "apiVersion": "ramendr.openshift.io/v1alpha1",
            "kind": "DRPlacementControl",
            "metadata": { "name": "busybox-drpc", "namespace": "busybox" },
            "spec": {
                "placementRef": { "kind": "Placement", "name": "busybox-placement" },
                "drPolicyRef": { "name": "odr-policy-5m" },
                "preferredCluster": "east"
            },
            "status": {
                "phase": "Deployed",
                "lastGroupSyncTime": "2024-05-01T10:00:00Z",
                "resourceConditions": {
                    "resourceMeta": { "protectedpvcs": ["data-0", "data-1"] }
                }
            }
        });

        let drpc: DrPlacementControl = serde_json::from_value(json).unwrap();
        assert_eq!(drpc.name_any(), "busybox-drpc");
        assert_eq!(drpc.spec.preferred_cluster.as_deref(), Some("east"));
        assert!(drpc.spec.failover_cluster.is_none());

        let status = drpc.status.unwrap();
        assert_eq!(status.phase, Some(DrpcStatus::Deployed));
        assert!(status.last_group_sync_time.is_some());
        assert_eq!(
            status.resource_conditions.unwrap().resource_meta.unwrap().protectedpvcs,
            vec!["data-0", "data-1"]
        );
    }

    #[test]
    fn test_dr_policy_without_interval() {
        let json = serde_json::json!({
            "apiVersion": "ramendr.openshift.io/v1alpha1",
            "kind": "DRPolicy",
            "metadata": { "name": "metro" },
            "spec": { "drClusters": ["east", "west"] }
        });

        let policy: DrPolicy = serde_json::from_value(json).unwrap();
        assert_eq!(policy.spec.dr_clusters, vec!["east", "west"]);
        assert!(policy.spec.scheduling_interval.is_none());
    }
}
