//! Open Cluster Management inventory and placement objects

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::NamespaceResourceScope;
use kube::{CustomResource, Resource};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Condition type OCM sets once the managed cluster agent reports in
pub const MANAGED_CLUSTER_AVAILABLE: &str = "ManagedClusterConditionAvailable";

/// A cluster registered with the hub
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "cluster.open-cluster-management.io",
    version = "v1",
    kind = "ManagedCluster",
    plural = "managedclusters",
    schema = "disabled",
    status = "ManagedClusterStatus",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterSpec {
    #[serde(default)]
    pub hub_accepts_client: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedClusterStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ClusterCondition>,
}

/// Loosely-typed condition; OCM condition timestamps are not needed here
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ClusterCondition {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ManagedCluster {
    /// Availability as reported by the cluster's Available condition.
    /// `None` until the condition appears.
    pub fn is_available(&self) -> Option<bool> {
        self.status
            .as_ref()?
            .conditions
            .iter()
            .find(|c| c.type_ == MANAGED_CLUSTER_AVAILABLE)
            .map(|c| c.status == "True")
    }
}

/// Resolved outcome of a Placement: the concrete clusters selected
///
/// PlacementDecision carries no spec, so `kube::Resource` is implemented
/// by hand instead of through `CustomResource`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PlacementDecision {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PlacementDecisionStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PlacementDecisionStatus {
    #[serde(default)]
    pub decisions: Vec<ClusterDecision>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDecision {
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl PlacementDecision {
    pub fn new(name: &str, namespace: &str, clusters: &[&str]) -> Self {
        Self {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            status: Some(PlacementDecisionStatus {
                decisions: clusters
                    .iter()
                    .map(|c| ClusterDecision {
                        cluster_name: c.to_string(),
                        reason: None,
                    })
                    .collect(),
            }),
        }
    }

    /// Cluster names in decision order, empty names skipped
    pub fn cluster_names(&self) -> impl Iterator<Item = &str> {
        self.status
            .iter()
            .flat_map(|s| s.decisions.iter())
            .map(|d| d.cluster_name.as_str())
            .filter(|name| !name.is_empty())
    }
}

impl Resource for PlacementDecision {
    type DynamicType = ();
    type Scope = NamespaceResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        "PlacementDecision".into()
    }

    fn group(_: &()) -> Cow<'_, str> {
        "cluster.open-cluster-management.io".into()
    }

    fn version(_: &()) -> Cow<'_, str> {
        "v1beta1".into()
    }

    fn plural(_: &()) -> Cow<'_, str> {
        "placementdecisions".into()
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_decision_cluster_names_skip_empty() {
        let mut decision = PlacementDecision::new("app-decision-1", "app-ns", &["east", "west"]);
        if let Some(status) = decision.status.as_mut() {
            status.decisions.push(ClusterDecision::default());
        }

        let names: Vec<&str> = decision.cluster_names().collect();
        assert_eq!(names, vec!["east", "west"]);
    }

    #[test]
    fn test_placement_decision_without_status() {
        let json = serde_json::json!({
            "apiVersion": "cluster.open-cluster-management.io/v1beta1",
            "kind": "PlacementDecision",
            "metadata": { "name": "d", "namespace": "ns" }
        });
        let decision: PlacementDecision = serde_json::from_value(json).unwrap();
        assert_eq!(decision.cluster_names().count(), 0);
    }

    #[test]
    fn test_managed_cluster_availability() {
        let mut cluster = ManagedCluster::new("east", ManagedClusterSpec::default());
        assert_eq!(cluster.is_available(), None);

        cluster.status = Some(ManagedClusterStatus {
            conditions: vec![ClusterCondition {
                type_: MANAGED_CLUSTER_AVAILABLE.to_string(),
                status: "True".to_string(),
                message: None,
            }],
        });
        assert_eq!(cluster.is_available(), Some(true));
    }
}
