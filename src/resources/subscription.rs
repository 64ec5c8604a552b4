//! Subscription joins
//!
//! An `app.k8s.io` Application lists Subscription components through its
//! label selector. Subscriptions sharing a placement form one group; each
//! group may be protected by its own placement control.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::ResourceExt;
use std::collections::BTreeMap;

use super::{DisasterRecoveryResources, find_placement_decision};
use crate::constants::{DEFAULT_PLACEMENT_KIND, HOSTING_SUBSCRIPTION_ANNOTATION};
use crate::models::{
    Application, DrCluster, DrPlacementControl, DrPolicy, PlacementDecision, PlacementRef,
    Subscription,
};
use crate::watcher::{HubSnapshot, LoadStatus, WatchResult};

/// DR wiring of one subscription group
#[derive(Debug, Clone, PartialEq)]
pub struct DrInfo {
    pub dr_placement_control: DrPlacementControl,
    pub dr_policy: Option<DrPolicy>,
    pub dr_clusters: Vec<DrCluster>,
}

/// Subscriptions of one application that share a placement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionGroup {
    pub subscriptions: Vec<Subscription>,
    pub placement_decision: Option<PlacementDecision>,
    pub dr_info: Option<DrInfo>,
}

impl SubscriptionGroup {
    pub fn subscription_names(&self) -> Vec<String> {
        self.subscriptions.iter().map(|s| s.name_any()).collect()
    }
}

/// A subscription-based application with its groups
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionResource {
    pub application: Application,
    pub subscription_group_info: Vec<SubscriptionGroup>,
}

/// Join every subscription-based Application of a snapshot with its groups
///
/// Groups keep the order their first subscription appears in. Hub-side
/// copies of subscriptions (hosting-subscription annotation) and
/// subscriptions without an OCM Placement reference are skipped.
pub fn subscription_resources(
    snapshot: &HubSnapshot,
    dr: &DisasterRecoveryResources,
) -> WatchResult<Vec<SubscriptionResource>> {
    let status = LoadStatus::combine([
        snapshot.applications.status(),
        snapshot.subscriptions.status(),
        snapshot.placement_decisions.status(),
    ]);
    WatchResult::gated(status, || {
        snapshot
            .applications
            .data
            .iter()
            .filter(|app| app.has_subscription_components())
            .filter_map(|app| {
                let groups = group_subscriptions(
                    app,
                    &snapshot.subscriptions.data,
                    &snapshot.placement_decisions.data,
                    dr,
                );
                if groups.is_empty() {
                    return None;
                }
                Some(SubscriptionResource {
                    application: app.clone(),
                    subscription_group_info: groups,
                })
            })
            .collect()
    })
}

fn group_subscriptions(
    app: &Application,
    subscriptions: &[Subscription],
    decisions: &[PlacementDecision],
    dr: &DisasterRecoveryResources,
) -> Vec<SubscriptionGroup> {
    let namespace = app.namespace().unwrap_or_default();
    let Some(selector) = app.spec.selector.as_ref() else {
        return Vec::new();
    };

    let mut placements: Vec<PlacementRef> = Vec::new();
    let mut members: Vec<Vec<Subscription>> = Vec::new();

    for sub in subscriptions {
        if sub.namespace().as_deref() != Some(namespace.as_str())
            || sub.annotations().contains_key(HOSTING_SUBSCRIPTION_ANNOTATION)
            || !selector_matches(selector, sub.labels())
        {
            continue;
        }
        let Some(placement_ref) = sub
            .spec
            .placement
            .as_ref()
            .and_then(|p| p.placement_ref.as_ref())
        else {
            continue;
        };
        if placement_ref.kind.as_deref().unwrap_or(DEFAULT_PLACEMENT_KIND) != DEFAULT_PLACEMENT_KIND {
            tracing::debug!(
                "Skipping subscription {}/{}: placement kind {:?} is not supported",
                namespace,
                sub.name_any(),
                placement_ref.kind
            );
            continue;
        }

        match placements.iter().position(|p| p.name == placement_ref.name) {
            Some(idx) => members[idx].push(sub.clone()),
            None => {
                placements.push(placement_ref.clone());
                members.push(vec![sub.clone()]);
            }
        }
    }

    placements
        .into_iter()
        .zip(members)
        .map(|(placement_ref, subscriptions)| {
            let placement_decision =
                find_placement_decision(decisions, &namespace, &placement_ref.name).cloned();
            let dr_info = dr.find_drpc(&namespace, &placement_ref.name).map(|drpc| {
                let dr_policy = dr.find_policy(drpc).cloned();
                let dr_clusters = dr_policy
                    .as_ref()
                    .map(|policy| dr.clusters_for_policy(policy))
                    .unwrap_or_default();
                DrInfo {
                    dr_placement_control: drpc.clone(),
                    dr_policy,
                    dr_clusters,
                }
            });
            SubscriptionGroup {
                subscriptions,
                placement_decision,
                dr_info,
            }
        })
        .collect()
}

/// Kubernetes label selector semantics over an object's labels
pub fn selector_matches(selector: &LabelSelector, labels: &BTreeMap<String, String>) -> bool {
    let labels_match = selector
        .match_labels
        .iter()
        .flatten()
        .all(|(key, value)| labels.get(key) == Some(value));

    let expressions_match = selector.match_expressions.iter().flatten().all(|expr| {
        let values = expr.values.as_deref().unwrap_or_default();
        let current = labels.get(&expr.key);
        match expr.operator.as_str() {
            "In" => current.is_some_and(|v| values.contains(v)),
            "NotIn" => current.is_none_or(|v| !values.contains(v)),
            "Exists" => current.is_some(),
            "DoesNotExist" => current.is_none(),
            _ => false,
        }
    });

    labels_match && expressions_match
}
