//! Hub resource kinds drlens watches
//!
//! Each typed model is tagged with its `HubResourceKind` through
//! `impl_hub_resource!`. The kind is what the state store is keyed on and
//! what watch errors are reported against.
//!
//! ## Adding a New Resource Type
//!
//! 1. Model it in `src/models/` (CustomResource derive, or a manual
//!    `kube::Resource` impl when the object has no spec)
//! 2. Add a `HubResourceKind` variant and its wire identity below
//! 3. Add `impl_hub_resource!` for the model
//! 4. Add the watch call in `ResourceWatcher::watch_all()` and a member
//!    to `HubSnapshot`

use crate::models::{
    Application, ApplicationSet, DrCluster, DrPlacementControl, DrPolicy, ManagedCluster,
    PlacementDecision, Subscription,
};
use std::fmt;

/// Resource classes that feed the DR application view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HubResourceKind {
    DrCluster,
    DrPolicy,
    DrPlacementControl,
    PlacementDecision,
    ManagedCluster,
    ApplicationSet,
    Application,
    Subscription,
}

impl HubResourceKind {
    pub const ALL: [HubResourceKind; 8] = [
        HubResourceKind::DrCluster,
        HubResourceKind::DrPolicy,
        HubResourceKind::DrPlacementControl,
        HubResourceKind::PlacementDecision,
        HubResourceKind::ManagedCluster,
        HubResourceKind::ApplicationSet,
        HubResourceKind::Application,
        HubResourceKind::Subscription,
    ];

    /// Kubernetes `kind` as it appears on the wire
    pub fn display_name(&self) -> &'static str {
        match self {
            HubResourceKind::DrCluster => "DRCluster",
            HubResourceKind::DrPolicy => "DRPolicy",
            HubResourceKind::DrPlacementControl => "DRPlacementControl",
            HubResourceKind::PlacementDecision => "PlacementDecision",
            HubResourceKind::ManagedCluster => "ManagedCluster",
            HubResourceKind::ApplicationSet => "ApplicationSet",
            HubResourceKind::Application => "Application",
            HubResourceKind::Subscription => "Subscription",
        }
    }

    pub fn api_group(&self) -> &'static str {
        match self {
            HubResourceKind::DrCluster
            | HubResourceKind::DrPolicy
            | HubResourceKind::DrPlacementControl => "ramendr.openshift.io",
            HubResourceKind::PlacementDecision | HubResourceKind::ManagedCluster => {
                "cluster.open-cluster-management.io"
            }
            HubResourceKind::ApplicationSet => "argoproj.io",
            HubResourceKind::Application => "app.k8s.io",
            HubResourceKind::Subscription => "apps.open-cluster-management.io",
        }
    }

    pub fn is_namespaced(&self) -> bool {
        !matches!(
            self,
            HubResourceKind::DrCluster | HubResourceKind::DrPolicy | HubResourceKind::ManagedCluster
        )
    }

    /// Identify a kind from an object's `apiVersion` and `kind`.
    ///
    /// The group must match: `Application` and `Subscription` are common
    /// kind names in other API groups.
    pub fn from_type_meta(api_version: &str, kind: &str) -> Option<Self> {
        let group = api_version.rsplit_once('/').map(|(g, _)| g).unwrap_or("");
        Self::ALL
            .into_iter()
            .find(|k| k.display_name() == kind && k.api_group() == group)
    }
}

impl fmt::Display for HubResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Typed model for one hub resource kind
pub trait HubResource {
    fn hub_kind() -> HubResourceKind;
}

macro_rules! impl_hub_resource {
    ($type:ty, $kind:expr) => {
        impl HubResource for $type {
            fn hub_kind() -> HubResourceKind {
                $kind
            }
        }
    };
}

impl_hub_resource!(DrCluster, HubResourceKind::DrCluster);
impl_hub_resource!(DrPolicy, HubResourceKind::DrPolicy);
impl_hub_resource!(DrPlacementControl, HubResourceKind::DrPlacementControl);
impl_hub_resource!(PlacementDecision, HubResourceKind::PlacementDecision);
impl_hub_resource!(ManagedCluster, HubResourceKind::ManagedCluster);
impl_hub_resource!(ApplicationSet, HubResourceKind::ApplicationSet);
impl_hub_resource!(Application, HubResourceKind::Application);
impl_hub_resource!(Subscription, HubResourceKind::Subscription);

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    #[test]
    fn test_from_type_meta_requires_group() {
        assert_eq!(
            HubResourceKind::from_type_meta("app.k8s.io/v1beta1", "Application"),
            Some(HubResourceKind::Application)
        );
        // Argo CD Application shares the kind name but not the group
        assert_eq!(
            HubResourceKind::from_type_meta("argoproj.io/v1alpha1", "Application"),
            None
        );
        assert_eq!(HubResourceKind::from_type_meta("v1", "ConfigMap"), None);
    }

    #[test]
    fn test_kinds_match_models() {
        assert_eq!(
            DrPlacementControl::kind(&()),
            HubResourceKind::DrPlacementControl.display_name()
        );
        assert_eq!(
            PlacementDecision::group(&()),
            HubResourceKind::PlacementDecision.api_group()
        );
        assert_eq!(ManagedCluster::hub_kind(), HubResourceKind::ManagedCluster);
        assert!(!HubResourceKind::DrPolicy.is_namespaced());
        assert!(HubResourceKind::Subscription.is_namespaced());
    }
}
