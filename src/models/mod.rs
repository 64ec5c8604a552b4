//! drlens model layer
//!
//! Typed views of the hub objects drlens consumes, plus the derived
//! per-cluster application map.
//!
//! Structure:
//! - `dr.rs` - Ramen DR resources (DRCluster, DRPolicy, DRPlacementControl)
//! - `ocm.rs` - Open Cluster Management inventory and placement objects
//! - `workloads.rs` - ApplicationSet, Application and Subscription workloads
//! - `dashboard.rs` - The derived DRClusterAppsMap and its records
//!
//! Every nested field is optional. Objects arrive from independent,
//! eventually-consistent watches and may be partially populated.

pub mod dashboard;
pub mod dr;
pub mod ocm;
pub mod workloads;

pub use dashboard::{
    ClusterAppsEntry, DrClusterAppsMap, PlacementInfo, ProtectedApp, ProtectedPvcData,
};
pub use dr::{
    DrAction, DrCluster, DrClusterSpec, DrPlacementControl, DrPlacementControlSpec,
    DrPlacementControlStatus, DrPolicy, DrPolicySpec, ObjectRef, PreferredDecision,
    ResourceConditions, ResourceMeta,
};
pub use ocm::{
    ClusterCondition, ClusterDecision, MANAGED_CLUSTER_AVAILABLE, ManagedCluster,
    ManagedClusterSpec, ManagedClusterStatus, PlacementDecision, PlacementDecisionStatus,
};
pub use workloads::{
    AppDestination, AppTemplate, AppTemplateSpec, Application, ApplicationSet,
    ApplicationSetGenerator, ApplicationSetSpec, ApplicationSpec, ClusterDecisionResource,
    GroupKind, PlacementRef, Subscription, SubscriptionPlacement, SubscriptionSpec,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Replication mode derived from the DR cluster set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplicationType {
    /// Synchronous (metro) replication, all DR clusters in one region
    Sync,
    /// Asynchronous (regional) replication
    Async,
    #[default]
    Unknown,
}

impl fmt::Display for ReplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicationType::Sync => write!(f, "sync"),
            ReplicationType::Async => write!(f, "async"),
            ReplicationType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Deployment mechanism of a protected workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationType {
    #[serde(rename = "ApplicationSet")]
    AppSet,
    Subscription,
}

impl fmt::Display for ApplicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationType::AppSet => write!(f, "ApplicationSet"),
            ApplicationType::Subscription => write!(f, "Subscription"),
        }
    }
}

/// Phase reported in `DRPlacementControl.status.phase`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrpcStatus {
    Initiating,
    Deploying,
    Deployed,
    FailingOver,
    FailedOver,
    Relocating,
    Relocated,
    WaitForUser,
    Deleting,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for DrpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrpcStatus::Initiating => "Initiating",
            DrpcStatus::Deploying => "Deploying",
            DrpcStatus::Deployed => "Deployed",
            DrpcStatus::FailingOver => "FailingOver",
            DrpcStatus::FailedOver => "FailedOver",
            DrpcStatus::Relocating => "Relocating",
            DrpcStatus::Relocated => "Relocated",
            DrpcStatus::WaitForUser => "WaitForUser",
            DrpcStatus::Deleting => "Deleting",
            DrpcStatus::Unknown => "Unknown",
        };
        write!(f, "{}", s)
    }
}
