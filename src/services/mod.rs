//! Service layer
//!
//! `DashboardPipeline` turns hub snapshots into the cross-cluster DR view;
//! `HubSession` keeps a live `HubState` fed from kube watchers.

pub mod dashboard;
pub mod hub_session;

pub use dashboard::{DashboardPipeline, DashboardView, PipelineState, compute_view};
pub use hub_session::HubSession;
