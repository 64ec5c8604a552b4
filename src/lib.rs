//! drlens library
//!
//! Builds a per-cluster view of disaster-recovery protected applications
//! from the objects on an Open Cluster Management hub. Used by the
//! `drlens` binary and directly by the integration tests.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod kube;
pub mod models;
pub mod parsers;
pub mod report;
pub mod resources;
pub mod services;
pub mod sources;
pub mod utils;
pub mod watcher;

// Re-export commonly used types for convenience
pub use error::LoadError;
pub use parsers::{ParserInput, aggregate_results, parse_application_sets, parse_subscriptions};
pub use services::{DashboardPipeline, DashboardView, PipelineState, compute_view};
pub use utils::{DefaultResolver, DrResolver};
pub use watcher::{HubSnapshot, HubState, LoadStatus, WatchEvent, WatchResult, resource_key};
