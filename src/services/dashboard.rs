//! Dashboard pipeline
//!
//! snapshot -> joins -> {ApplicationSet parser, Subscription parser} ->
//! aggregator. Each run starts from scratch; the pipeline only memoizes
//! the last view per snapshot generation.

use std::fmt;
use std::sync::Arc;

use crate::error::LoadError;
use crate::models::DrClusterAppsMap;
use crate::parsers::{ParserInput, aggregate_results, parse_application_sets, parse_subscriptions};
use crate::resources::{
    application_set_resources, disaster_recovery_resources, subscription_resources,
};
use crate::utils::{DefaultResolver, DrResolver};
use crate::watcher::{HubSnapshot, WatchResult};

/// Lifecycle of the derived view
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PipelineState {
    /// Nothing computed yet
    #[default]
    Idle,
    /// Some input has not finished loading
    Loading,
    Ready,
    Failed(LoadError),
}

impl PipelineState {
    fn from_result<T>(result: &WatchResult<T>) -> Self {
        match (&result.error, result.loaded) {
            (Some(error), _) => PipelineState::Failed(error.clone()),
            (None, true) => PipelineState::Ready,
            (None, false) => PipelineState::Loading,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "Idle"),
            PipelineState::Loading => write!(f, "Loading"),
            PipelineState::Ready => write!(f, "Ready"),
            PipelineState::Failed(error) => write!(f, "Failed: {}", error),
        }
    }
}

/// Output handed to consumers
///
/// `clusters` is only meaningful in `PipelineState::Ready`; it is empty
/// otherwise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    pub state: PipelineState,
    pub clusters: DrClusterAppsMap,
}

impl DashboardView {
    pub fn is_ready(&self) -> bool {
        self.state == PipelineState::Ready
    }
}

/// Run the whole pipeline over one snapshot
pub fn compute_view<R: DrResolver + ?Sized>(snapshot: &HubSnapshot, resolver: &R) -> DashboardView {
    let dr_resources = disaster_recovery_resources(snapshot);

    let app_set_input = ParserInput {
        resources: application_set_resources(snapshot, &dr_resources.data),
        dr_resources: dr_resources.clone(),
        managed_clusters: snapshot.managed_clusters.clone(),
    };
    let subscription_input = ParserInput {
        resources: subscription_resources(snapshot, &dr_resources.data),
        dr_resources,
        managed_clusters: snapshot.managed_clusters.clone(),
    };

    let result = aggregate_results([
        parse_application_sets(&app_set_input, resolver),
        parse_subscriptions(&subscription_input, resolver),
    ]);

    DashboardView {
        state: PipelineState::from_result(&result),
        clusters: result.data,
    }
}

/// Memoizing wrapper around `compute_view`
pub struct DashboardPipeline<R = DefaultResolver> {
    resolver: R,
    last: Option<(u64, Arc<DashboardView>)>,
}

impl Default for DashboardPipeline<DefaultResolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardPipeline<DefaultResolver> {
    pub fn new() -> Self {
        Self::with_resolver(DefaultResolver)
    }
}

impl<R: DrResolver> DashboardPipeline<R> {
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            last: None,
        }
    }

    /// View for a snapshot, reusing the previous one when the generation
    /// has not moved
    pub fn compute(&mut self, snapshot: &HubSnapshot) -> Arc<DashboardView> {
        if let Some((generation, view)) = &self.last {
            if *generation == snapshot.generation {
                return Arc::clone(view);
            }
        }

        let view = Arc::new(compute_view(snapshot, &self.resolver));
        tracing::debug!(
            "Computed view for generation {}: {} ({} clusters)",
            snapshot.generation,
            view.state,
            view.clusters.len()
        );
        self.last = Some((snapshot.generation, Arc::clone(&view)));
        view
    }

    /// State of the last computed view
    pub fn state(&self) -> PipelineState {
        self.last
            .as_ref()
            .map(|(_, view)| view.state.clone())
            .unwrap_or_default()
    }

    /// Drop the memoized view so the next `compute` runs again
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
