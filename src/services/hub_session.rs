//! Live hub session
//!
//! `HubSession` wraps a Kubernetes client, the resource watchers and the
//! `HubState` they feed into one object the `watch` command drives.

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::watcher::{HubSnapshot, HubState, ResourceWatcher, WatchEvent};

/// A session connected to one hub cluster
///
/// # Example
///
/// ```rust,no_run
/// use drlens::services::{DashboardPipeline, HubSession};
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut session = HubSession::connect(None, None).await?;
/// let mut pipeline = DashboardPipeline::new();
///
/// while session.recv_and_apply().await.is_some() {
///     let view = pipeline.compute(&session.snapshot());
///     println!("{}", view.state);
/// }
/// # Ok(())
/// # }
/// ```
pub struct HubSession {
    context: String,
    namespace: Option<String>,
    state: HubState,
    watcher: ResourceWatcher,
    event_rx: mpsc::UnboundedReceiver<WatchEvent>,
}

impl HubSession {
    /// Connect to the hub and start one watcher per resource kind
    ///
    /// `context` of `None` uses the kubeconfig's current context;
    /// `namespace` of `None` watches namespaced kinds in all namespaces.
    pub async fn connect(context: Option<&str>, namespace: Option<String>) -> Result<Self> {
        let client = crate::kube::connect(context)
            .await
            .context("Failed to create Kubernetes client")?;
        let context = crate::kube::resolve_context_name(context).await;

        let (mut watcher, event_rx) = ResourceWatcher::new(client, namespace.clone());
        watcher
            .watch_all()
            .context("Failed to start resource watchers")?;

        tracing::info!(
            "Watching hub {} ({})",
            context,
            namespace.as_deref().unwrap_or("all namespaces")
        );

        Ok(Self {
            context,
            namespace,
            state: HubState::new(),
            watcher,
            event_rx,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn state(&self) -> &HubState {
        &self.state
    }

    pub fn snapshot(&self) -> HubSnapshot {
        self.state.snapshot()
    }

    /// Wait for the next event, apply it and any already queued behind it
    ///
    /// Returns whether the state changed, or `None` if the event channel
    /// is closed.
    pub async fn recv_and_apply(&mut self) -> Option<bool> {
        let event = self.event_rx.recv().await?;
        let mut changed = self.state.apply(event);
        changed |= self.drain_events() > 0;
        Some(changed)
    }

    /// Apply every queued event without waiting
    ///
    /// Returns the number of events that changed the state.
    pub fn drain_events(&mut self) -> usize {
        let mut changed = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            if self.state.apply(event) {
                changed += 1;
            }
        }
        changed
    }

    pub fn stop(&mut self) {
        self.watcher.stop();
    }
}
