//! Watcher module
//!
//! Resource watch adapter: one kube-rs watcher task per hub resource kind,
//! forwarding events over a channel to be applied to a `HubState`.

mod resource;
mod snapshot;
mod state;

pub use resource::*;
pub use snapshot::*;
pub use state::*;

use std::fmt::Display;

use anyhow::Result;
use futures::StreamExt;
use kube::runtime::{WatchStreamExt, watcher};
use kube::{Api, Client, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::{
    Application, ApplicationSet, DrCluster, DrPlacementControl, DrPolicy, ManagedCluster,
    PlacementDecision, Subscription,
};

/// Event emitted by resource watchers
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// A (re)list started; following `Listed` events replace the kind's objects
    Restarting(HubResourceKind),
    /// Object received as part of a (re)list
    Listed(HubResourceKind, String, serde_json::Value),
    /// The (re)list completed; the kind is loaded
    Synced(HubResourceKind),
    /// Object was added or updated
    Applied(HubResourceKind, String, serde_json::Value),
    /// Object was deleted
    Deleted(HubResourceKind, String),
    /// Watch error occurred
    Error(HubResourceKind, String),
}

/// Manages one watcher task per hub resource kind
pub struct ResourceWatcher {
    client: Client,
    namespace: Option<String>,
    event_tx: mpsc::UnboundedSender<WatchEvent>,
    handles: Vec<JoinHandle<()>>,
}

impl ResourceWatcher {
    /// Create a new ResourceWatcher
    ///
    /// When `namespace` is set, namespaced kinds are restricted to it;
    /// cluster-scoped kinds (DRCluster, DRPolicy, ManagedCluster) are always
    /// watched cluster-wide.
    pub fn new(
        client: Client,
        namespace: Option<String>,
    ) -> (Self, mpsc::UnboundedReceiver<WatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                client,
                namespace,
                event_tx: tx,
                handles: Vec::new(),
            },
            rx,
        )
    }

    /// Start watching a specific resource type
    pub fn watch<R>(&mut self) -> Result<()>
    where
        R: HubResource
            + kube::Resource<DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Serialize
            + std::fmt::Debug
            + Send
            + Sync
            + 'static,
    {
        let kind = R::hub_kind();
        let api: Api<R> = Api::all(self.client.clone());
        let mut config = watcher::Config::default();
        if let Some(ns) = self.namespace.as_deref().filter(|_| kind.is_namespaced()) {
            config = config.fields(&format!("metadata.namespace={}", ns));
        }
        let event_tx = self.event_tx.clone();

        let handle = tokio::spawn(async move {
            // The backoff keeps retrying a failing watch; errors still pass
            // through so the store reports them until the next sync.
            let mut w = Box::pin(watcher(api, config).default_backoff());

            while let Some(event) = w.next().await {
                let Some(event) = translate(kind, event) else {
                    continue;
                };
                // Receiver gone: nobody is consuming this view anymore
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        self.handles.push(handle);
        Ok(())
    }

    /// Start watching every kind the DR application view depends on
    pub fn watch_all(&mut self) -> Result<()> {
        // Ramen DR resources
        self.watch::<DrCluster>()?;
        self.watch::<DrPolicy>()?;
        self.watch::<DrPlacementControl>()?;

        // OCM inventory and placement
        self.watch::<ManagedCluster>()?;
        self.watch::<PlacementDecision>()?;

        // Workloads
        self.watch::<ApplicationSet>()?;
        self.watch::<Application>()?;
        self.watch::<Subscription>()?;

        Ok(())
    }

    /// Abort all watcher tasks
    pub fn stop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
        self.handles.clear();
    }
}

impl Drop for ResourceWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Map one raw watcher item to the event applied to the state store.
/// Returns `None` for objects that cannot be serialized.
fn translate<R, E>(kind: HubResourceKind, event: Result<watcher::Event<R>, E>) -> Option<WatchEvent>
where
    R: kube::Resource + Serialize,
    E: Display,
{
    match event {
        Ok(watcher::Event::Init) => Some(WatchEvent::Restarting(kind)),
        Ok(watcher::Event::InitApply(obj)) => {
            let (key, value) = encode(kind, &obj)?;
            Some(WatchEvent::Listed(kind, key, value))
        }
        Ok(watcher::Event::InitDone) => {
            tracing::debug!("{} watcher synced", kind);
            Some(WatchEvent::Synced(kind))
        }
        Ok(watcher::Event::Apply(obj)) => {
            let (key, value) = encode(kind, &obj)?;
            Some(WatchEvent::Applied(kind, key, value))
        }
        Ok(watcher::Event::Delete(obj)) => {
            let key = resource_key(obj.namespace().as_deref(), &obj.name_any());
            Some(WatchEvent::Deleted(kind, key))
        }
        Err(e) => {
            tracing::warn!("{} watcher error, retrying: {}", kind, e);
            Some(WatchEvent::Error(kind, e.to_string()))
        }
    }
}

/// Serialize an object for the state store under its namespaced key
pub(crate) fn encode<R: kube::Resource + Serialize>(
    kind: HubResourceKind,
    obj: &R,
) -> Option<(String, serde_json::Value)> {
    let key = resource_key(obj.namespace().as_deref(), &obj.name_any());
    match serde_json::to_value(obj) {
        Ok(value) => Some((key, value)),
        Err(e) => {
            tracing::warn!("Skipping {} {}: failed to serialize: {}", kind, key, e);
            None
        }
    }
}
