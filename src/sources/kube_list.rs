//! Live list source

use anyhow::Result;
use async_trait::async_trait;
use kube::api::ListParams;
use kube::{Api, Client};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::SnapshotSource;
use crate::error::LoadError;
use crate::models::{
    Application, ApplicationSet, DrCluster, DrPlacementControl, DrPolicy, ManagedCluster,
    PlacementDecision, Subscription,
};
use crate::watcher::{HubResource, HubState, encode};

/// Lists every hub resource kind once through the API server
///
/// A kind whose list call fails is marked failed in the state; the load
/// itself still succeeds so the failure surfaces through the view.
pub struct KubeListSource {
    client: Client,
    namespace: Option<String>,
}

impl KubeListSource {
    pub fn new(client: Client, namespace: Option<String>) -> Self {
        Self { client, namespace }
    }

    async fn list_into<R>(&self, state: &HubState)
    where
        R: HubResource
            + kube::Resource<DynamicType = (), Scope = kube::core::NamespaceResourceScope>
            + Clone
            + DeserializeOwned
            + Serialize
            + std::fmt::Debug
            + Send
            + Sync
            + 'static,
    {
        let api: Api<R> = match self.namespace.as_deref() {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        store_list(api, state).await;
    }

    async fn list_cluster_scoped_into<R>(&self, state: &HubState)
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
        let api: Api<R> = Api::all(self.client.clone());
        store_list(api, state).await;
    }
}

async fn store_list<R>(api: Api<R>, state: &HubState)
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
    match api.list(&ListParams::default()).await {
        Ok(list) => {
            tracing::debug!("Listed {} {} objects", list.items.len(), kind);
            let objects = list
                .items
                .iter()
                .filter_map(|obj| encode(kind, obj))
                .collect();
            state.replace_all(kind, objects);
        }
        Err(e) => {
            tracing::warn!("Failed to list {}: {}", kind, e);
            state.mark_failed(kind, LoadError::source(format!("listing {}: {}", kind, e)));
        }
    }
}

#[async_trait]
impl SnapshotSource for KubeListSource {
    async fn load(&self, state: &HubState) -> Result<()> {
        self.list_cluster_scoped_into::<DrCluster>(state).await;
        self.list_cluster_scoped_into::<DrPolicy>(state).await;
        self.list_into::<DrPlacementControl>(state).await;
        self.list_cluster_scoped_into::<ManagedCluster>(state).await;
        self.list_into::<PlacementDecision>(state).await;
        self.list_into::<ApplicationSet>(state).await;
        self.list_into::<Application>(state).await;
        self.list_into::<Subscription>(state).await;
        Ok(())
    }

    fn source_type(&self) -> &str {
        "kubernetes"
    }
}
