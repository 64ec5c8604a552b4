//! Snapshot sources
//!
//! One-shot loaders that fill a `HubState` with every hub resource kind:
//! - `FileSource`: a multi-document YAML/JSON bundle on disk
//! - `KubeListSource`: a list call per kind against the hub API server

mod file;
mod kube_list;

pub use file::FileSource;
pub use kube_list::KubeListSource;

use anyhow::Result;
use async_trait::async_trait;

use crate::watcher::HubState;

/// Loader for a complete hub snapshot
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Populate `state`. Every kind ends up either loaded or failed.
    async fn load(&self, state: &HubState) -> Result<()>;

    /// Short description for logs
    fn source_type(&self) -> &str;
}
