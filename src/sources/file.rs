//! Bundle file source

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::SnapshotSource;
use crate::watcher::{HubResourceKind, HubState, resource_key};

/// Reads hub objects from a bundle file
///
/// The bundle is a multi-document YAML stream (JSON documents are valid
/// YAML). `kind: List` documents are flattened. Objects of kinds drlens
/// does not consume are ignored. Every kind is marked loaded afterwards,
/// so a kind absent from the bundle is loaded and empty.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotSource for FileSource {
    async fn load(&self, state: &HubState) -> Result<()> {
        tracing::debug!("Reading bundle: {:?}", self.path);

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read bundle: {:?}", self.path))?;

        let objects = parse_bundle(&content)
            .with_context(|| format!("Failed to parse bundle: {:?}", self.path))?;

        let mut by_kind: HashMap<HubResourceKind, Vec<(String, Value)>> = HashMap::new();
        for object in objects {
            let api_version = object["apiVersion"].as_str().unwrap_or_default();
            let kind_name = object["kind"].as_str().unwrap_or_default();
            let Some(kind) = HubResourceKind::from_type_meta(api_version, kind_name) else {
                tracing::debug!("Ignoring {} {} from bundle", api_version, kind_name);
                continue;
            };
            let name = object["metadata"]["name"].as_str().unwrap_or_default();
            let namespace = object["metadata"]["namespace"].as_str();
            let key = resource_key(namespace, name);
            by_kind.entry(kind).or_default().push((key, object));
        }

        for kind in HubResourceKind::ALL {
            let objects = by_kind.remove(&kind).unwrap_or_default();
            tracing::debug!("Loaded {} {} objects from bundle", objects.len(), kind);
            state.replace_all(kind, objects);
        }

        Ok(())
    }

    fn source_type(&self) -> &str {
        "file"
    }
}

/// Split a bundle into top-level objects, flattening `kind: List`
pub fn parse_bundle(content: &str) -> Result<Vec<Value>> {
    let mut objects = Vec::new();
    for (idx, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = serde_yaml::Value::deserialize(document)
            .with_context(|| format!("Invalid YAML in document {}", idx + 1))?;
        let value: Value = serde_json::to_value(value)
            .with_context(|| format!("Document {} is not representable as JSON", idx + 1))?;
        push_object(value, &mut objects);
    }
    Ok(objects)
}

fn push_object(value: Value, objects: &mut Vec<Value>) {
    match value {
        Value::Null => {}
        Value::Object(ref map) if map.get("kind").and_then(Value::as_str) == Some("List") => {
            if let Some(Value::Array(items)) = map.get("items") {
                for item in items.clone() {
                    push_object(item, objects);
                }
            }
        }
        Value::Object(_) => objects.push(value),
        other => tracing::debug!("Ignoring non-object bundle document: {}", other),
    }
}
