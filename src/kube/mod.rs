//! Kubernetes client module
//!
//! Connects to the hub cluster's API server. Proxy settings come from the
//! standard `HTTP_PROXY` / `HTTPS_PROXY` / `NO_PROXY` environment
//! variables through kube-rs.

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Initialize a client with the default kubeconfig loading strategy
///
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer()
        .await
        .context("Failed to infer Kubernetes configuration")?;
    tracing::debug!("Connecting to {}", config.cluster_url);
    let client = Client::try_from(config)?;
    Ok(client)
}

/// Initialize a client for a named kubeconfig context
pub async fn create_client_for_context(context: &str) -> Result<Client> {
    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };
    let config = Config::from_kubeconfig(&options)
        .await
        .with_context(|| format!("Failed to load kubeconfig context '{}'", context))?;
    tracing::debug!("Connecting to {} (context {})", config.cluster_url, context);
    let client = Client::try_from(config)?;
    Ok(client)
}

/// Client for an optional context; `None` uses the current context
pub async fn connect(context: Option<&str>) -> Result<Client> {
    match context {
        Some(ctx) => create_client_for_context(ctx).await,
        None => create_client().await,
    }
}

/// Get the current Kubernetes context name
///
/// Falls back to "in-cluster" when no kubeconfig is present but an
/// in-cluster configuration can be inferred.
pub async fn get_context() -> Result<String> {
    if let Some(context) = Kubeconfig::read()
        .ok()
        .and_then(|kubeconfig| kubeconfig.current_context)
    {
        return Ok(context);
    }

    Config::infer()
        .await
        .context("No kubeconfig context and no in-cluster configuration")?;
    Ok("in-cluster".to_string())
}

/// Context that will be used for a connection, for display
pub async fn resolve_context_name(context: Option<&str>) -> String {
    match context {
        Some(ctx) => ctx.to_string(),
        None => get_context().await.unwrap_or_else(|_| "unknown".to_string()),
    }
}
