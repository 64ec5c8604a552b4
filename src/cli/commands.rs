//! Summary and watch command handlers

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::{Config, OutputFormat};
use crate::models::{DrClusterAppsMap, ProtectedApp, ProtectedPvcData};
use crate::report::{
    cluster_summaries, filter_pvc_data_using_apps, find_protected_app, protected_pvc_data,
    render_app, render_pvcs, render_summary,
};
use crate::services::{DashboardPipeline, DashboardView, HubSession, PipelineState, compute_view};
use crate::sources::{FileSource, KubeListSource, SnapshotSource};
use crate::utils::DefaultResolver;
use crate::watcher::HubState;

/// Arguments of `drlens summary`
#[derive(Args, Debug, Default)]
pub struct SummaryArgs {
    /// Read hub objects from a YAML/JSON bundle instead of the cluster
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Only report this DR cluster
    #[arg(long, short = 'c')]
    pub cluster: Option<String>,

    /// Show one protected application, as NAMESPACE/NAME
    #[arg(long, short = 'a')]
    pub app: Option<String>,

    /// List protected PVCs instead (narrowed by --cluster and --app)
    #[arg(long)]
    pub pvcs: bool,

    /// Output format (defaults to output.format from config)
    #[arg(long, short = 'o', value_enum)]
    pub output: Option<OutputFormat>,
}

/// Arguments of `drlens watch`
#[derive(Args, Debug, Default)]
pub struct WatchArgs {
    /// Only report this DR cluster
    #[arg(long, short = 'c')]
    pub cluster: Option<String>,

    /// Output format (defaults to output.format from config)
    #[arg(long, short = 'o', value_enum)]
    pub output: Option<OutputFormat>,
}

/// One-shot report
pub async fn handle_summary_command(args: SummaryArgs, config: &Config) -> Result<()> {
    let state = HubState::new();
    let source: Box<dyn SnapshotSource> = match &args.file {
        Some(path) => Box::new(FileSource::new(path)),
        None => {
            let client = crate::kube::connect(config.hub.context.as_deref())
                .await
                .context("Failed to create Kubernetes client")?;
            Box::new(KubeListSource::new(client, config.hub.namespace.clone()))
        }
    };

    tracing::debug!("Loading snapshot from {} source", source.source_type());
    source.load(&state).await?;

    let view = compute_view(&state.snapshot(), &DefaultResolver);
    let clusters = ready_clusters(&view)?;
    let format = args.output.unwrap_or(config.output.format);

    if args.pvcs {
        let selected = select_cluster(clusters, args.cluster.as_deref())?;
        let pvcs = selected_pvcs(&selected, args.app.as_deref())?;
        print!("{}", render_pvcs(&pvcs, format)?);
        return Ok(());
    }

    if let Some(app_ref) = args.app.as_deref() {
        let (namespace, name) = parse_app_ref(app_ref)?;
        let (cluster, app) = clusters
            .iter()
            .filter(|(cluster, _)| args.cluster.as_deref().is_none_or(|c| c == cluster.as_str()))
            .find_map(|(cluster, _)| {
                find_protected_app(clusters, cluster, name, namespace).map(|app| (cluster, app))
            })
            .with_context(|| format!("No protected application {}/{} found", namespace, name))?;
        print!("{}", render_app(cluster, app, format)?);
        return Ok(());
    }

    let selected = select_cluster(clusters, args.cluster.as_deref())?;
    let summaries = cluster_summaries(&selected, config.output.show_unprotected);
    print!("{}", render_summary(&summaries, format)?);
    Ok(())
}

/// Live report, reprinted whenever the view changes
pub async fn handle_watch_command(args: WatchArgs, config: &Config) -> Result<()> {
    let mut session =
        HubSession::connect(config.hub.context.as_deref(), config.hub.namespace.clone()).await?;
    let mut pipeline = DashboardPipeline::new();
    let format = args.output.unwrap_or(config.output.format);
    let mut last_printed: Option<DashboardView> = None;

    eprintln!("Watching hub context {} (Ctrl+C to stop)", session.context());

    loop {
        tokio::select! {
            changed = session.recv_and_apply() => {
                match changed {
                    None => break,
                    Some(false) => continue,
                    Some(true) => {}
                }

                let view = pipeline.compute(&session.snapshot());
                if last_printed.as_ref() == Some(view.as_ref()) {
                    continue;
                }

                match &view.state {
                    PipelineState::Idle | PipelineState::Loading => {
                        if last_printed.as_ref().map(|v| &v.state) != Some(&PipelineState::Loading) {
                            eprintln!("Waiting for hub resources to load...");
                        }
                    }
                    PipelineState::Failed(error) => {
                        eprintln!("DR view unavailable: {}", error);
                    }
                    PipelineState::Ready => {
                        match render_watch_frame(&view.clusters, args.cluster.as_deref(), config, format) {
                            Ok(frame) => {
                                println!("--- {} ---", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
                                print!("{}", frame);
                            }
                            // The cluster may only appear in a later view
                            Err(e) => eprintln!("{:#}", e),
                        }
                    }
                }
                last_printed = Some(view.as_ref().clone());
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("Interrupted, stopping watchers");
                break;
            }
        }
    }

    session.stop();
    Ok(())
}

fn ready_clusters(view: &DashboardView) -> Result<&DrClusterAppsMap> {
    match &view.state {
        PipelineState::Ready => Ok(&view.clusters),
        PipelineState::Failed(error) => Err(anyhow::anyhow!("DR view unavailable: {}", error)),
        PipelineState::Idle | PipelineState::Loading => {
            Err(anyhow::anyhow!("DR view incomplete: some hub resources did not load"))
        }
    }
}

/// Summary of the selected clusters for one watch update
fn render_watch_frame(
    clusters: &DrClusterAppsMap,
    cluster: Option<&str>,
    config: &Config,
    format: OutputFormat,
) -> Result<String> {
    let selected = select_cluster(clusters, cluster)?;
    let summaries = cluster_summaries(&selected, config.output.show_unprotected);
    render_summary(&summaries, format)
}

/// Restrict the map to one cluster when asked to
fn select_cluster(clusters: &DrClusterAppsMap, cluster: Option<&str>) -> Result<DrClusterAppsMap> {
    let Some(cluster) = cluster else {
        return Ok(clusters.clone());
    };
    let entry = clusters
        .get(cluster)
        .with_context(|| format!("Unknown DR cluster: {}", cluster))?;
    Ok(DrClusterAppsMap::from([(cluster.to_string(), entry.clone())]))
}

/// Protected PVCs of the selected clusters, optionally of one application
fn selected_pvcs(
    clusters: &DrClusterAppsMap,
    app_ref: Option<&str>,
) -> Result<Vec<ProtectedPvcData>> {
    let apps: Vec<ProtectedApp> = clusters
        .values()
        .flat_map(|entry| entry.protected_apps.iter().cloned())
        .collect();

    let mut pvcs = protected_pvc_data(&apps);
    if let Some(app_ref) = app_ref {
        let (namespace, name) = parse_app_ref(app_ref)?;
        let matching: Vec<ProtectedApp> =
            apps.iter().filter(|app| app.is(name, namespace)).cloned().collect();
        pvcs = filter_pvc_data_using_apps(&pvcs, &matching);
    }

    // An application deployed to several clusters reports its PVCs once per cluster
    let mut unique: Vec<ProtectedPvcData> = Vec::with_capacity(pvcs.len());
    for pvc in pvcs {
        if !unique.contains(&pvc) {
            unique.push(pvc);
        }
    }
    Ok(unique)
}

/// Split `NAMESPACE/NAME`
fn parse_app_ref(app_ref: &str) -> Result<(&str, &str)> {
    match app_ref.split_once('/') {
        Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
            Ok((namespace, name))
        }
        _ => Err(anyhow::anyhow!(
            "Invalid application '{}', expected NAMESPACE/NAME",
            app_ref
        )),
    }
}
