use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tempflow_core::app::{Scheduler, artifact_status};
use tempflow_core::graph::TaskGraph;
use tempflow_core::impls::{HttpFetcher, LocalArtifactStore, StaticFetcher};
use tempflow_core::pipeline::temperature_pipeline;
use tempflow_core::ports::Fetcher;
use tempflow_core::{PipelineConfig, TaskId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Min/max temperature preparation pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline (or the requested goals) to completion
    Run(RunArgs),
    /// List every task with its artifact and whether it is complete
    Status(CommonArgs),
}

#[derive(Args, Debug, Default)]
struct CommonArgs {
    /// JSON configuration file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Artifact directory, overriding the configuration
    #[arg(long)]
    artifact_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Task to materialize; repeatable. Defaults to the terminal task
    #[arg(long = "goal", value_name = "TASK")]
    goals: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tempflow=info,tempflow_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args).await,
        Command::Status(args) => handle_status(args).await,
    }
}

fn load_config(args: &CommonArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.artifact_dir {
        config.artifact_dir = dir.clone();
    }
    Ok(config)
}

fn build(
    config: &PipelineConfig,
    fetcher: Arc<dyn Fetcher>,
) -> Result<(TaskGraph, Arc<LocalArtifactStore>)> {
    let graph = temperature_pipeline(config, fetcher)?;
    let store = Arc::new(LocalArtifactStore::new(&config.artifact_dir));
    Ok((graph, store))
}

async fn handle_run(args: RunArgs) -> Result<()> {
    let config = load_config(&args.common)?;
    let fetcher = HttpFetcher::new(config.fetch_timeout())?;
    let (graph, store) = build(&config, Arc::new(fetcher))?;
    info!(artifact_dir = %store.root().display(), tasks = graph.len(), "pipeline ready");

    let goals: Vec<TaskId> = args.goals.into_iter().map(TaskId::new).collect();
    let report = Scheduler::new(store)
        .execute_goals(&graph, &goals)
        .await
        .context("pipeline run failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Status only inspects the store; no task runs, so nothing is fetched.
async fn status_lines(config: &PipelineConfig) -> Result<Vec<String>> {
    let (graph, store) = build(config, Arc::new(StaticFetcher::new()))?;

    Ok(artifact_status(&graph, store.as_ref())
        .await?
        .into_iter()
        .map(|status| {
            let mark = if status.complete { "complete" } else { "pending" };
            format!("{:<28} {:<8} {}", status.task, mark, status.location)
        })
        .collect())
}

async fn handle_status(args: CommonArgs) -> Result<()> {
    let config = load_config(&args)?;
    for line in status_lines(&config).await? {
        println!("{line}");
    }
    Ok(())
}
