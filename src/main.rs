//! Braid command-line runner
//!
//! Runs a single task through an agent with the default toolset, prints
//! the final reply, and optionally appends the exported training pairs to
//! a JSONL file.

use anyhow::{bail, Context, Result};
use braid_core::{
    export_trajectories, final_response, run_completed, Agent, AgentConfig, DedupRegistry,
    ModelClient, TrajectorySink,
};
use parking_lot::Mutex;
use std::sync::Arc;

fn usage() -> ! {
    eprintln!("usage: braid [--config <path>] [--model <name>] [--trajectories <path>] <task>");
    std::process::exit(2);
}

fn parse_args() -> Result<(AgentConfig, String)> {
    let mut config: Option<AgentConfig> = None;
    let mut model: Option<String> = None;
    let mut trajectories: Option<String> = None;
    let mut task_parts: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().unwrap_or_else(|| usage());
                config = Some(AgentConfig::from_file(&path)?);
            }
            "--model" => model = Some(args.next().unwrap_or_else(|| usage())),
            "--trajectories" => trajectories = Some(args.next().unwrap_or_else(|| usage())),
            "--help" | "-h" => usage(),
            other => task_parts.push(other.to_string()),
        }
    }

    if task_parts.is_empty() {
        usage();
    }

    let mut config = config.unwrap_or_default();
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(path) = trajectories {
        config.trajectory_path = Some(path.into());
    }
    if config.resolve_api_key().is_none() {
        bail!("no API key: set BRAID_API_KEY or OPENAI_API_KEY, or put api_key in the config file");
    }

    Ok((config, task_parts.join(" ")))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (config, task) = parse_args()?;

    // One registry tracks chains the client has stored, a separate one
    // tracks pairs already exported; both key by content digest.
    let chain_registry = Arc::new(Mutex::new(DedupRegistry::new()));
    let client = ModelClient::new(config.clone(), Arc::clone(&chain_registry))
        .context("failed to create model client")?;
    let agent = Agent::new(config.clone(), client).with_tools(braid_tools::default_toolset());

    let history = agent.run(&task).await.context("agent run failed")?;

    match final_response(&history) {
        Some(reply) => println!("{}", reply),
        None => println!("(no assistant reply)"),
    }

    if let Some(path) = &config.trajectory_path {
        let mut export_registry = DedupRegistry::new();
        let pairs = export_trajectories(&history, &mut export_registry);
        let sink = TrajectorySink::new(path);
        let completed = run_completed(&history);
        let written = sink
            .append(&pairs, &config.model, completed)
            .context("failed to save training pairs")?;
        let target = if completed { sink.path().to_path_buf() } else { sink.failed_path() };
        eprintln!("saved {} training pair(s) to {}", written, target.display());
    }

    Ok(())
}
