use std::{path::PathBuf, process};

use agent_flow::builder::{BuildOptions, DEFAULT_OUT_DIR, DEFAULT_SOURCE_DIR, build_agents};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "agent-builder",
    about = "Compile workflow exports into agent config and schema modules"
)]
struct Cli {
    /// Directory containing workflow exports (*.json) and optional *.map.json overrides.
    #[arg(default_value = DEFAULT_SOURCE_DIR)]
    source_dir: PathBuf,
    /// Directory to write one generated module folder per workflow into.
    #[arg(default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let opts = BuildOptions {
        source_dir: cli.source_dir.clone(),
        out_dir: cli.out_dir.clone(),
    };
    build_agents(&opts).with_context(|| {
        format!(
            "failed to build agents from {}",
            opts.source_dir.display()
        )
    })?;
    println!(
        "Built agents from {} -> {}",
        opts.source_dir.display(),
        opts.out_dir.display()
    );
    Ok(())
}
