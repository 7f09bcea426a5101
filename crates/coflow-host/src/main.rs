use std::path::PathBuf;

use clap::Parser;
use coflow_host_lib::LaunchOptions;

#[derive(Debug, Parser)]
#[command(name = "coflow-host")]
#[command(about = "Console player for guided gesture sessions")]
struct Cli {
    /// Config file to use instead of discovering coflow.config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, conflicts_with_all = ["gesture", "resume"])]
    flow: Option<String>,

    #[arg(long, conflicts_with = "resume")]
    gesture: Option<String>,

    /// Resume the saved session, if one is still valid.
    #[arg(long)]
    resume: bool,

    /// Also write the mixed session audio to this WAV file on exit.
    #[arg(long)]
    capture: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    coflow_host_lib::run(LaunchOptions {
        config: cli.config,
        flow: cli.flow,
        gesture: cli.gesture,
        resume: cli.resume,
        capture: cli.capture,
    })
}
