use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use coflow_core::{
    Catalog, ContentId, ContentLookup, Engine, EngineSettings, FileSnapshotStorage,
    RenderOptions, SnapshotSettings, SnapshotStore,
    diagnostics::init_tracing,
    persistence::{load_flow, save_json},
    render::{DEFAULT_FRAME_RATE, DEFAULT_RENDER_SAMPLE_RATE, render_session_to_wav},
    time::format_clock,
};

#[derive(Debug, Parser)]
#[command(name = "coflow-cli")]
#[command(about = "Headless tools for coflow content, renders and session snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    #[arg(long, default_value = "content")]
    content_dir: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Lint gestures and flows under the content directory.
    Validate,
    /// Play a flow or single gesture offline and write the mix to WAV.
    Render {
        #[arg(long, conflicts_with_all = ["gesture", "flow_file"])]
        flow: Option<String>,

        #[arg(long, conflicts_with = "flow_file")]
        gesture: Option<String>,

        /// Flow document outside the content directory.
        #[arg(long)]
        flow_file: Option<PathBuf>,

        #[arg(long, default_value = "data/renders/session.wav")]
        output: PathBuf,

        /// Also write the render report (frames, cues, completion) as JSON.
        #[arg(long)]
        report: Option<PathBuf>,

        #[arg(
            long,
            default_value_t = DEFAULT_RENDER_SAMPLE_RATE,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        sample_rate: u32,

        #[arg(
            long,
            default_value_t = DEFAULT_FRAME_RATE,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        frame_rate: u32,
    },
    /// Inspect or clear the persisted resume record.
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,

        #[arg(long, default_value = "data/session-resume.json")]
        path: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum SnapshotAction {
    Show,
    Clear,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _telemetry = init_tracing(&cli.log_dir)?;

    match cli.command {
        Commands::Validate => {
            let report = coflow_core::validate_catalog(&cli.content_dir)?;
            println!(
                "{} gestures, {} flows checked",
                report.gesture_count, report.flow_count
            );
            for problem in &report.problems {
                println!("  - {problem}");
            }
            if !report.is_clean() {
                println!("{} problem(s) found", report.problems.len());
                return Ok(ExitCode::FAILURE);
            }
            println!("content is valid");
        }
        Commands::Render {
            flow,
            gesture,
            flow_file,
            output,
            report: report_path,
            sample_rate,
            frame_rate,
        } => {
            let catalog = Arc::new(Catalog::load_dir(&cli.content_dir)?);
            let mut engine = Engine::new(Arc::clone(&catalog) as Arc<dyn ContentLookup>, EngineSettings::default());

            if let Some(path) = flow_file {
                engine.load_flow(&load_flow(&path)?)?;
            } else if let Some(flow_id) = flow {
                engine.load_flow(catalog.flow(&flow_id)?)?;
            } else if let Some(gesture_id) = gesture {
                engine.load_content(&ContentId::new(gesture_id))?;
            } else {
                anyhow::bail!("pass --flow, --gesture or --flow-file to choose what to render");
            }

            let report = render_session_to_wav(
                &mut engine,
                &output,
                RenderOptions {
                    sample_rate,
                    frame_rate,
                },
            )?;
            println!(
                "rendered {} ({} cues) to {}",
                format_clock(report.duration_sec.round() as u64),
                report.cues.len(),
                output.display()
            );
            if let Some(path) = report_path {
                save_json(&path, &report)?;
                println!("report written to {}", path.display());
            }
        }
        Commands::Snapshot { action, path } => {
            let store = SnapshotStore::new(
                Box::new(FileSnapshotStorage::new(&path)),
                SnapshotSettings::default(),
            );
            match action {
                SnapshotAction::Show => {
                    let catalog = Catalog::load_dir(&cli.content_dir)?;
                    show_snapshot(&store, &catalog)?;
                }
                SnapshotAction::Clear => {
                    store.clear_snapshot();
                    println!("cleared {}", path.display());
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn show_snapshot(store: &SnapshotStore, catalog: &dyn ContentLookup) -> anyhow::Result<()> {
    let Some(snapshot) = store.get_snapshot(catalog) else {
        println!("no resumable session");
        return Ok(());
    };

    let json = serde_json::to_string_pretty(&snapshot).context("failed to format snapshot")?;
    println!(
        "{} - step {} of {}, saved {}",
        snapshot.session_label,
        snapshot.step_index + 1,
        snapshot.content_refs.len(),
        snapshot.age_label(Utc::now())
    );
    println!("{json}");
    Ok(())
}
