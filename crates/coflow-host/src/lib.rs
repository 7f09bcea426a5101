pub mod config;
pub mod console;
pub mod inhibit;
pub mod output;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use chrono::Utc;
use coflow_core::{
    AudioCache, Catalog, ContentId, Engine, FileSnapshotStorage, FrameOutcome, SessionStatus,
    Step, init_tracing_with_options, render::write_wav,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::AppConfig,
    console::{ConsoleCommand, HELP, cue_line, parse_command, status_line, transition_line},
    inhibit::SystemdInhibitLock,
    output::AudioOutput,
};

/// What to do at start-up; everything else comes from the config file.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub config: Option<PathBuf>,
    pub flow: Option<String>,
    pub gesture: Option<String>,
    pub resume: bool,
    pub capture: Option<PathBuf>,
}

/// Engine state shared by the frame loop and the console.
struct AppState {
    engine: Mutex<Engine>,
    catalog: Arc<Catalog>,
    audio_cache: Arc<AudioCache>,
    safety_confirmed: AtomicBool,
    running: AtomicBool,
    audio_output: bool,
    capture: Option<Mutex<Vec<f32>>>,
    capture_sample_rate: u32,
}

pub fn run(options: LaunchOptions) -> Result<()> {
    let config = AppConfig::load(options.config.as_deref())?;
    let telemetry = init_tracing_with_options(
        &config.paths.logs_dir,
        &config.diagnostics.trace_file_prefix,
        &config.diagnostics.rust_log_filter,
    )?;
    info!(session_id = %telemetry.session_id, mode = ?config.mode, "coflow host starting");

    let catalog = Arc::new(Catalog::load_dir(&config.content.root)?);
    let audio_cache = Arc::new(AudioCache::new());
    let engine = Engine::new(Arc::clone(&catalog) as Arc<dyn coflow_core::ContentLookup>, config.engine_settings())
        .with_audio_cache(Arc::clone(&audio_cache))
        .with_snapshot_storage(Box::new(FileSnapshotStorage::new(&config.snapshot.path)))
        .with_wake_lock(Box::new(SystemdInhibitLock::new()));

    let state = Arc::new(AppState {
        engine: Mutex::new(engine),
        catalog,
        audio_cache,
        safety_confirmed: AtomicBool::new(false),
        running: AtomicBool::new(true),
        audio_output: config.player.audio_output,
        capture: options.capture.as_ref().map(|_| Mutex::new(Vec::new())),
        capture_sample_rate: config.player.capture_sample_rate,
    });

    load_initial_session(&state, &options)?;
    warm_audio(&state);
    println!("{HELP}");

    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(config.player.frame_rate.max(1)));
    let frame_state = Arc::clone(&state);
    let frame_loop = thread::Builder::new()
        .name("coflow-frame".to_string())
        .spawn(move || run_frame_loop(&frame_state, frame_interval))
        .context("failed to start frame loop")?;

    let console_result = run_console(&state);
    state.running.store(false, Ordering::SeqCst);
    let render_sample_rate = frame_loop.join().unwrap_or_else(|_| {
        error!("frame loop panicked");
        state.capture_sample_rate
    });

    {
        let mut engine = state.engine.lock();
        engine.save_snapshot();
        engine.shutdown();
    }
    if let (Some(path), Some(buffer)) = (options.capture.as_ref(), state.capture.as_ref()) {
        write_wav(path, &buffer.lock(), render_sample_rate)?;
        println!("captured audio written to {}", path.display());
    }

    info!("coflow host stopped");
    console_result
}

#[instrument(skip(state))]
fn load_initial_session(state: &AppState, options: &LaunchOptions) -> Result<()> {
    let mut engine = state.engine.lock();

    if let Some(flow_id) = options.flow.as_deref() {
        let flow = state.catalog.flow(flow_id)?;
        engine.load_flow(flow)?;
        println!("loaded flow \"{}\" ({} steps)", flow.name, flow.steps.len());
    } else if let Some(gesture_id) = options.gesture.as_deref() {
        engine.load_content(&ContentId::new(gesture_id))?;
        println!("loaded gesture \"{gesture_id}\"");
    } else if options.resume {
        match engine.pending_snapshot() {
            Some(snapshot) => {
                engine.resume_from_snapshot(&snapshot)?;
                println!("resumed \"{}\"", snapshot.session_label);
            }
            None => println!("no resumable session"),
        }
    }

    if engine.steps().is_empty() {
        if let Some(snapshot) = engine.pending_snapshot() {
            println!(
                "resumable session \"{}\" at step {} of {}, saved {}; type `resume` or `discard`",
                snapshot.session_label,
                snapshot.step_index + 1,
                snapshot.content_refs.len(),
                snapshot.age_label(Utc::now()),
            );
        }
    }

    print_safety(&engine, state);
    Ok(())
}

/// Decodes the loaded session's audio without holding the engine lock, so
/// the frame loop never waits on a decode.
fn warm_audio(state: &AppState) {
    let sources = state.engine.lock().media_sources();
    if !sources.is_empty() {
        state.audio_cache.warm(&sources);
    }
}

fn open_output(state: &AppState) -> Option<AudioOutput> {
    if !state.audio_output {
        return None;
    }
    match AudioOutput::open_default() {
        Ok(output) => Some(output),
        Err(error) => {
            warn!(error = %format!("{error:#}"), "no audio output, continuing silently");
            None
        }
    }
}

// Returns the sample rate blocks were rendered at.
fn run_frame_loop(state: &AppState, interval: Duration) -> u32 {
    let mut output = open_output(state);
    let sample_rate = output
        .as_ref()
        .map_or(state.capture_sample_rate, AudioOutput::sample_rate);
    let rendering = output.is_some() || state.capture.is_some();
    let mut last = Instant::now();
    let mut render_carry = 0.0_f64;
    let mut block = Vec::new();

    while state.running.load(Ordering::SeqCst) {
        thread::sleep(interval);
        let now = Instant::now();
        let dt_sec = now.duration_since(last).as_secs_f64();
        last = now;

        let (outcome, steps) = {
            let mut engine = state.engine.lock();
            let outcome = engine.frame(dt_sec);
            if rendering {
                render_carry += dt_sec * f64::from(sample_rate);
                let frames = render_carry.floor();
                render_carry -= frames;
                block.clear();
                block.resize(frames as usize, 0.0_f32);
                engine.render_audio(&mut block, sample_rate);
            }
            let steps = if outcome.transitions.is_empty() {
                Vec::new()
            } else {
                engine.steps().to_vec()
            };
            (outcome, steps)
        };

        if rendering {
            if let Some(output) = output.as_mut() {
                let queued = output.push_block(&block);
                if queued < block.len() {
                    debug!(dropped = block.len() - queued, "output buffer full");
                }
            }
            if let Some(buffer) = state.capture.as_ref() {
                buffer.lock().extend_from_slice(&block);
            }
        }
        print_outcome(&outcome, &steps);
    }
    sample_rate
}

fn print_outcome(outcome: &FrameOutcome, steps: &[Step]) {
    for transition in &outcome.transitions {
        if let Some(line) = transition_line(transition, steps) {
            println!("{line}");
        }
    }
    for event in &outcome.cues {
        println!("{}", cue_line(event));
    }
}

fn run_console(state: &AppState) -> Result<()> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read console input")?;
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}; {HELP}");
                continue;
            }
        };

        if command == ConsoleCommand::Quit {
            break;
        }
        let resumed = command == ConsoleCommand::Resume;
        apply_command(state, command);
        if resumed {
            warm_audio(state);
        }
        io::stdout().flush().context("failed to flush console")?;
    }
    Ok(())
}

#[instrument(skip(state))]
fn apply_command(state: &AppState, command: ConsoleCommand) {
    let mut engine = state.engine.lock();
    match command {
        ConsoleCommand::Play | ConsoleCommand::Toggle
            if engine.status() != SessionStatus::Playing
                && !state.safety_confirmed.load(Ordering::SeqCst)
                && !engine.safety_considerations().is_empty() =>
        {
            print_safety(&engine, state);
            return;
        }
        ConsoleCommand::Play => engine.play(),
        ConsoleCommand::Pause => engine.pause(),
        ConsoleCommand::Toggle => engine.toggle(),
        ConsoleCommand::Next => engine.next(),
        ConsoleCommand::Prev => engine.prev(),
        ConsoleCommand::Reset => engine.reset(),
        ConsoleCommand::Seek(position_sec) => engine.seek(position_sec),
        ConsoleCommand::Status => {}
        ConsoleCommand::Confirm => {
            state.safety_confirmed.store(true, Ordering::SeqCst);
            println!("thanks, type `play` to begin");
            return;
        }
        ConsoleCommand::Resume => match engine.pending_snapshot() {
            Some(snapshot) => {
                if let Err(error) = engine.resume_from_snapshot(&snapshot) {
                    warn!(%error, "resume failed");
                    println!("could not resume: {error}");
                    return;
                }
                state.safety_confirmed.store(false, Ordering::SeqCst);
                print_safety(&engine, state);
            }
            None => {
                println!("no resumable session");
                return;
            }
        },
        ConsoleCommand::Discard => {
            engine.discard_snapshot();
            println!("saved session discarded");
            return;
        }
        ConsoleCommand::Help => {
            println!("{HELP}");
            return;
        }
        ConsoleCommand::Quit => return,
    }
    println!("{}", status_line(&engine.view(), engine.current_step()));
}

fn print_safety(engine: &Engine, state: &AppState) {
    let considerations = engine.safety_considerations();
    if considerations.is_empty() || state.safety_confirmed.load(Ordering::SeqCst) {
        return;
    }
    println!("before you begin, skip this session if any of these apply:");
    for item in &considerations {
        println!("  - {item}");
    }
    println!("type `confirm` to continue");
}
