use coflow_core::{
    CueEvent, CueType, SessionStatus, SessionView, Side, Step, Transition, time::format_clock,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Play,
    Pause,
    Toggle,
    Next,
    Prev,
    Reset,
    Seek(f64),
    Status,
    Confirm,
    Resume,
    Discard,
    Help,
    Quit,
}

pub const HELP: &str = "commands: play, pause, toggle (or empty line), next, prev, reset, \
seek <sec>, status, confirm, resume, discard, help, quit";

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(ConsoleCommand::Toggle);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "play" | "p" => ConsoleCommand::Play,
        "pause" => ConsoleCommand::Pause,
        "toggle" | "t" => ConsoleCommand::Toggle,
        "next" | "n" => ConsoleCommand::Next,
        "prev" | "b" => ConsoleCommand::Prev,
        "reset" => ConsoleCommand::Reset,
        "seek" => {
            let value = words
                .next()
                .ok_or_else(|| "seek needs a position in seconds".to_string())?;
            let position = value
                .parse::<f64>()
                .map_err(|error| format!("invalid seek position '{value}': {error}"))?;
            ConsoleCommand::Seek(position)
        }
        "status" | "s" => ConsoleCommand::Status,
        "confirm" | "yes" => ConsoleCommand::Confirm,
        "resume" => ConsoleCommand::Resume,
        "discard" => ConsoleCommand::Discard,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(command)
}

#[must_use]
pub fn status_line(view: &SessionView, step: Option<&Step>) -> String {
    if view.step_count == 0 {
        return "[idle] nothing loaded".to_string();
    }

    let name = step.map_or("-", Step::display_name);
    let side = step
        .and_then(|step| step.side)
        .filter(|side| side.is_sided())
        .map(|side| match side {
            Side::Left => " (left)",
            Side::Right => " (right)",
            Side::None => "",
        })
        .unwrap_or_default();

    format!(
        "[{}] {}/{} {name}{side} {} left | session {} / {}",
        view.status,
        view.current_index + 1,
        view.step_count,
        format_clock(view.remaining_sec),
        format_clock(view.session_elapsed_sec.floor() as u64),
        format_clock(view.session_total_sec.round() as u64),
    )
}

#[must_use]
pub fn cue_line(event: &CueEvent) -> String {
    let prompt = match event.cue {
        CueType::Start => "begin",
        CueType::Halfway => "halfway there",
        CueType::Warning => "10 seconds left",
        CueType::SwitchSide => "switch sides",
        CueType::End => "finishing",
    };
    format!("  * {prompt} (step {})", event.step_index + 1)
}

#[must_use]
pub fn transition_line(transition: &Transition, steps: &[Step]) -> Option<String> {
    match transition {
        Transition::StepChanged { to, .. } => steps
            .get(*to)
            .map(|step| format!("-> step {}: {}", to + 1, step.display_name())),
        Transition::StepRestarted { .. } => Some("-> step restarted".to_string()),
        Transition::StatusChanged {
            to: SessionStatus::Completed,
            ..
        } => Some("session complete".to_string()),
        Transition::StatusChanged { .. } | Transition::Loaded => None,
    }
}
