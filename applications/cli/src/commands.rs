//! Stdin command language
//!
//! One command per line. Playback commands become [`Intent`]s; the rest are
//! handled by the front end itself.

use crate::error::{CliError, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};
use trill_playback::{format_time, Intent, PlaybackEngine};

pub const HELP: &str = "\
commands:
  play | p            play / pause
  seek <percent>      jump to a position (0-100), stays paused
  vol <0-100>         set volume
  mute | m            mute / unmute
  loop [on|off]       toggle or set looping
  pan <-1..1>         stereo pan (when enabled)
  center              reset pan
  load <path>         load a file
  status | s          show position and settings
  help | h            this text
  quit | q            exit";

/// A parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Intent(Intent),
    Load(PathBuf),
    /// `load` with the file already read (see [`resolve`])
    LoadBytes(Vec<u8>),
    Status,
    Help,
    Quit,
}

/// Whether the front end keeps running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parse one input line
///
/// Blank lines parse to `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let command = match (verb.to_ascii_lowercase().as_str(), arg) {
        ("play" | "p" | "pause", None) => Command::Intent(Intent::PlayToggle),
        ("seek", Some(percent)) => {
            Command::Intent(Intent::Seek(number::<f64>(verb, percent)? / 100.0))
        }
        ("vol" | "volume", Some(level)) => {
            Command::Intent(Intent::SetVolume(number::<i32>(verb, level)?))
        }
        ("mute" | "m", None) => Command::Intent(Intent::Mute),
        ("loop", None) => Command::Intent(Intent::ToggleLoop),
        ("loop", Some("on")) => Command::Intent(Intent::SetLoop(true)),
        ("loop", Some("off")) => Command::Intent(Intent::SetLoop(false)),
        ("pan", Some(value)) => Command::Intent(Intent::SetPan(number::<f32>(verb, value)?)),
        ("center", None) => Command::Intent(Intent::ResetPan),
        ("load", Some(_)) => {
            // Paths may contain spaces
            let path = line.trim_start()[verb.len()..].trim();
            Command::Load(PathBuf::from(path))
        }
        ("status" | "s", None) => Command::Status,
        ("help" | "h" | "?", None) => Command::Help,
        ("quit" | "q" | "exit", None) => Command::Quit,
        _ => {
            return Err(CliError::Command(format!(
                "{} (type 'help' for commands)",
                line.trim()
            )))
        }
    };

    if words.next().is_some() && !matches!(command, Command::Load(_)) {
        return Err(CliError::Command(format!("too many arguments: {}", line.trim())));
    }
    Ok(Some(command))
}

/// Parse a line on the input thread, reading the file behind `load` there
///
/// The frame loop then only hands bytes to the engine. Errors come back as
/// the text to show the user.
pub fn resolve(line: &str) -> std::result::Result<Option<Command>, String> {
    match parse(line).map_err(|e| e.to_string())? {
        Some(Command::Load(path)) => match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(Command::LoadBytes(bytes))),
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                Err(format!("cannot read {}: {}", path.display(), e))
            }
        },
        other => Ok(other),
    }
}

fn number<T: std::str::FromStr>(verb: &str, text: &str) -> Result<T> {
    text.parse()
        .map_err(|_| CliError::Command(format!("{verb}: '{text}' is not a number")))
}

/// Run a command against the engine
///
/// Engine rejections are already reported through the output adapter, so
/// they do not stop the front end. `Load` reads the file on the calling
/// thread; the binary passes `LoadBytes` from [`resolve`] instead.
pub fn execute(
    engine: &mut PlaybackEngine,
    command: Command,
    out: &mut impl Write,
) -> Result<Flow> {
    match command {
        Command::Intent(intent) => {
            if let Err(e) = engine.dispatch(intent) {
                debug!("Intent rejected: {}", e);
            }
        }
        Command::LoadBytes(bytes) => {
            engine.load(bytes);
        }
        Command::Load(path) => match std::fs::read(&path) {
            Ok(bytes) => {
                engine.load(bytes);
            }
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                writeln!(out, "cannot read {}: {}", path.display(), e)?;
            }
        },
        Command::Status => writeln!(out, "{}", status_line(engine))?,
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// One-line summary of the engine
pub fn status_line(engine: &PlaybackEngine) -> String {
    let position = match engine.duration() {
        Some(duration) => {
            let sample = engine.position_sample();
            format!(
                "{} / {} [{:.0}%]",
                format_time(sample.elapsed_seconds),
                format_time(duration),
                sample.percent
            )
        }
        None if engine.is_loading() => "loading".to_string(),
        None => "no track".to_string(),
    };

    let mut line = format!(
        "{:?} | {} | vol {} ({}) | loop {}",
        engine.state(),
        position,
        engine.volume_level(),
        engine.mute_tier().as_str(),
        if engine.loop_enabled() { "on" } else { "off" },
    );
    if engine.config().pan_enabled {
        line.push_str(&format!(" | pan {:+.2}", engine.pan()));
    }
    line
}
