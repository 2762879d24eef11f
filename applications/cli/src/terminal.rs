//! Terminal output adapter
//!
//! Renders engine notifications as text. Position updates arrive once per
//! frame, so the progress line is only rewritten when its text changes.

use std::io::Write;
use tracing::debug;
use trill_playback::{format_time, ErrorKind, MuteTier, OutputAdapter, PositionSample};

/// Writes notifications to any `Write` (stdout in the binary)
pub struct TerminalOutput<W: Write + Send> {
    out: W,
    duration: f64,
    last_progress: String,
}

impl<W: Write + Send> TerminalOutput<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            duration: 0.0,
            last_progress: String::new(),
        }
    }

    /// Recover the writer (tests inspect what was printed)
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        // Start on a fresh line if the progress line is showing
        let prefix = if self.last_progress.is_empty() { "" } else { "\n" };
        self.last_progress.clear();
        if let Err(e) = writeln!(self.out, "{prefix}{text}") {
            debug!("Terminal write failed: {}", e);
        }
    }
}

/// `m:ss / m:ss [pct%]`
pub fn progress_text(sample: PositionSample, duration: f64) -> String {
    format!(
        "{} / {} [{:.0}%]",
        format_time(sample.elapsed_seconds),
        format_time(duration),
        sample.percent
    )
}

impl<W: Write + Send> OutputAdapter for TerminalOutput<W> {
    fn on_position_update(&mut self, sample: PositionSample) {
        let text = progress_text(sample, self.duration);
        if text == self.last_progress {
            return;
        }
        let result = write!(self.out, "\r{text}  ").and_then(|()| self.out.flush());
        if let Err(e) = result {
            debug!("Terminal write failed: {}", e);
        }
        self.last_progress = text;
    }

    fn on_duration_known(&mut self, seconds: f64) {
        self.duration = seconds;
        self.line(&format!("loaded ({})", format_time(seconds)));
    }

    fn on_play_state_changed(&mut self, is_playing: bool) {
        self.line(if is_playing { "playing" } else { "paused" });
    }

    fn on_mute_state_changed(&mut self, tier: MuteTier) {
        if tier == MuteTier::Off {
            self.line("muted");
        }
    }

    fn on_loop_state_changed(&mut self, enabled: bool) {
        self.line(if enabled { "loop on" } else { "loop off" });
    }

    fn on_volume_changed(&mut self, level: u8) {
        self.line(&format!("volume {level}"));
    }

    fn on_pan_changed(&mut self, value: f32) {
        self.line(&format!("pan {value:+.2}"));
    }

    fn on_error(&mut self, kind: ErrorKind) {
        let message = match kind {
            ErrorKind::NotLoaded => "no track loaded",
            ErrorKind::DecodeFailed => "could not decode that file",
            ErrorKind::InvalidParameter => "invalid value or disabled feature",
            ErrorKind::Output => "audio output error",
        };
        self.line(&format!("error: {message}"));
    }
}
