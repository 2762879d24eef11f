/// Trill - single-track terminal player
use clap::Parser;
use crossbeam_channel::{select, tick, unbounded, Receiver};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use trill_cli::{execute, resolve, Command, Flow, Overrides, Settings, TerminalOutput};
use trill_desktop::{CpalSink, SymphoniaDecoder, SystemClock};
use trill_playback::{Collaborators, FrameScheduler, PlaybackEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "trill")]
#[command(about = "Play one audio file in the terminal", long_about = None)]
struct Cli {
    /// Audio file to load on start
    file: Option<PathBuf>,

    /// Configuration file path (default: ./trill.toml if present)
    #[arg(short, long, env = "TRILL_CONFIG")]
    config: Option<PathBuf>,

    /// Initial volume (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: Option<u8>,

    /// Loop the track
    #[arg(long = "loop")]
    loop_track: bool,

    /// Enable stereo pan control
    #[arg(long)]
    pan: bool,

    /// Wait for `play` after loading
    #[arg(long)]
    no_autoplay: bool,

    /// Frame loop period in milliseconds
    #[arg(long = "frame-ms")]
    frame_ms: Option<u64>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            volume: self.volume,
            loop_enabled: self.loop_track.then_some(true),
            pan_enabled: self.pan.then_some(true),
            autoplay: self.no_autoplay.then_some(false),
            frame_interval_ms: self.frame_ms,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so the progress line on stdout stays intact)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "trill=info,trill_cli=info,trill_playback=info,trill_desktop=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply(&cli.overrides());
    settings.validate()?;

    if cli.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    tracing::info!("Starting Trill");
    tracing::debug!("Settings: {:?}", settings);

    let sink = CpalSink::new()?;
    // Resampling to the device rate happens on the decode worker
    let decoder = SymphoniaDecoder::with_output_rate(sink.sample_rate())?;

    let mut engine = PlaybackEngine::new(
        settings.player.clone(),
        Collaborators {
            clock: Box::new(SystemClock::new()),
            scheduler: Box::new(FrameScheduler::new()),
            sink: Box::new(sink),
            decoder: Box::new(decoder),
            output: Box::new(TerminalOutput::new(io::stdout())),
        },
    );

    if let Some(path) = &cli.file {
        engine.load(std::fs::read(path)?);
    } else {
        println!("no file given, use 'load <path>' (type 'help' for commands)");
    }

    run(&mut engine, &spawn_stdin_reader(), settings.frame_interval_ms)?;

    tracing::info!("Bye");
    Ok(())
}

/// Input from the reader thread: a command, or text to show
type Input = std::result::Result<Command, String>;

/// Frame loop: commands and frame ticks, until `quit` or end of input
fn run(
    engine: &mut PlaybackEngine,
    inputs: &Receiver<Input>,
    frame_ms: u64,
) -> anyhow::Result<()> {
    let frames = tick(Duration::from_millis(frame_ms));
    let mut stdout = io::stdout();

    loop {
        select! {
            recv(inputs) -> input => {
                match input {
                    Ok(Ok(command)) => {
                        if execute(engine, command, &mut stdout)? == Flow::Quit {
                            return Ok(());
                        }
                    }
                    Ok(Err(message)) => writeln!(stdout, "{message}")?,
                    Err(_) => return Ok(()),
                }
            }
            recv(frames) -> _ => engine.on_frame(),
        }
    }
}

/// Blocking stdin reads (and `load` file reads) on their own thread
fn spawn_stdin_reader() -> Receiver<Input> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let input = match resolve(&line) {
                Ok(Some(command)) => Ok(command),
                Ok(None) => continue,
                Err(message) => Err(message),
            };
            if tx.send(input).is_err() {
                break;
            }
        }
    });
    rx
}
