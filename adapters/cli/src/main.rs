#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a recorded Flash Point simulation.

mod config;

use std::{
    fs,
    io::{self, BufRead},
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flash_point_rendering::{BoardLayout, RenderingBackend, TextBackend, TextFormat};
use flash_point_system_playback::{Playback, PlaybackInput, Policy, StepKey};
use flash_point_system_replay::Replay;
use flash_point_transcript::{load, FileSource};
use flash_point_world::Board;
use tracing_subscriber::EnvFilter;

use crate::config::ReplayConfig;

/// Replays a recorded Flash Point simulation as a stream of scene operations.
#[derive(Debug, Parser)]
#[command(name = "flash-point", version)]
struct CliArgs {
    /// Configuration file (defaults to ./flash-point.toml when present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Initial board document, overriding the configuration.
    #[arg(long, value_name = "PATH")]
    board: Option<PathBuf>,
    /// Step transcript document, overriding the configuration.
    #[arg(long, value_name = "PATH")]
    steps: Option<PathBuf>,
    /// Emit one JSON object per operation instead of plain text.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the board and display a single step.
    Show {
        /// Step to display; clamped to the recorded range.
        #[arg(long, default_value_t = 0)]
        step: usize,
    },
    /// Advance one step per interval until the last step.
    Play {
        /// Interval between steps in milliseconds.
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
    },
    /// Step with `n` and `p` lines on stdin; `q` quits.
    Manual,
    /// Follow a file holding the current step number.
    Follow {
        /// File polled for the step number.
        #[arg(long, value_name = "PATH")]
        field: PathBuf,
        /// Poll interval in milliseconds.
        #[arg(long, value_name = "MS", default_value_t = 500)]
        poll_ms: u64,
    },
}

/// Entry point for the Flash Point command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    let mut config = ReplayConfig::load(args.config.as_deref())?;
    if let Some(board) = args.board {
        config.board = board;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    init_tracing(&config.log_filter);

    let source = FileSource::new(&config.board, &config.steps);
    let (spec, timeline) = match load(&source) {
        Ok(loaded) => loaded,
        Err(error) => {
            tracing::error!(%error, "simulation documents could not be loaded");
            return Err(error).context("failed to load simulation documents");
        }
    };
    let board = Board::reconcile(&spec).context("failed to reconcile board walls")?;
    let mut session = Session {
        replay: Replay::new(board, spec.markers, timeline),
        backend: TextBackend::new(
            io::stdout().lock(),
            BoardLayout::new(config.cell_size)?,
            if args.json {
                TextFormat::JsonLines
            } else {
                TextFormat::Plain
            },
        ),
    };

    match args.command {
        Command::Show { step } => session.show(step),
        Command::Play { interval_ms } => {
            let interval = interval_ms.map_or(config.step_interval(), Duration::from_millis);
            session.play(interval)
        }
        Command::Manual => session.manual(io::stdin().lock()),
        Command::Follow { field, poll_ms } => {
            session.follow(&field, Duration::from_millis(poll_ms.max(1)))
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

struct Session<B> {
    replay: Replay,
    backend: B,
}

impl<B: RenderingBackend> Session<B> {
    fn show(&mut self, step: usize) -> Result<()> {
        let mut commands = Vec::new();
        let shown = self.replay.show(step, &mut commands);
        self.backend.present(&commands)?;
        if let Some(shown) = shown {
            tracing::info!(step = shown, operations = commands.len(), "step displayed");
        }
        Ok(())
    }

    fn playback(&mut self, policy: Policy) -> Result<Playback> {
        self.show(0)?;
        Ok(Playback::new(policy, self.replay.timeline().len()))
    }

    fn play(&mut self, interval: Duration) -> Result<()> {
        let mut playback = self.playback(Policy::Timer { interval })?;
        let mut last_tick = Instant::now();
        while !playback.at_end() {
            thread::sleep(interval);
            let now = Instant::now();
            let elapsed = now.duration_since(last_tick);
            last_tick = now;
            if let Some(step) = playback.handle(PlaybackInput::Elapsed(elapsed)) {
                self.show(step)?;
            }
        }
        Ok(())
    }

    fn manual(&mut self, input: impl BufRead) -> Result<()> {
        let mut playback = self.playback(Policy::Manual)?;
        for line in input.lines() {
            let line = line.context("failed to read key input")?;
            let key = match line.trim() {
                "n" => StepKey::Next,
                "p" => StepKey::Previous,
                "q" => break,
                "" => continue,
                other => {
                    tracing::warn!(input = other, "expected n, p or q");
                    continue;
                }
            };
            if let Some(step) = playback.handle(PlaybackInput::Key(key)) {
                self.show(step)?;
            }
        }
        Ok(())
    }

    fn follow(&mut self, field: &Path, poll: Duration) -> Result<()> {
        let mut playback = self.playback(Policy::External)?;
        while !playback.at_end() {
            match read_step_field(field) {
                Ok(value) => {
                    if let Some(step) = playback.handle(PlaybackInput::External(value)) {
                        self.show(step)?;
                    }
                }
                Err(error) => tracing::debug!(%error, "step field unavailable"),
            }
            thread::sleep(poll);
        }
        Ok(())
    }
}

fn read_step_field(path: &Path) -> Result<i64> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read step field at {}", path.display()))?;
    contents
        .trim()
        .parse()
        .with_context(|| format!("step field at {} is not an integer", path.display()))
}

#[cfg(test)]
mod tests {
    use flash_point_core::{
        BoardSpec, CellCoord, CellSpec, Counter, CounterValues, Marker, MarkerKind, StepFrame,
        Timeline, WallDescriptor,
    };
    use flash_point_rendering::SceneModel;
    use flash_point_system_replay::Replay;
    use flash_point_world::Board;

    use super::Session;

    fn session() -> Session<SceneModel> {
        let spec = BoardSpec {
            cells: vec![
                CellSpec {
                    cell: CellCoord::new(0, 0),
                    walls: WallDescriptor::default(),
                    is_entrance: false,
                },
                CellSpec {
                    cell: CellCoord::new(1, 0),
                    walls: WallDescriptor::default(),
                    is_entrance: false,
                },
            ],
            ..BoardSpec::default()
        };
        let frames = (0..3)
            .map(|step| {
                let mut counters = CounterValues::default();
                counters.set(Counter::SavedLives, step);
                StepFrame {
                    counters,
                    markers: vec![Marker::new(MarkerKind::Smoke, CellCoord::new(step as i32 % 2, 0))],
                    ..StepFrame::default()
                }
            })
            .collect();
        Session {
            replay: Replay::new(
                Board::reconcile(&spec).expect("board reconciles"),
                Vec::new(),
                Timeline::new(frames),
            ),
            backend: SceneModel::new(),
        }
    }

    #[test]
    fn manual_session_follows_key_lines() {
        let mut session = session();

        session
            .manual("n\n\nx\nn\nn\np\nq\nn\n".as_bytes())
            .expect("manual session runs");

        assert_eq!(session.replay.current_step(), Some(1));
        assert_eq!(session.backend.counter(Counter::SavedLives), Some(1));
        assert!(session.backend.has_marker(MarkerKind::Smoke, CellCoord::new(1, 0)));
        assert_eq!(session.backend.marker_count(), 1);
    }

    #[test]
    fn show_clamps_past_the_last_step() {
        let mut session = session();

        session.show(40).expect("step displays");

        assert_eq!(session.replay.current_step(), Some(2));
        assert_eq!(session.backend.counter(Counter::SavedLives), Some(2));
    }
}
