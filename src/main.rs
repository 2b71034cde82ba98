use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use grid_snake::clock::SystemClock;
use grid_snake::config::{EngineConfig, GridSize, THEME_CLASSIC};
use grid_snake::engine::SimulationEngine;
use grid_snake::game::GameStatus;
use grid_snake::geometry::BoundaryMode;
use grid_snake::input::{GameInput, InputHandler};
use grid_snake::renderer;
use grid_snake::runtime::GameLoop;
use grid_snake::score::{FileHighScoreStore, HighScoreStore};
use grid_snake::terminal::{TerminalSession, install_panic_hook};
use tracing::{debug, info};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(8);

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// JSON engine config; missing fields use the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Side length of a square board, overriding the config.
    #[arg(long)]
    grid_size: Option<u16>,

    /// Start in wrap mode instead of walled mode.
    #[arg(long)]
    wrap: bool,

    /// Seed the RNG for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (filtered by RUST_LOG).
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Clear the stored high score before starting.
    #[arg(long)]
    reset_high_score: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let config = load_config(&cli)?;
    let mut store = FileHighScoreStore::default_location();
    if cli.reset_high_score {
        store
            .save(0)
            .with_context(|| format!("failed to reset {}", store.path().display()))?;
    }

    let clock = SystemClock::new();
    let mut engine = match cli.seed {
        Some(seed) => SimulationEngine::with_seed(config, seed, clock, store)?,
        None => SimulationEngine::new(config, clock, store)?,
    };

    install_panic_hook();
    let mut session = TerminalSession::enter().context("failed to set up terminal")?;
    run(&mut session, &mut engine)?;
    drop(session);

    let snapshot = engine.snapshot();
    info!(
        score = snapshot.score,
        high_score = snapshot.high_score,
        "exiting"
    );
    Ok(())
}

fn run(session: &mut TerminalSession, engine: &mut SimulationEngine) -> Result<()> {
    let mut input = InputHandler::new(INPUT_POLL_TIMEOUT);
    let mut game_loop = GameLoop::new();

    loop {
        let snapshot = engine.snapshot();
        session
            .terminal_mut()
            .draw(|frame| renderer::render(frame, &snapshot, &THEME_CLASSIC))?;

        if let Some(game_input) = input.poll_input()? {
            if game_input == GameInput::Quit {
                engine.cancel();
                game_loop.cancel();
                break;
            }

            handle_input(engine, game_input);
        }

        game_loop.pump(engine);
    }

    Ok(())
}

fn handle_input(engine: &mut SimulationEngine, input: GameInput) {
    let game_over = engine.state().status == GameStatus::GameOver;
    let mode = engine.state().boundary_mode;

    let result = match input {
        GameInput::Direction(direction) => engine.set_intent(direction),
        GameInput::Pause | GameInput::Confirm if game_over => engine.reset(mode),
        GameInput::Pause => engine.toggle_pause(),
        GameInput::Confirm => Ok(()),
        GameInput::ToggleBoundary => engine.toggle_boundary_mode().map(|_| ()),
        GameInput::Quit => Ok(()),
    };

    if let Err(error) = result {
        debug!(?input, %error, "input rejected");
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    if let Some(size) = cli.grid_size {
        config.grid = GridSize::square(size);
    }
    if cli.wrap {
        config.boundary_mode = BoundaryMode::Wrap;
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();

    Ok(())
}
