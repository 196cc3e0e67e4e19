//! Hopper entry point
//!
//! Runs a level headless at a fixed 60 Hz with no player input and logs
//! every game event. Set `RUST_LOG=debug` for more detail.
//!
//! Usage: `hopper [LEVEL_DIR] [--save DIR] [--seconds N]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hopper::persistence::{load_level, save_level};
use hopper::{GameEvent, GameState, Level, TickInput, tick};

const FRAME_DT: f32 = 1.0 / 60.0;

/// Play a level headless and log what happens
#[derive(Parser, Debug)]
#[command(name = "hopper", version, about)]
struct Args {
    /// Level directory to load (the demo level when omitted)
    level_dir: Option<PathBuf>,

    /// Save the level into DIR when the run ends
    #[arg(long = "save", value_name = "DIR")]
    save_dir: Option<PathBuf>,

    /// Simulated time to run for
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let level = match &args.level_dir {
        Some(dir) => match load_level(dir) {
            Ok(level) => level,
            Err(err) => {
                log::error!("Failed to load level: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            log::info!("No level given, playing the demo level");
            Level::demo()
        }
    };

    let mut state = GameState::new(level);
    let input = TickInput::default();
    let seconds = args.seconds.max(0.0);
    let frames = (seconds / FRAME_DT).round() as u64;

    for frame in 0..frames {
        for event in tick(&mut state, &input, FRAME_DT) {
            let time = frame as f32 * FRAME_DT;
            match event {
                GameEvent::EnemyKilled(id) => log::info!("[{time:.2}s] enemy {id} killed"),
                other => log::info!("[{time:.2}s] {other:?}"),
            }
        }
    }
    log::info!(
        "Finished {frames} frames in phase {:?} with {} particles",
        state.phase,
        state.level.world.len()
    );

    if let Some(dir) = &args.save_dir {
        if let Err(err) = save_level(&state.level, dir) {
            log::error!("Failed to save level: {err}");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
