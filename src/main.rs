//! # Delve Main Entry Point
//!
//! Runs a headless session driven by the autoplayer and prints a summary.

use clap::Parser;
use delve::{
    config, Autoplayer, DungeonResult, GameStatus, MoveOutcome, SessionConfig, SharedSession,
    TextRenderer,
};
use std::time::Duration;
#[cfg(feature = "dev-tools")]
use tracing::{info, warn, Level};

#[cfg(not(feature = "dev-tools"))]
use log::{info, warn};

/// Command line arguments for Delve.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Procedural dungeon generator and turn-based survival loop")]
#[command(version)]
struct Args {
    /// Random seed for level generation and monster movement
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Maximum number of moves to play
    #[arg(short, long, default_value_t = 5000)]
    turns: u64,

    /// Pause after a level is cleared, in milliseconds
    #[arg(long, default_value_t = config::LEVEL_CLEAR_DWELL.as_millis() as u64)]
    dwell_ms: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the final map
    #[arg(long)]
    show_map: bool,
}

#[tokio::main]
async fn main() -> DungeonResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Delve v{} with seed {}", delve::VERSION, args.seed);

    let dwell = Duration::from_millis(args.dwell_ms);
    let session = SharedSession::new(SessionConfig::new(args.seed).with_dwell(dwell)).await;
    let mut autoplayer = Autoplayer::new(args.seed);

    let mut moves = 0;
    while moves < args.turns {
        let (status, next) = session
            .with_state(|state| (state.status(), autoplayer.next_move(state)))
            .await;

        match (status, next) {
            (GameStatus::LevelCleared, _) => {
                // The session timer completes the transition
                tokio::time::sleep(dwell + Duration::from_millis(1)).await;
            }
            (status, _) if status.is_terminal() => break,
            (_, Some(direction)) => {
                let report = session.resolve_move(direction).await;
                moves += 1;
                match report.outcome {
                    MoveOutcome::Died => warn!("Player died after {} moves", moves),
                    MoveOutcome::LevelCleared => info!("Level cleared after {} moves", moves),
                    _ => {}
                }
            }
            (_, None) => {
                warn!("Player cannot move; stopping");
                break;
            }
        }
    }

    let (summary, statistics) = session
        .with_state(|state| (delve::status_line(&state.snapshot()), state.statistics().clone()))
        .await;

    if args.show_map {
        print!("{}", TextRenderer::default().render_map(&session.snapshot().await));
    }
    println!("{summary}");
    println!(
        "Moves {}  Steps {}  Blocked {}  Gold {}  Damage {}  Levels cleared {}  Deepest {}",
        moves,
        statistics.steps_taken,
        statistics.blocked_moves,
        statistics.gold_collected,
        statistics.damage_taken,
        statistics.levels_cleared,
        statistics.max_depth_reached
    );
    info!("Wandered {} times without a path to gold", autoplayer.wander_moves);

    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .init();
    }
}
