//! Headless runner for the shipped level.
//!
//! Loads the game config, builds level A and drives it at a fixed step. Input
//! comes from a replay script when one is given, otherwise the hero idles.
//! A hero death rebuilds the level and play resumes immediately.
//!
//! Example:
//!   cargo run -p hb_game -- --replay assets/replays/level_a_walk.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use hb_core::time::TimeState;
use hb_game::config::{load_config_from_path, GameConfig};
use hb_game::level::LevelStatus;
use hb_game::levels::{level_a, start_play, LEVEL_A};
use hb_game::replay::{load_replay_from_path, ReplayFrame};
use hb_game::runner::LevelRunner;

const IDLE_FRAMES: usize = 600;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a platformer level headless", long_about = None)]
struct Args {
    /// Game config JSON. Every field is optional.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Replay script driving the hero.
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Frames to simulate. Defaults to the replay length, or 600 without one.
    #[arg(long)]
    frames: Option<usize>,
    /// Directory asset paths are resolved against.
    #[arg(long, default_value = ".")]
    assets: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config_from_path(path)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("load config {}", path.display()))?,
        None => GameConfig::default(),
    };
    let replay = match &args.replay {
        Some(path) => Some(
            load_replay_from_path(path)
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("load replay {}", path.display()))?,
        ),
        None => None,
    };

    let frames: Vec<ReplayFrame> = replay
        .as_ref()
        .map(|r| r.expanded_frames())
        .unwrap_or_default();
    let frame_count = args.frames.unwrap_or(if frames.is_empty() {
        IDLE_FRAMES
    } else {
        frames.len()
    });
    let frame_dt_ms = replay
        .as_ref()
        .map_or(config.fixed_dt_ms, |r| r.fixed_dt_ms);

    log::info!(
        "Running '{}' for {} frames ({:.3}ms per frame, assets from {})",
        LEVEL_A,
        frame_count,
        frame_dt_ms,
        args.assets.display()
    );

    let bindings = config
        .controls
        .bindings()
        .map_err(anyhow::Error::msg)
        .context("resolve key bindings")?;
    let mut time = TimeState::new(config.fixed_dt_ms);
    let mut runner = LevelRunner::new(LEVEL_A, level_a, config, args.assets.clone());
    start_play(runner.start().context("start level")?);

    for index in 0..frame_count {
        let frame = frames.get(index).copied().unwrap_or_default();
        time.advance(frame_dt_ms);
        while time.should_step() {
            let level = runner.level_mut().context("no active level")?;
            frame.apply(&bindings, &mut level.input);
            let status = runner
                .tick(time.total_time_ms, time.fixed_dt_ms)
                .with_context(|| format!("step {}", time.fixed_step_count))?;
            if status == LevelStatus::ReloadRequested {
                start_play(runner.level_mut().context("no level after reload")?);
            }
        }
    }

    let level = runner.level().context("no active level")?;
    let hero = level
        .hero
        .and_then(|hero| level.display.position(hero))
        .map(|p| format!("({:.1}, {:.1})", p.x, p.y))
        .unwrap_or_else(|| "gone".to_string());
    log::info!(
        "Finished after {} fixed steps: hero at {}, {} entities, {} reloads",
        time.fixed_step_count,
        hero,
        level.entities().len(),
        runner.reloads()
    );
    for (slot, count) in level.inventory.slots() {
        log::info!("  inventory {slot}: {count}");
    }

    Ok(())
}
