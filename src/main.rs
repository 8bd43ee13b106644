//! Tidepool headless host
//!
//! Loads levels, then drives the simulation through the fixed-timestep clock
//! at a virtual frame rate with the autopilot at the controls. Rendering and
//! audio hosts do the same loop with real frame deltas and real input.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use tidepool::sim::{GameEvent, GamePhase, GameState, SimulationClock, TickInput, tick};
use tidepool::{LevelData, LevelSet, SimConfig};

/// Width of generated levels, in tiles
const GENERATED_LEVEL_WIDTH: usize = 60;
/// Generated levels when no level files are given
const GENERATED_LEVEL_COUNT: u64 = 3;

#[derive(Parser)]
#[command(name = "tidepool")]
#[command(author, version, about = "Headless platformer simulation", long_about = None)]
struct Cli {
    /// Level files (JSON, or ASCII maps with a .txt extension)
    levels: Vec<PathBuf>,

    /// SimConfig JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds of virtual time to simulate
    #[arg(short, long, default_value_t = 60.0)]
    seconds: f32,

    /// Seed for generated levels
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Virtual frames per second fed to the clock
    #[arg(long, default_value_t = 120.0)]
    fps: f32,
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = SimConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn load_levels(paths: &[PathBuf], seed: u64) -> Result<LevelSet> {
    let levels = if paths.is_empty() {
        info!("no level files given, generating {GENERATED_LEVEL_COUNT} levels from seed {seed}");
        (0..GENERATED_LEVEL_COUNT)
            .map(|i| LevelData::generate(seed.wrapping_add(i), GENERATED_LEVEL_WIDTH))
            .collect()
    } else {
        paths
            .iter()
            .map(|path| {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let data = if path.extension().is_some_and(|e| e == "txt") {
                    LevelData::from_ascii(&text)
                } else {
                    LevelData::from_json(&text)
                };
                data.with_context(|| format!("loading {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?
    };
    Ok(LevelSet::new(levels)?)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    let levels = load_levels(&cli.levels, cli.seed)?;
    info!("Tidepool starting with {} levels", levels.len());

    let mut clock = SimulationClock::new(&config);
    let mut state = GameState::new(config, levels)?;
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let frame_dt = 1.0 / cli.fps.max(1.0);
    let frames = (cli.seconds.max(0.0) * cli.fps.max(1.0)) as u64;
    let mut deaths = 0u32;
    let mut last_phase = state.phase;

    for _ in 0..frames {
        let ticks = clock.advance(frame_dt);
        for _ in 0..ticks {
            tick(&mut state, &input);
        }

        for event in state.drain_events() {
            match event {
                GameEvent::Death => deaths += 1,
                GameEvent::LevelCompleted | GameEvent::GameCompleted | GameEvent::GameOver => {
                    info!("{event:?}")
                }
                _ => debug!("{event:?}"),
            }
        }

        if state.phase != last_phase {
            debug!("phase {last_phase:?} -> {:?}", state.phase);
            last_phase = state.phase;
        }
        match state.phase {
            GamePhase::LevelCompleted | GamePhase::GameCompleted => {
                if let Err(err) = state.next_level() {
                    warn!("could not advance: {err}");
                    break;
                }
            }
            GamePhase::GameOver => state.retry(),
            _ => {}
        }
    }

    let elapsed = frames as f32 * frame_dt;
    let ups = if elapsed > 0.0 {
        clock.total_ticks() as f32 / elapsed
    } else {
        0.0
    };
    info!(
        "simulated {:.1}s: {} ticks ({ups:.0} UPS), level {}/{}, session time {:.1}s, {deaths} deaths",
        elapsed,
        clock.total_ticks(),
        state.level_index() + 1,
        state.level_count(),
        state.session_time().as_secs_f32(),
    );
    Ok(())
}
