use anyhow::{Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{path::PathBuf, str::FromStr, time::Duration};
use structopt::StructOpt;
use winit::event::{ElementState, VirtualKeyCode};

use platformer::{
    character_controller::Tuning,
    game_controller::{Event, GameController},
    input::InputState,
    level_loader::Level,
};

// ---------------------------------------------------------------------------------------------------------------------

/// Which keys get pressed, tick by tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    HoldRight,
    Idle,
    Random,
}

impl FromStr for Script {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "hold-right" => Ok(Script::HoldRight),
            "idle" => Ok(Script::Idle),
            "random" => Ok(Script::Random),
            _ => Err(format!(
                "Unknown script \"{}\", expected one of hold-right, idle, random",
                s
            )),
        }
    }
}

const RANDOM_KEYS: [VirtualKeyCode; 4] = [
    VirtualKeyCode::Left,
    VirtualKeyCode::Right,
    VirtualKeyCode::Space,
    VirtualKeyCode::Down,
];

// chance per tick that the random script toggles one key
const RANDOM_TOGGLE_PROBABILITY: f64 = 0.1;

impl Script {
    fn drive(&self, tick: u32, input: &mut InputState, rng: &mut StdRng) {
        match self {
            Script::HoldRight => {
                if tick == 0 {
                    input.process_keyboard(VirtualKeyCode::Right, ElementState::Pressed);
                }
            }
            Script::Idle => {}
            Script::Random => {
                if rng.gen_bool(RANDOM_TOGGLE_PROBABILITY) {
                    let key = RANDOM_KEYS[rng.gen_range(0..RANDOM_KEYS.len())];
                    let held = input
                        .get_button_state(key)
                        .map(|state| state.is_active())
                        .unwrap_or(false);
                    let state = if held {
                        ElementState::Released
                    } else {
                        ElementState::Pressed
                    };
                    input.process_keyboard(key, state);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(StructOpt, Debug)]
#[structopt(name = "platformer", about = "Runs platformer levels headlessly")]
struct Options {
    /// Number of ticks to simulate
    #[structopt(short, long, default_value = "600")]
    ticks: u32,

    /// Simulated frame rate
    #[structopt(short, long, default_value = "165")]
    fps: f32,

    /// Input script: hold-right, idle or random
    #[structopt(short, long, default_value = "hold-right")]
    script: Script,

    /// Seed for the random script
    #[structopt(long, default_value = "0")]
    seed: u64,

    /// Level descriptors, played in order. With none, the body runs on a flat ground line.
    #[structopt(parse(from_os_str))]
    levels: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------------------------------------------------

// longest tick the runner will simulate
const MAX_FRAME_PERIOD_SECS: f32 = 3600.0;

/// Tick length for a frame rate; rates so small their period can't be a Duration are rejected too
fn frame_duration(fps: f32) -> Result<Duration> {
    let period = 1.0 / fps;
    if !(fps > 0.0 && fps.is_finite() && period.is_finite() && period <= MAX_FRAME_PERIOD_SECS) {
        anyhow::bail!("--fps must be a positive number, got {}", fps);
    }
    Ok(Duration::from_secs_f32(period))
}

fn main() -> Result<()> {
    env_logger::init();
    let opt = Options::from_args();

    let dt = frame_duration(opt.fps)?;

    let levels = opt
        .levels
        .iter()
        .map(|path| {
            Level::load(path).with_context(|| format!("Expected to load {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut controller = GameController::new(levels, Tuning::default())?;
    let mut input = InputState::with_default_layout();
    let mut rng = StdRng::seed_from_u64(opt.seed);

    let mut levels_completed = 0;
    let mut respawns = 0;

    for tick in 0..opt.ticks {
        opt.script.drive(tick, &mut input, &mut rng);
        let buttons = input.snapshot();

        for event in controller.update(dt, &buttons) {
            log::info!("tick {}: {:?}", tick, event);
            match event {
                Event::LevelAdvanced { .. } => levels_completed += 1,
                Event::Respawned => respawns += 1,
                Event::AllLevelsComplete => {}
            }
        }

        input.update();
    }

    let body = controller.body();
    println!(
        "{} ticks: level {} of {}, {} levels completed, {} respawns",
        opt.ticks,
        controller.current_level_index(),
        controller.level_count(),
        levels_completed,
        respawns
    );
    println!(
        "body at ({:.2}, {:.2}) velocity ({:.2}, {:.2}) stance {}",
        body.position().x,
        body.position().y,
        body.velocity().x,
        body.velocity().y,
        body.stance()
    );

    Ok(())
}
