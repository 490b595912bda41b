//! Merge Bounce headless runner
//!
//! Plays a scripted session of each minigame with a fixed-timestep loop and
//! logs what happened. Usage:
//!
//! ```text
//! merge-bounce [settings.json] [seed] [best_score.json]
//! ```

use merge_bounce::bounce::BounceGame;
use merge_bounce::consts::{MAX_SUBSTEPS, SIM_DT};
use merge_bounce::merge::{DropInput, MergeGame, MergePhase};
use merge_bounce::{BestScore, Settings};

/// Simulated display refresh
const FRAME_DT: f32 = 1.0 / 60.0;
/// Length of each scripted session in seconds
const SESSION_SECONDS: f32 = 90.0;

/// Fixed-timestep driver for a variable frame rate
struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    fn new() -> Self {
        Self { accumulator: 0.0 }
    }

    /// Run as many fixed ticks as the frame time allows
    fn advance(&mut self, frame_dt: f32, mut tick: impl FnMut()) -> u32 {
        self.accumulator += frame_dt.min(0.1);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }
}

fn run_merge(settings: &Settings, seed: u64, best: &mut BestScore) {
    let mut game = MergeGame::new(&settings.merge, seed);
    game.best = *best;
    let mut clock = FrameClock::new();
    let (x_min, x_max) = (settings.merge.dropper.x_min, settings.merge.dropper.x_max);

    let frames = (SESSION_SECONDS / FRAME_DT) as u32;
    let mut drops = 0;
    let mut merges = 0;
    for frame in 0..frames {
        // Sweep the pointer back and forth, releasing every 40 frames
        let t = frame as f32 * FRAME_DT;
        let sweep = (t * 0.7).sin() * 0.5 + 0.5;
        let mut input = DropInput {
            pointer_x: x_min + (x_max - x_min) * sweep,
            released: frame % 40 == 39,
        };

        clock.advance(FRAME_DT, || {
            let report = game.tick(&input, SIM_DT);
            if report.dropped.is_some() {
                drops += 1;
            }
            merges += report.merges;
            // Release is a one-shot input
            input.released = false;
        });

        if game.phase() == MergePhase::GameOver {
            break;
        }
    }

    let top_level = game.manager.balls().iter().map(|b| b.level).max();
    log::info!(
        "Merge session: {} drops, {} merges, score {}, top level {:?}, drop ceiling {}, {:?}",
        drops,
        merges,
        game.score.total(),
        top_level,
        game.manager.current_max_drop_level(),
        game.phase()
    );
    game.best.submit(game.score.total());
    best.submit(game.best.score);
}

fn run_bounce(settings: &Settings, seed: u64, best: &mut BestScore) {
    let mut game = BounceGame::new(&settings.bounce, seed);
    game.best = *best;
    let arena = &settings.bounce.arena;
    for i in 0..5 {
        let x = (i as f32 - 2.0) * arena.half_extents.x * 0.35;
        game.add_pickup(glam::Vec2::new(x, arena.half_extents.y * 0.5), 0.3, 5);
    }

    let mut clock = FrameClock::new();
    let frames = (SESSION_SECONDS / FRAME_DT) as u32;
    let mut continues = 1;
    let mut bounces = 0;
    for _ in 0..frames {
        // The paddle chases the ball with a small lag
        let pointer_x = game.ball.position().x * 0.9;
        clock.advance(FRAME_DT, || {
            bounces += game.step(pointer_x, SIM_DT).paddle_bounces;
        });

        if game.is_game_over() {
            if continues == 0 {
                break;
            }
            continues -= 1;
            log::info!("Continuing at score {}", game.score.total());
            game.continue_run();
        }
    }

    log::info!(
        "Bounce session: {} paddle bounces, score {}, tier {}, speed tier {}, game over: {}",
        bounces,
        game.score.total(),
        game.ball.tier(),
        game.ball.speed_tier(),
        game.is_game_over()
    );
    game.best.submit(game.score.total());
    best.submit(game.best.score);
}

fn main() {
    env_logger::init();
    log::info!("Merge Bounce (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().unwrap_or_else(|| "settings.json".to_string());
    let settings = match Settings::load_or_default(&settings_path) {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Failed to load settings: {}", err);
            std::process::exit(1);
        }
    };
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    let best_path = args.next();

    let mut best = best_path
        .as_deref()
        .map(BestScore::load)
        .unwrap_or_default();
    log::info!("Running with seed {}", seed);

    run_merge(&settings, seed, &mut best);
    run_bounce(&settings, seed, &mut best);

    log::info!("Best score: {}", best.score);
    if let Some(path) = best_path {
        if let Err(err) = best.save(&path) {
            log::warn!("Failed to save best score: {}", err);
        }
    }
}
