//! Bounce game loop
//!
//! Owns the collider world (three walls, the paddle, score pickups), the
//! arcade ball and the score. The bottom of the field is open: a ball that
//! slips past the paddle falls until it crosses the death line.

use glam::Vec2;

use super::collider::{ColliderId, ColliderSet, Shape};
use super::kinematic::ArcadeBall;
use super::score::BounceScore;
use crate::highscores::BestScore;
use crate::settings::{ArenaTuning, BounceTuning};

pub const WALL_LAYER: u32 = 0;
pub const PADDLE_LAYER: u32 = 1;
pub const PICKUP_LAYER: u32 = 2;

/// Trigger that awards points the first time the ball overlaps it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub collider: ColliderId,
    pub points: u64,
}

/// Summary of what happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BounceTickReport {
    pub paddle_bounces: u32,
    pub points: u64,
    /// New speed tier, if it changed this tick
    pub speed_tier: Option<u8>,
    pub died: bool,
}

/// Top, left and right walls around the field; no floor
pub fn build_arena(colliders: &mut ColliderSet, arena: &ArenaTuning) -> [ColliderId; 3] {
    let half = arena.half_extents;
    let t = arena.wall_thickness;
    let top = colliders.add(
        Shape::Box {
            center: Vec2::new(0.0, half.y + t * 0.5),
            half_extents: Vec2::new(half.x + t, t * 0.5),
        },
        WALL_LAYER,
        false,
    );
    let left = colliders.add(
        Shape::Box {
            center: Vec2::new(-half.x - t * 0.5, 0.0),
            half_extents: Vec2::new(t * 0.5, half.y + t),
        },
        WALL_LAYER,
        false,
    );
    let right = colliders.add(
        Shape::Box {
            center: Vec2::new(half.x + t * 0.5, 0.0),
            half_extents: Vec2::new(t * 0.5, half.y + t),
        },
        WALL_LAYER,
        false,
    );
    [top, left, right]
}

#[derive(Debug)]
pub struct BounceGame {
    pub ball: ArcadeBall,
    pub colliders: ColliderSet,
    pub score: BounceScore,
    pub best: BestScore,
    arena: ArenaTuning,
    paddle: ColliderId,
    paddle_x: f32,
    pickups: Vec<Pickup>,
    game_over: bool,
}

impl BounceGame {
    pub fn new(tuning: &BounceTuning, seed: u64) -> Self {
        let arena = tuning.arena.clone();
        let mut colliders = ColliderSet::new();
        build_arena(&mut colliders, &arena);
        let paddle = colliders.add(
            Shape::Box {
                center: Vec2::new(0.0, arena.paddle_y),
                half_extents: arena.paddle_half_extents,
            },
            PADDLE_LAYER,
            false,
        );

        let mut ball = ArcadeBall::new(tuning, seed);
        ball.set_paddle(Some(paddle));
        ball.set_collision_mask((1 << WALL_LAYER) | (1 << PADDLE_LAYER));
        ball.reset_from_spawn_point(arena.spawn_point);

        Self {
            ball,
            colliders,
            score: BounceScore::new(tuning.speed_milestones.clone()),
            best: BestScore::new(),
            arena,
            paddle,
            paddle_x: 0.0,
            pickups: Vec::new(),
            game_over: false,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn paddle(&self) -> ColliderId {
        self.paddle
    }

    pub fn paddle_x(&self) -> f32 {
        self.paddle_x
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    /// Place a score pickup in the field
    pub fn add_pickup(&mut self, pos: Vec2, radius: f32, points: u64) -> ColliderId {
        let collider = self.colliders.add(
            Shape::Circle {
                center: pos,
                radius,
            },
            PICKUP_LAYER,
            true,
        );
        self.pickups.push(Pickup { collider, points });
        collider
    }

    /// Ease the paddle toward the pointer, kept inside the padded field
    pub fn move_paddle(&mut self, pointer_x: f32, dt: f32) {
        let limit = (self.arena.half_extents.x - self.arena.paddle_padding).max(0.0);
        let target = pointer_x.clamp(-limit, limit);
        let k = (self.arena.paddle_lerp * dt).clamp(0.0, 1.0);
        self.paddle_x += (target - self.paddle_x) * k;
        self.colliders
            .set_center(self.paddle, Vec2::new(self.paddle_x, self.arena.paddle_y));
    }

    /// Advance the game by one fixed timestep
    /// `ball.events` keeps only this tick's events afterwards
    pub fn step(&mut self, pointer_x: f32, dt: f32) -> BounceTickReport {
        let mut report = BounceTickReport::default();
        if self.game_over {
            return report;
        }

        self.ball.events.clear();
        self.move_paddle(pointer_x, dt);

        let was_launched = self.ball.is_launched();
        let bounces_before = self.ball.bounce_count();
        self.ball.fixed_update(&self.colliders, dt);
        report.paddle_bounces = self.ball.bounce_count() - bounces_before;

        for _ in 0..report.paddle_bounces {
            if let Some(tier) = self.score.on_paddle_bounce() {
                report.speed_tier = Some(tier);
            }
        }
        report.points += report.paddle_bounces as u64;

        let touched = self.colliders.overlap_triggers(
            self.ball.position(),
            self.ball.radius(),
            1 << PICKUP_LAYER,
        );
        for id in touched {
            let Some(idx) = self.pickups.iter().position(|p| p.collider == id) else {
                continue;
            };
            let pickup = self.pickups.remove(idx);
            self.colliders.remove(pickup.collider);
            report.points += pickup.points;
            if let Some(tier) = self.score.add_score_point(pickup.points) {
                report.speed_tier = Some(tier);
            }
        }

        if let Some(tier) = report.speed_tier {
            self.ball.apply_speed_tier(tier);
        }

        self.ball.update(dt);
        if was_launched && !self.ball.is_launched() {
            let total = self.score.total();
            log::info!("Bounce game over with score {}", total);
            self.best.submit(total);
            self.game_over = true;
            report.died = true;
        }

        report
    }

    /// Fresh run: score, tier and speed back to the start, pickups cleared
    pub fn reset(&mut self) {
        self.best.submit(self.score.total());
        self.score.reset();
        self.ball.reset_tier_and_bounce();
        self.ball.reset_from_spawn_point(self.arena.spawn_point);
        self.ball.events.clear();
        for pickup in self.pickups.drain(..) {
            self.colliders.remove(pickup.collider);
        }
        self.paddle_x = 0.0;
        self.colliders
            .set_center(self.paddle, Vec2::new(0.0, self.arena.paddle_y));
        self.game_over = false;
    }

    /// Relaunch after a death keeping score and tiers
    pub fn continue_run(&mut self) {
        self.ball.continue_from_spawn_point(self.arena.spawn_point);
        self.game_over = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounce::collider::CircleCaster;
    use crate::bounce::kinematic::BounceEvent;
    use crate::consts::SIM_DT;

    fn run_until_over(game: &mut BounceGame, pointer_x: f32) -> usize {
        for tick in 0..10_000 {
            if game.step(pointer_x, SIM_DT).died {
                return tick;
            }
        }
        panic!("ball never died");
    }

    #[test]
    fn test_arena_has_no_floor() {
        let mut colliders = ColliderSet::new();
        build_arena(&mut colliders, &ArenaTuning::default());
        assert_eq!(colliders.len(), 3);
        let down = colliders.circle_cast(Vec2::ZERO, 0.25, -Vec2::Y, 100.0, !0);
        assert!(down.is_empty());
        let up = colliders.circle_cast(Vec2::ZERO, 0.25, Vec2::Y, 100.0, !0);
        assert!((up[0].distance - 4.75).abs() < 1e-4);
    }

    #[test]
    fn test_paddle_lerps_and_clamps() {
        let mut game = BounceGame::new(&BounceTuning::default(), 1);
        game.move_paddle(1.0, SIM_DT);
        assert!((game.paddle_x() - 0.4).abs() < 1e-5);

        for _ in 0..100 {
            game.move_paddle(50.0, SIM_DT);
        }
        assert!((game.paddle_x() - 2.3).abs() < 1e-4);
        let bounds = game.colliders.bounds(game.paddle()).unwrap();
        assert!((bounds.center - Vec2::new(2.3, -4.0)).length() < 1e-4);
    }

    #[test]
    fn test_missed_ball_ends_game() {
        let tuning = BounceTuning {
            initial_dir: Vec2::new(0.0, -1.0),
            ..BounceTuning::default()
        };
        let mut game = BounceGame::new(&tuning, 3);
        game.add_pickup(Vec2::new(0.0, -1.0), 0.2, 7);
        // Paddle parked far away
        run_until_over(&mut game, -10.0);

        assert!(game.is_game_over());
        assert_eq!(game.score.total(), 7);
        assert_eq!(game.best.score, 7);
        assert!(game.ball.events.drain().contains(&BounceEvent::Death));
        assert_eq!(game.step(0.0, SIM_DT), BounceTickReport::default());
    }

    #[test]
    fn test_pickup_is_collected_once() {
        let mut game = BounceGame::new(&BounceTuning::default(), 3);
        let id = game.add_pickup(Vec2::ZERO, 0.3, 5);
        let report = game.step(0.0, SIM_DT);
        assert_eq!(report.points, 5);
        assert!(game.pickups().is_empty());
        assert!(game.colliders.get(id).is_none());
        assert_eq!(game.step(0.0, SIM_DT).points, 0);
    }

    #[test]
    fn test_big_pickup_raises_speed_tier() {
        let mut game = BounceGame::new(&BounceTuning::default(), 3);
        game.add_pickup(Vec2::ZERO, 0.3, 45);
        let report = game.step(0.0, SIM_DT);
        assert_eq!(report.speed_tier, Some(2));
        assert_eq!(game.ball.speed_tier(), 2);
        assert!((game.ball.speed() - 13.0 * 1.4).abs() < 1e-4);
    }

    #[test]
    fn test_tracking_paddle_keeps_rally_alive() {
        let mut tuning = BounceTuning::default();
        tuning.arena.paddle_lerp = 1000.0;
        let mut game = BounceGame::new(&tuning, 8);

        let mut bounces = 0;
        for _ in 0..3000 {
            let x = game.ball.position().x;
            bounces += game.step(x, SIM_DT).paddle_bounces;
        }
        assert!(!game.is_game_over());
        assert!(bounces >= 3);
        assert_eq!(game.score.bounce_number(), bounces as u64);
    }

    #[test]
    fn test_continue_then_reset() {
        let tuning = BounceTuning {
            initial_dir: Vec2::new(0.0, -1.0),
            ..BounceTuning::default()
        };
        let mut game = BounceGame::new(&tuning, 3);
        game.ball.set_tier(2);
        game.add_pickup(Vec2::new(0.0, -1.0), 0.2, 3);
        let leftover = game.add_pickup(Vec2::new(2.0, 4.0), 0.2, 50);
        run_until_over(&mut game, -10.0);

        game.continue_run();
        assert!(!game.is_game_over());
        assert!(game.ball.is_launched());
        assert_eq!(game.ball.tier(), 2);
        assert_eq!(game.score.total(), 3);

        game.reset();
        assert_eq!(game.ball.tier(), 1);
        assert_eq!(game.score.total(), 0);
        assert_eq!(game.ball.position(), Vec2::ZERO);
        assert_eq!(game.paddle_x(), 0.0);
        assert_eq!(game.best.score, 3);
        assert!(game.pickups().is_empty());
        assert!(game.colliders.get(leftover).is_none());
        // Walls and paddle survive
        assert_eq!(game.colliders.len(), 4);
    }

    #[test]
    fn test_event_queue_holds_one_tick() {
        let mut tuning = BounceTuning::default();
        tuning.arena.paddle_lerp = 1000.0;
        let mut game = BounceGame::new(&tuning, 8);
        let bounces = std::rc::Rc::new(std::cell::Cell::new(0u32));
        let counter = std::rc::Rc::clone(&bounces);
        game.ball.events.subscribe(move |e: &BounceEvent| {
            if matches!(e, BounceEvent::PaddleBounce { .. }) {
                counter.set(counter.get() + 1);
            }
        });

        for _ in 0..3000 {
            let x = game.ball.position().x;
            game.step(x, SIM_DT);
            assert!(game.ball.events.pending().len() <= 8);
        }
        assert_eq!(bounces.get(), game.ball.bounce_count());
    }
}
