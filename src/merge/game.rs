//! Merge game loop
//!
//! One fixed tick: dropper, physics, merge resolution, scoring, unlocks and the
//! lose line, in that order.

use super::arena::BoxArena;
use super::ball::BallId;
use super::dropper::{DropInput, Dropper};
use super::manager::{MergeEvent, MergeManager};
use super::physics::BallPhysics;
use super::score::MergeScore;
use crate::highscores::BestScore;
use crate::settings::MergeTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePhase {
    Playing,
    GameOver,
}

/// Summary of what happened during one tick
#[derive(Debug, Clone, Default)]
pub struct MergeTickReport {
    pub dropped: Option<BallId>,
    pub merges: usize,
    pub points: u64,
}

#[derive(Debug)]
pub struct MergeGame {
    pub manager: MergeManager,
    pub dropper: Dropper,
    pub physics: BallPhysics,
    pub arena: BoxArena,
    pub score: MergeScore,
    pub best: BestScore,
    phase: MergePhase,
    lose_line_y: f32,
    upward_threshold: f32,
}

impl MergeGame {
    pub fn new(tuning: &MergeTuning, seed: u64) -> Self {
        Self {
            manager: MergeManager::new(tuning, seed),
            dropper: Dropper::new(tuning.dropper.clone()),
            physics: BallPhysics::new(tuning.physics.clone()),
            arena: BoxArena::default(),
            score: MergeScore::new(tuning.scoring.clone()),
            best: BestScore::new(),
            phase: MergePhase::Playing,
            lose_line_y: tuning.lose_line_y,
            upward_threshold: tuning.upward_threshold,
        }
    }

    pub fn phase(&self) -> MergePhase {
        self.phase
    }

    /// Advance the game by one fixed timestep
    ///
    /// Events published during the tick stay in `manager.events` until the
    /// next tick starts.
    pub fn tick(&mut self, input: &DropInput, dt: f32) -> MergeTickReport {
        let mut report = MergeTickReport::default();
        if self.phase == MergePhase::GameOver {
            return report;
        }

        // The queue only holds the latest tick; subscribers already saw the rest
        self.manager.events.clear();
        self.manager.advance_time(dt);
        let now = self.manager.time();

        report.dropped = self.dropper.update(&mut self.manager, input, now);
        self.arena.step(&mut self.manager, &self.physics, dt);
        report.merges = self.manager.resolve_contacts();

        for event in self.manager.events.pending() {
            if let MergeEvent::Merged { level, .. } = *event {
                report.points += self.score.on_merged(level, now);
            }
        }
        self.manager.sync_progress_from_external_score(self.score.total());

        if self.crossed_lose_line() {
            let score = self.score.total();
            log::info!("Merge game over with score {}", score);
            self.best.submit(score);
            self.phase = MergePhase::GameOver;
            self.manager.events.publish(MergeEvent::GameOver { score });
        }

        report
    }

    /// A simulated ball touching the line while rising (stack has grown too tall)
    fn crossed_lose_line(&self) -> bool {
        self.manager.balls().iter().any(|ball| {
            ball.simulated
                && (ball.pos.y - self.lose_line_y).abs() <= ball.radius
                && ball.vel.y > self.upward_threshold
        })
    }

    /// Clear the bucket and start over (best score is kept)
    pub fn reset(&mut self) {
        self.best.submit(self.score.total());
        self.manager.clear();
        self.manager.events.clear();
        self.dropper.reset();
        self.score.reset();
        self.phase = MergePhase::Playing;
    }
}
