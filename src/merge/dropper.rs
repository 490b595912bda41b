//! Dropper: holds the next ball above the bucket and releases it on pointer-up

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ball::BallId;
use super::manager::{MergeEvent, MergeManager};
use crate::settings::DropperTuning;

/// Pointer input for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct DropInput {
    /// World-space pointer X
    pub pointer_x: f32,
    /// Pointer/touch went up this frame
    pub released: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropperState {
    Idle,
    Holding { ball: BallId },
}

#[derive(Debug, Clone)]
pub struct Dropper {
    tuning: DropperTuning,
    state: DropperState,
    last_drop_at: f32,
}

impl Dropper {
    pub fn new(tuning: DropperTuning) -> Self {
        Self {
            tuning,
            state: DropperState::Idle,
            last_drop_at: f32::NEG_INFINITY,
        }
    }

    pub fn state(&self) -> DropperState {
        self.state
    }

    pub fn held_ball(&self) -> Option<BallId> {
        match self.state {
            DropperState::Holding { ball } => Some(ball),
            DropperState::Idle => None,
        }
    }

    pub fn can_drop(&self, now: f32) -> bool {
        now - self.last_drop_at >= self.tuning.drop_cooldown
    }

    /// Advance one tick
    /// Returns the id of the ball released this tick, if any
    pub fn update(
        &mut self,
        manager: &mut MergeManager,
        input: &DropInput,
        now: f32,
    ) -> Option<BallId> {
        // Held ball can vanish on a scene reset
        if let DropperState::Holding { ball } = self.state {
            if manager.ball(ball).is_none() {
                self.state = DropperState::Idle;
            }
        }

        if self.state == DropperState::Idle {
            let level = manager.pick_droppable_level();
            let spawn = Vec2::new(0.0, self.tuning.y_spawn);
            let ball = manager.spawn_ball(level, spawn)?;
            if let Some(held) = manager.ball_mut(ball) {
                held.simulated = false;
            }
            self.state = DropperState::Holding { ball };
        }

        let DropperState::Holding { ball: id } = self.state else {
            return None;
        };
        let x = input.pointer_x.clamp(self.tuning.x_min, self.tuning.x_max);
        let ball = manager.ball_mut(id)?;
        ball.pos = Vec2::new(x, self.tuning.y_spawn);

        if !(input.released && self.can_drop(now)) {
            return None;
        }

        ball.simulated = true;
        ball.wake();
        // Small downward nudge so the ball never rests motionless at spawn
        ball.vel = Vec2::NEG_Y * (self.tuning.drop_impulse / ball.mass);
        let level = ball.level;

        self.last_drop_at = now;
        self.state = DropperState::Idle;
        log::debug!("Dropped ball {} (level {}) at x={:.2}", id, level, x);
        manager.events.publish(MergeEvent::Dropped { id, level });
        Some(id)
    }

    /// Forget the held ball and the cooldown
    pub fn reset(&mut self) {
        self.state = DropperState::Idle;
        self.last_drop_at = f32::NEG_INFINITY;
    }
}
