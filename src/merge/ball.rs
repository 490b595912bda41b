//! Merge ball entity
//!
//! Physical state (position, velocities, sleep) is written by whatever rigid-body
//! engine hosts the balls; the simulator reads it and owns the rest.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::BallType;

/// Stable entity id (allocation order)
pub type BallId = u32;

/// A ball in the merge bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    /// Index into the ball-type table; never changes after spawn
    pub level: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees per second
    pub angular_vel: f32,
    pub radius: f32,
    pub mass: f32,
    /// False while held by the dropper (no gravity, no collisions)
    pub simulated: bool,
    pub sleeping: bool,
    /// Simulation time the ball was created
    pub spawned_at: f32,
    /// Result of the last ground probe
    #[serde(default)]
    pub grounded: bool,
    /// Consecutive grounded-and-still ticks
    #[serde(default)]
    pub stable_frames: u32,
    /// Claimed by a merge this step
    #[serde(skip)]
    pub(crate) merging: bool,
}

impl Ball {
    pub fn new(id: BallId, level: usize, kind: &BallType, pos: Vec2, now: f32) -> Self {
        Self {
            id,
            level,
            pos,
            vel: Vec2::ZERO,
            angular_vel: 0.0,
            radius: kind.radius,
            mass: kind.mass,
            simulated: true,
            sleeping: false,
            spawned_at: now,
            grounded: false,
            stable_frames: 0,
            merging: false,
        }
    }

    pub fn is_merging(&self) -> bool {
        self.merging
    }

    /// Same-level pair below the top level, neither already claimed
    pub fn can_merge_with(&self, other: &Ball, max_level: usize) -> bool {
        !self.merging && !other.merging && self.level == other.level && self.level < max_level
    }

    pub fn wake(&mut self) {
        self.sleeping = false;
        self.stable_frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn golf() -> BallType {
        BallType::new("Golf", 0.2, 0.5)
    }

    #[test]
    fn test_new_ball_takes_type_shape() {
        let ball = Ball::new(3, 0, &golf(), Vec2::new(1.0, 2.0), 0.5);
        assert_eq!(ball.radius, 0.2);
        assert_eq!(ball.mass, 0.5);
        assert!(ball.simulated);
        assert!(!ball.is_merging());
    }

    #[test]
    fn test_can_merge_with() {
        let a = Ball::new(1, 2, &golf(), Vec2::ZERO, 0.0);
        let b = Ball::new(2, 2, &golf(), Vec2::ZERO, 0.0);
        let c = Ball::new(3, 1, &golf(), Vec2::ZERO, 0.0);
        assert!(a.can_merge_with(&b, 6));
        assert!(!a.can_merge_with(&c, 6));
        // Top level never merges
        assert!(!a.can_merge_with(&b, 2));

        let mut claimed = b.clone();
        claimed.merging = true;
        assert!(!a.can_merge_with(&claimed, 6));
    }
}
