//! Per-ball physics governor
//!
//! The rigid-body engine integrates the balls; this only decides drag, clamps
//! runaway velocities and puts settled balls to sleep.

use glam::Vec2;

use super::ball::Ball;
use crate::settings::BallPhysicsTuning;

/// Overlap query supplied by the physics provider
pub trait GroundProbe {
    /// Whether any ground collider overlaps the circle
    fn overlap_circle(&self, center: Vec2, radius: f32) -> bool;
}

/// Damping the physics provider should use for a ball this step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damping {
    pub linear: f32,
    pub angular: f32,
}

#[derive(Debug, Clone)]
pub struct BallPhysics {
    tuning: BallPhysicsTuning,
}

impl BallPhysics {
    pub fn new(tuning: BallPhysicsTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &BallPhysicsTuning {
        &self.tuning
    }

    /// Run once per fixed step for a simulated ball
    pub fn fixed_update(&self, ball: &mut Ball, probe: &impl GroundProbe, now: f32) -> Damping {
        let t = &self.tuning;

        let probe_center = ball.pos - Vec2::Y * (ball.radius + t.ground_probe_offset);
        ball.grounded = probe.overlap_circle(probe_center, t.ground_probe_radius);

        let damping = if ball.grounded {
            Damping {
                linear: t.ground_drag,
                angular: t.ground_angular_drag,
            }
        } else {
            Damping {
                linear: t.air_drag,
                angular: t.air_angular_drag,
            }
        };

        if ball.vel.length() > t.max_speed {
            ball.vel = ball.vel.normalize_or_zero() * t.max_speed;
        }
        ball.angular_vel = ball.angular_vel.clamp(-t.max_angular_vel, t.max_angular_vel);

        // Fresh balls are never put to sleep
        if now - ball.spawned_at < t.sleep_grace {
            return damping;
        }

        let very_slow = ball.vel.length_squared() < t.sleep_vel_sqr
            && ball.angular_vel.abs() < t.sleep_angular;
        if ball.grounded && very_slow {
            ball.stable_frames += 1;
            if ball.stable_frames >= t.stable_frames_to_sleep {
                ball.sleeping = true;
            }
        } else {
            ball.stable_frames = 0;
            if ball.sleeping {
                ball.wake();
            }
        }

        damping
    }

    /// Energy loss applied on every collision the ball takes part in
    pub fn on_impact(&self, ball: &mut Ball) {
        let keep = 1.0 - self.tuning.impact_damp;
        ball.vel *= keep;
        ball.angular_vel *= keep;
    }
}

/// Horizontal ground at a fixed height
#[derive(Debug, Clone, Copy)]
pub struct FlatGround {
    pub y: f32,
}

impl GroundProbe for FlatGround {
    fn overlap_circle(&self, center: Vec2, radius: f32) -> bool {
        center.y - radius <= self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BallType;

    fn resting_ball(now: f32) -> Ball {
        let mut ball = Ball::new(1, 0, &BallType::new("Golf", 0.2, 0.5), Vec2::ZERO, now);
        ball.pos = Vec2::new(0.0, 0.2);
        ball
    }

    #[test]
    fn test_grounded_ball_gets_ground_drag() {
        let physics = BallPhysics::new(BallPhysicsTuning::default());
        let mut ball = resting_ball(0.0);
        let damping = physics.fixed_update(&mut ball, &FlatGround { y: 0.0 }, 0.0);
        assert!(ball.grounded);
        assert_eq!(damping.linear, 3.5);
        assert_eq!(damping.angular, 7.0);

        let damping = physics.fixed_update(&mut ball, &FlatGround { y: -5.0 }, 0.0);
        assert!(!ball.grounded);
        assert_eq!(damping.linear, 0.05);
    }

    #[test]
    fn test_velocity_clamped() {
        let physics = BallPhysics::new(BallPhysicsTuning::default());
        let mut ball = resting_ball(0.0);
        ball.vel = Vec2::new(30.0, 40.0);
        ball.angular_vel = -500.0;
        physics.fixed_update(&mut ball, &FlatGround { y: -5.0 }, 0.0);
        assert!((ball.vel.length() - 6.0).abs() < 1e-4);
        assert_eq!(ball.angular_vel, -120.0);
    }

    #[test]
    fn test_sleeps_after_stable_frames_but_not_during_grace() {
        let physics = BallPhysics::new(BallPhysicsTuning::default());
        let ground = FlatGround { y: 0.0 };
        let mut ball = resting_ball(0.0);

        for _ in 0..20 {
            physics.fixed_update(&mut ball, &ground, 0.1);
        }
        assert!(!ball.sleeping);

        for i in 0..10 {
            assert!(!ball.sleeping, "slept early at frame {}", i);
            physics.fixed_update(&mut ball, &ground, 1.0);
        }
        assert!(ball.sleeping);

        ball.vel = Vec2::new(1.0, 0.0);
        physics.fixed_update(&mut ball, &ground, 1.0);
        assert!(!ball.sleeping);
        assert_eq!(ball.stable_frames, 0);
    }

    #[test]
    fn test_impact_damps() {
        let physics = BallPhysics::new(BallPhysicsTuning::default());
        let mut ball = resting_ball(0.0);
        ball.vel = Vec2::new(2.0, 0.0);
        ball.angular_vel = 10.0;
        physics.on_impact(&mut ball);
        assert!((ball.vel.x - 1.3).abs() < 1e-5);
        assert!((ball.angular_vel - 6.5).abs() < 1e-5);
    }
}
