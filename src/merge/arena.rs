//! Minimal rigid-body stand-in for the merge bucket
//!
//! Real hosts plug their own engine in; this one integrates gravity and drag,
//! keeps balls inside an open-top box, separates overlapping balls and reports
//! every ball-ball contact to the manager. Good enough for the headless demo
//! and for exercising merges end to end.

use glam::Vec2;

use super::ball::BallId;
use super::manager::MergeManager;
use super::physics::{BallPhysics, GroundProbe};
use crate::consts::MERGE_GRAVITY;

/// Approach speed below which a touch does not count as an impact
const IMPACT_SPEED: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct BoxArena {
    pub half_width: f32,
    pub floor_y: f32,
    pub gravity: f32,
    pub restitution: f32,
}

impl Default for BoxArena {
    fn default() -> Self {
        Self {
            half_width: 2.8,
            floor_y: -4.5,
            gravity: MERGE_GRAVITY,
            restitution: 0.2,
        }
    }
}

impl GroundProbe for BoxArena {
    fn overlap_circle(&self, center: Vec2, radius: f32) -> bool {
        center.y - radius <= self.floor_y
    }
}

impl BoxArena {
    /// Advance every simulated ball by `dt` and queue contacts on the manager
    pub fn step(&self, manager: &mut MergeManager, physics: &BallPhysics, dt: f32) {
        let now = manager.time();

        for ball in manager.balls_mut().iter_mut() {
            if !ball.simulated {
                continue;
            }
            let damping = physics.fixed_update(ball, self, now);
            if ball.sleeping {
                continue;
            }
            ball.vel.y += self.gravity * dt;
            ball.vel *= 1.0 / (1.0 + damping.linear * dt);
            ball.angular_vel *= 1.0 / (1.0 + damping.angular * dt);
            ball.pos += ball.vel * dt;
        }

        self.resolve_walls(manager, physics);
        let contacts = self.resolve_pairs(manager, physics);
        for (a, b, point) in contacts {
            manager.report_contact(a, b, point);
        }
    }

    fn resolve_walls(&self, manager: &mut MergeManager, physics: &BallPhysics) {
        let e = self.restitution;
        for ball in manager.balls_mut().iter_mut().filter(|b| b.simulated) {
            let mut impact = false;

            let floor = self.floor_y + ball.radius;
            if ball.pos.y < floor {
                ball.pos.y = floor;
                if ball.vel.y < -IMPACT_SPEED {
                    impact = true;
                }
                if ball.vel.y < 0.0 {
                    ball.vel.y = -ball.vel.y * e;
                }
            }

            let left = -self.half_width + ball.radius;
            let right = self.half_width - ball.radius;
            if ball.pos.x < left {
                ball.pos.x = left;
                if ball.vel.x < -IMPACT_SPEED {
                    impact = true;
                }
                ball.vel.x = ball.vel.x.abs() * e;
            } else if ball.pos.x > right {
                ball.pos.x = right;
                if ball.vel.x > IMPACT_SPEED {
                    impact = true;
                }
                ball.vel.x = -ball.vel.x.abs() * e;
            }

            if impact {
                physics.on_impact(ball);
            }
        }
    }

    fn resolve_pairs(
        &self,
        manager: &mut MergeManager,
        physics: &BallPhysics,
    ) -> Vec<(BallId, BallId, Vec2)> {
        let balls = manager.balls_mut();
        let mut contacts = Vec::new();

        for j in 1..balls.len() {
            let (left, right) = balls.split_at_mut(j);
            let b = &mut right[0];
            for a in left.iter_mut() {
                if !a.simulated || !b.simulated {
                    continue;
                }
                let delta = b.pos - a.pos;
                let dist = delta.length();
                let min_dist = a.radius + b.radius;
                if dist >= min_dist {
                    continue;
                }

                let normal = if dist > 1e-6 { delta / dist } else { Vec2::Y };
                let (inv_a, inv_b) = (1.0 / a.mass, 1.0 / b.mass);
                let inv_total = inv_a + inv_b;

                let overlap = min_dist - dist;
                a.pos -= normal * overlap * (inv_a / inv_total);
                b.pos += normal * overlap * (inv_b / inv_total);

                let approach = (b.vel - a.vel).dot(normal);
                if approach < 0.0 {
                    let impulse = -(1.0 + self.restitution) * approach / inv_total;
                    a.vel -= normal * impulse * inv_a;
                    b.vel += normal * impulse * inv_b;
                    if approach < -IMPACT_SPEED {
                        a.wake();
                        b.wake();
                        physics.on_impact(a);
                        physics.on_impact(b);
                    }
                }

                contacts.push((a.id, b.id, a.pos + normal * a.radius));
            }
        }

        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MergeTuning;

    fn setup() -> (MergeManager, BallPhysics, BoxArena) {
        let tuning = MergeTuning::default();
        (
            MergeManager::new(&tuning, 3),
            BallPhysics::new(tuning.physics.clone()),
            BoxArena::default(),
        )
    }

    #[test]
    fn test_ball_falls_and_rests_on_floor() {
        let (mut m, physics, arena) = setup();
        let id = m.spawn_ball(0, Vec2::new(0.0, 2.0)).unwrap();
        for _ in 0..300 {
            m.advance_time(0.02);
            arena.step(&mut m, &physics, 0.02);
        }
        let ball = m.ball(id).unwrap();
        assert!((ball.pos.y - (arena.floor_y + ball.radius)).abs() < 0.01);
        assert!(ball.grounded);
    }

    #[test]
    fn test_held_ball_is_not_simulated() {
        let (mut m, physics, arena) = setup();
        let id = m.spawn_ball(0, Vec2::new(0.0, 2.0)).unwrap();
        m.ball_mut(id).unwrap().simulated = false;
        arena.step(&mut m, &physics, 0.02);
        assert_eq!(m.ball(id).unwrap().pos, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_overlapping_balls_report_contact() {
        let (mut m, physics, arena) = setup();
        let a = m.spawn_ball(1, Vec2::new(0.0, 0.0)).unwrap();
        let b = m.spawn_ball(1, Vec2::new(0.4, 0.0)).unwrap();
        arena.step(&mut m, &physics, 0.02);
        assert_eq!(m.pending_contacts().len(), 1);
        let contact = m.pending_contacts()[0];
        assert_eq!((contact.a, contact.b), (a, b));

        assert_eq!(m.resolve_contacts(), 1);
        assert_eq!(m.balls().len(), 1);
        assert_eq!(m.balls()[0].level, 2);
    }

    #[test]
    fn test_walls_contain_ball() {
        let (mut m, physics, arena) = setup();
        let id = m.spawn_ball(0, Vec2::new(2.7, 0.0)).unwrap();
        m.ball_mut(id).unwrap().vel = Vec2::new(5.0, 0.0);
        arena.step(&mut m, &physics, 0.02);
        let ball = m.ball(id).unwrap();
        assert!(ball.pos.x <= arena.half_width - ball.radius + 1e-6);
        assert!(ball.vel.x <= 0.0);
    }
}
