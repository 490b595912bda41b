//! Merge manager: ball lifecycle, same-level merges, drop pool, unlocks
//!
//! Collisions are handled in two phases. The physics provider reports every
//! ball-ball contact of a step with `report_contact`; `resolve_contacts` then
//! processes them in a deterministic order (by ball id pair). A ball is
//! claimed (`merging`) before any side effect, so a second contact involving
//! it in the same pass is rejected.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ball::{Ball, BallId};
use crate::events::EventBus;
use crate::settings::{BallType, MergeTuning};

/// Relative drop probability for levels 0..=4
pub const DROP_WEIGHTS: [u32; 5] = [50, 35, 15, 8, 4];
/// Highest level that can ever be dropped
pub const MAX_DROP_LEVEL: usize = DROP_WEIGHTS.len() - 1;

/// Notifications for score, audio and effect collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    /// A ball entered the bucket (drop or merge result)
    Spawned { id: BallId, level: usize, pos: Vec2 },
    /// Two balls combined into one of `level`
    Merged { level: usize, pos: Vec2 },
    /// The dropper released its held ball
    Dropped { id: BallId, level: usize },
    /// A ball crossed the lose line moving upward
    GameOver { score: u64 },
}

/// A ball-ball contact reported by the physics provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: BallId,
    pub b: BallId,
    pub point: Vec2,
}

/// Context object for one merge game instance
#[derive(Debug)]
pub struct MergeManager {
    ball_types: Vec<BallType>,
    start_max_drop_level: usize,
    current_max_drop_level: usize,
    unlock3_at_score: u64,
    unlock4_at_score: u64,
    velocity_transfer: f32,
    rng: Pcg32,
    /// Live balls, sorted by id
    balls: Vec<Ball>,
    contacts: Vec<Contact>,
    next_id: BallId,
    time: f32,
    pub events: EventBus<MergeEvent>,
}

impl MergeManager {
    pub fn new(tuning: &MergeTuning, seed: u64) -> Self {
        let start = tuning.start_max_drop_level.min(MAX_DROP_LEVEL);
        Self {
            ball_types: tuning.ball_types.clone(),
            start_max_drop_level: start,
            current_max_drop_level: start,
            unlock3_at_score: tuning.unlock3_at_score,
            unlock4_at_score: tuning.unlock4_at_score,
            velocity_transfer: tuning.velocity_transfer,
            rng: Pcg32::seed_from_u64(seed),
            balls: Vec::new(),
            contacts: Vec::new(),
            next_id: 1,
            time: 0.0,
            events: EventBus::new(),
        }
    }

    /// Highest level a merge can produce
    pub fn max_level(&self) -> usize {
        self.ball_types.len().saturating_sub(1)
    }

    pub fn ball_types(&self) -> &[BallType] {
        &self.ball_types
    }

    pub fn current_max_drop_level(&self) -> usize {
        self.current_max_drop_level
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn advance_time(&mut self, dt: f32) {
        self.time += dt;
    }

    /// Raise the drop ceiling from an externally kept total score (never lowers it)
    pub fn sync_progress_from_external_score(&mut self, total_score: u64) {
        let before = self.current_max_drop_level;
        if total_score >= self.unlock4_at_score {
            self.current_max_drop_level = self.current_max_drop_level.max(4);
        } else if total_score >= self.unlock3_at_score {
            self.current_max_drop_level = self.current_max_drop_level.max(3);
        }
        if self.current_max_drop_level != before {
            log::info!(
                "Drop pool unlocked up to level {} at score {}",
                self.current_max_drop_level,
                total_score
            );
        }
    }

    /// Weighted pick among the currently droppable levels
    pub fn pick_droppable_level(&mut self) -> usize {
        let max_idx = self.current_max_drop_level.min(MAX_DROP_LEVEL);
        let weights = &DROP_WEIGHTS[..=max_idx];
        let total: u32 = weights.iter().sum();
        if total == 0 {
            return 0;
        }

        let roll = self.rng.random_range(0..total);
        let mut acc = 0;
        for (level, &weight) in weights.iter().enumerate() {
            acc += weight;
            if roll < acc {
                return level;
            }
        }
        0
    }

    /// Create a ball of `level` at `pos`
    /// Returns None (and logs) if no ball type is configured for the level
    pub fn spawn_ball(&mut self, level: usize, pos: Vec2) -> Option<BallId> {
        let Some(kind) = self.ball_types.get(level) else {
            log::warn!(
                "No ball type configured for level {} ({} types), spawn skipped",
                level,
                self.ball_types.len()
            );
            return None;
        };

        let id = self.next_id;
        self.next_id += 1;
        // Ids are allocated increasing, so pushing keeps the list sorted
        self.balls.push(Ball::new(id, level, kind, pos, self.time));
        self.events.publish(MergeEvent::Spawned { id, level, pos });
        Some(id)
    }

    fn index_of(&self, id: BallId) -> Option<usize> {
        self.balls.binary_search_by_key(&id, |b| b.id).ok()
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.index_of(id).map(|i| &self.balls[i])
    }

    pub fn ball_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.index_of(id).map(move |i| &mut self.balls[i])
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn balls_mut(&mut self) -> &mut [Ball] {
        &mut self.balls
    }

    pub fn remove_ball(&mut self, id: BallId) -> Option<Ball> {
        self.index_of(id).map(|i| self.balls.remove(i))
    }

    /// Queue a contact for the next `resolve_contacts` pass
    pub fn report_contact(&mut self, a: BallId, b: BallId, point: Vec2) {
        self.contacts.push(Contact { a, b, point });
    }

    pub fn pending_contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Process queued contacts in (min id, max id) order
    /// Returns the number of merges performed
    pub fn resolve_contacts(&mut self) -> usize {
        let mut contacts = std::mem::take(&mut self.contacts);
        for contact in contacts.iter_mut() {
            if contact.a > contact.b {
                std::mem::swap(&mut contact.a, &mut contact.b);
            }
        }
        contacts.sort_by_key(|c| (c.a, c.b));
        contacts.dedup_by_key(|c| (c.a, c.b));

        contacts
            .into_iter()
            .filter(|c| self.try_merge(c.a, c.b, c.point).is_some())
            .count()
    }

    /// Merge `a` and `b` if they are an unclaimed same-level pair below the top level
    pub fn try_merge(&mut self, a: BallId, b: BallId, contact_point: Vec2) -> Option<BallId> {
        if a == b {
            return None;
        }
        let max_level = self.max_level();
        let (ia, ib) = (self.index_of(a)?, self.index_of(b)?);
        if !self.balls[ia].can_merge_with(&self.balls[ib], max_level) {
            return None;
        }

        self.balls[ia].merging = true;
        self.balls[ib].merging = true;
        self.merge(a, b, contact_point)
    }

    fn merge(&mut self, a_id: BallId, b_id: BallId, contact_point: Vec2) -> Option<BallId> {
        let a = self.ball(a_id)?.clone();
        let b = self.ball(b_id)?.clone();

        let next = (a.level + 1).min(self.max_level());
        let pos = (a.pos * a.mass + b.pos * b.mass) / (a.mass + b.mass);

        let Some(id) = self.spawn_ball(next, pos) else {
            // Nothing spawned: release the claim and leave both parents alone
            for parent in [a_id, b_id] {
                if let Some(ball) = self.ball_mut(parent) {
                    ball.merging = false;
                }
            }
            return None;
        };

        let transfer = self.velocity_transfer;
        if let Some(child) = self.ball_mut(id) {
            child.vel = (a.vel + b.vel) * transfer;
            child.angular_vel = (a.angular_vel + b.angular_vel) * transfer;
        }

        self.remove_ball(a_id);
        self.remove_ball(b_id);

        log::debug!(
            "Merged {} + {} (level {}) -> {} (level {}) at {:?}, contact {:?}",
            a_id,
            b_id,
            a.level,
            id,
            next,
            pos,
            contact_point
        );
        self.events.publish(MergeEvent::Merged { level: next, pos });
        Some(id)
    }

    /// Remove every ball and restart unlock progress
    pub fn clear(&mut self) {
        self.balls.clear();
        self.contacts.clear();
        self.current_max_drop_level = self.start_max_drop_level;
    }
}
