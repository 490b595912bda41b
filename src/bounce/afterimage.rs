//! Afterimage trail
//!
//! Fixed pool of ghost stamps reused in place. Tier 2 and 3 balls stamp a
//! ghost at a tier-dependent cadence while moving fast; each ghost fades and
//! shrinks linearly over its lifetime.

use glam::Vec2;

use crate::settings::{AfterimageTuning, TrailTier};

/// A faded copy of the ball left behind on the trail
#[derive(Debug, Clone, Copy, Default)]
pub struct Ghost {
    pub active: bool,
    pub pos: Vec2,
    /// Current alpha (0-1)
    pub alpha: f32,
    /// Current scale relative to the ball sprite
    pub scale: f32,
    pub life: f32,
    pub max_life: f32,
    start_alpha: f32,
    base_scale: f32,
}

#[derive(Debug, Clone)]
pub struct AfterimagePool {
    tuning: AfterimageTuning,
    ghosts: Vec<Ghost>,
    spawn_timer: f32,
}

impl AfterimagePool {
    pub fn new(tuning: AfterimageTuning) -> Self {
        let ghosts = vec![Ghost::default(); tuning.pool_size];
        Self {
            tuning,
            ghosts,
            spawn_timer: 0.0,
        }
    }

    fn tier_params(&self, tier: u8) -> Option<TrailTier> {
        match tier {
            2 => Some(self.tuning.tier2),
            t if t >= 3 => Some(self.tuning.tier3),
            _ => None,
        }
    }

    /// Stamp a ghost if the tier, speed and cadence allow it
    /// Returns true if a ghost was stamped
    pub fn try_spawn(&mut self, tier: u8, pos: Vec2, speed: f32, scale: f32, dt: f32) -> bool {
        let Some(params) = self.tier_params(tier) else {
            return false;
        };
        if speed < self.tuning.min_speed_for_trail || self.ghosts.is_empty() {
            return false;
        }

        self.spawn_timer += dt;
        if self.spawn_timer < params.spawn_interval {
            return false;
        }
        self.spawn_timer = 0.0;

        // Pool exhausted: overwrite slot 0
        let idx = self.ghosts.iter().position(|g| !g.active).unwrap_or(0);
        self.ghosts[idx] = Ghost {
            active: true,
            pos,
            alpha: params.start_alpha,
            scale,
            life: params.lifetime,
            max_life: params.lifetime,
            start_alpha: params.start_alpha,
            base_scale: scale,
        };
        true
    }

    /// Age every active ghost by `dt`
    pub fn update(&mut self, dt: f32) {
        let shrink = self.tuning.scale_down_over_life;
        for ghost in self.ghosts.iter_mut().filter(|g| g.active) {
            ghost.life -= dt;
            if ghost.life <= 0.0 {
                ghost.active = false;
                ghost.alpha = 0.0;
                continue;
            }
            let k = if ghost.max_life > 0.0 {
                (ghost.life / ghost.max_life).clamp(0.0, 1.0)
            } else {
                0.0
            };
            ghost.alpha = ghost.start_alpha * k;
            ghost.scale = ghost.base_scale * (1.0 - (1.0 - k) * shrink);
        }
    }

    pub fn active(&self) -> impl Iterator<Item = &Ghost> {
        self.ghosts.iter().filter(|g| g.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn clear(&mut self) {
        for ghost in self.ghosts.iter_mut() {
            ghost.active = false;
        }
        self.spawn_timer = 0.0;
    }
}
