//! Kinematic arcade ball
//!
//! Moves by repeated swept-circle casts instead of rigid-body integration:
//! each fixed tick spends `speed * dt` of travel, reflecting off the nearest
//! surface up to `max_bounces_per_step` times. Any travel left when the
//! budget runs out is dropped for that tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::afterimage::AfterimagePool;
use super::collider::{ALL_LAYERS, Bounds, CircleCaster, ColliderId, LayerMask};
use crate::events::EventBus;
use crate::settings::BounceTuning;
use crate::{reflect, sign_or_one};

/// Highest cosmetic tier
pub const MAX_TIER: u8 = 3;
/// Highest speed tier
pub const MAX_SPEED_TIER: u8 = 3;

/// Notifications for score, audio and effect collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum BounceEvent {
    PaddleBounce { count: u32 },
    TierChanged { tier: u8 },
    SpeedTierChanged { tier: u8, speed: f32 },
    Death,
}

/// Playable direction envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleLimits {
    pub min_vy: f32,
    /// Degrees
    pub min_angle_from_horizontal: f32,
    /// Degrees
    pub max_angle_from_vertical: f32,
}

impl AngleLimits {
    pub fn from_tuning(tuning: &BounceTuning) -> Self {
        Self {
            min_vy: tuning.min_vy,
            min_angle_from_horizontal: tuning.min_angle_from_horizontal,
            max_angle_from_vertical: tuning.max_angle_from_vertical,
        }
    }

    /// Clamp a direction into the envelope, keeping its quadrant
    ///
    /// Angles are measured against the axes regardless of quadrant, so the
    /// result is always a unit vector whose angle from horizontal is at least
    /// `min_angle_from_horizontal` and whose angle from vertical is at most
    /// `max_angle_from_vertical`. Zero-length or NaN input becomes straight up.
    pub fn enforce(&self, dir: Vec2) -> Vec2 {
        let mut d = dir.try_normalize().unwrap_or(Vec2::Y);

        if d.y.abs() < self.min_vy {
            d.y = sign_or_one(d.y) * self.min_vy;
        }
        let (sx, sy) = (sign_or_one(d.x), sign_or_one(d.y));

        let from_horizontal = d.y.abs().atan2(d.x.abs()).to_degrees();
        if from_horizontal < self.min_angle_from_horizontal {
            let t = self.min_angle_from_horizontal.to_radians();
            d = Vec2::new(t.cos() * sx, t.sin() * sy);
        }

        let from_vertical = d.x.abs().atan2(d.y.abs()).to_degrees();
        if from_vertical > self.max_angle_from_vertical {
            let t = self.max_angle_from_vertical.to_radians();
            d = Vec2::new(t.sin() * sx, t.cos() * sy);
        }

        d.try_normalize().unwrap_or(Vec2::Y)
    }
}

#[derive(Debug)]
pub struct ArcadeBall {
    pos: Vec2,
    prev_pos: Vec2,
    dir: Vec2,
    speed: f32,
    base_speed: f32,
    launched: bool,

    radius: f32,
    skin: f32,
    max_bounces_per_step: u32,
    initial_dir: Vec2,
    death_line_y: f32,
    limits: AngleLimits,
    collision_mask: LayerMask,

    paddle: Option<ColliderId>,
    english_strength: f32,
    nudge_up_after_paddle: f32,

    current_tier: u8,
    bounce_count: u32,
    bounces_per_upgrade: u32,

    speed_tier: u8,
    speed_multipliers: Vec<f32>,
    flash_duration: f32,
    flash_timer: f32,
    continue_jitter: f32,

    rng: Pcg32,
    afterimages: AfterimagePool,
    pub events: EventBus<BounceEvent>,
}

impl ArcadeBall {
    pub fn new(tuning: &BounceTuning, seed: u64) -> Self {
        let limits = AngleLimits::from_tuning(tuning);
        let mut ball = Self {
            pos: Vec2::ZERO,
            prev_pos: Vec2::ZERO,
            dir: Vec2::Y,
            speed: tuning.speed,
            base_speed: tuning.speed,
            launched: false,
            radius: tuning.radius,
            skin: tuning.skin,
            max_bounces_per_step: tuning.max_bounces_per_step,
            initial_dir: tuning.initial_dir,
            death_line_y: tuning.death_line_y,
            limits,
            collision_mask: ALL_LAYERS,
            paddle: None,
            english_strength: tuning.paddle_english_strength,
            nudge_up_after_paddle: tuning.nudge_up_after_paddle,
            current_tier: 1,
            bounce_count: 0,
            bounces_per_upgrade: tuning.bounces_per_upgrade,
            speed_tier: 0,
            speed_multipliers: tuning.speed_multipliers.clone(),
            flash_duration: tuning.flash_duration,
            flash_timer: 0.0,
            continue_jitter: tuning.continue_jitter,
            rng: Pcg32::seed_from_u64(seed),
            afterimages: AfterimagePool::new(tuning.afterimage.clone()),
            events: EventBus::new(),
        };
        ball.dir = ball.initial_direction();
        ball
    }

    pub fn set_paddle(&mut self, paddle: Option<ColliderId>) {
        self.paddle = paddle;
    }

    pub fn set_collision_mask(&mut self, mask: LayerMask) {
        self.collision_mask = mask;
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    pub fn direction(&self) -> Vec2 {
        self.dir
    }

    /// Override the heading (clamped into the angle envelope)
    pub fn set_direction(&mut self, dir: Vec2) {
        self.dir = self.limits.enforce(dir);
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn tier(&self) -> u8 {
        self.current_tier
    }

    pub fn speed_tier(&self) -> u8 {
        self.speed_tier
    }

    pub fn bounce_count(&self) -> u32 {
        self.bounce_count
    }

    pub fn limits(&self) -> &AngleLimits {
        &self.limits
    }

    pub fn afterimages(&self) -> &AfterimagePool {
        &self.afterimages
    }

    /// Speed-up flash strength for the renderer (1 = just triggered)
    pub fn flash_intensity(&self) -> f32 {
        if self.flash_duration > 0.0 {
            (self.flash_timer / self.flash_duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn initial_direction(&self) -> Vec2 {
        let base = if self.initial_dir.length_squared() < 1e-6 {
            Vec2::Y
        } else {
            self.initial_dir
        };
        self.limits.enforce(base)
    }

    /// Start over from `spawn` with the configured initial direction
    pub fn reset_from_spawn_point(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.prev_pos = spawn;
        self.launched = true;
        self.dir = self.initial_direction();
        self.afterimages.clear();
    }

    /// Relaunch after a death, keeping tier and bounce count
    /// A little horizontal jitter avoids replaying the same losing line
    pub fn continue_from_spawn_point(&mut self, spawn: Vec2) {
        self.pos = spawn;
        self.prev_pos = spawn;
        self.launched = true;

        let mut base = if self.initial_dir.length_squared() < 1e-6 {
            Vec2::Y
        } else {
            self.initial_dir
        };
        if self.continue_jitter > 0.0 {
            base.x += self
                .rng
                .random_range(-self.continue_jitter..=self.continue_jitter);
        }
        self.dir = self.limits.enforce(base);
        self.afterimages.clear();
    }

    pub fn reset_tier_and_bounce(&mut self) {
        self.bounce_count = 0;
        self.set_tier(1);
        self.apply_speed_tier(0);
    }

    pub fn set_tier(&mut self, tier: u8) {
        let tier = tier.clamp(1, MAX_TIER);
        if tier != self.current_tier {
            log::info!("Ball tier {} -> {}", self.current_tier, tier);
            self.current_tier = tier;
            self.events.publish(BounceEvent::TierChanged { tier });
        }
    }

    /// Scale speed by the multiplier for `tier` (0-3) and start the flash
    pub fn apply_speed_tier(&mut self, tier: u8) {
        let tier = tier.min(MAX_SPEED_TIER);
        let multiplier = self
            .speed_multipliers
            .get(tier as usize)
            .copied()
            .unwrap_or(1.0);
        self.speed_tier = tier;
        self.speed = self.base_speed * multiplier;
        self.flash_timer = self.flash_duration;
        log::info!("Speed tier {} ({:.2} units/s)", tier, self.speed);
        self.events.publish(BounceEvent::SpeedTierChanged {
            tier,
            speed: self.speed,
        });
    }

    /// Integrate one fixed tick against `world`
    /// Returns the number of surfaces hit this tick
    pub fn fixed_update(&mut self, world: &impl CircleCaster, dt: f32) -> u32 {
        if !self.launched {
            return 0;
        }

        let start = self.pos;
        let mut pos = self.pos;
        let mut remaining = self.speed * dt;
        let mut bounces = 0;

        for _ in 0..self.max_bounces_per_step {
            if remaining <= 0.0 {
                break;
            }
            let hits = world.circle_cast(pos, self.radius, self.dir, remaining, self.collision_mask);
            let Some(hit) = hits
                .iter()
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
                .copied()
            else {
                pos += self.dir * remaining;
                break;
            };

            let travel = (hit.distance - self.skin).max(0.0);
            pos += self.dir * travel;
            remaining -= travel;

            if self.paddle == Some(hit.collider) {
                self.paddle_bounce(pos, hit.normal, world.bounds(hit.collider));
            } else {
                self.dir = self.limits.enforce(reflect(self.dir, hit.normal));
            }

            // Step off the surface so the next cast doesn't find it again
            pos += hit.normal * self.skin;
            bounces += 1;
        }

        self.prev_pos = start;
        self.pos = pos;

        if dt > 0.0 {
            let inst_speed = (pos - start).length() / dt;
            self.afterimages
                .try_spawn(self.current_tier, pos, inst_speed, 1.0, dt);
        }
        bounces
    }

    fn paddle_bounce(&mut self, pos: Vec2, normal: Vec2, paddle: Option<Bounds>) {
        self.bounce_count += 1;
        self.events.publish(BounceEvent::PaddleBounce {
            count: self.bounce_count,
        });
        if self.bounces_per_upgrade > 0
            && self.bounce_count % self.bounces_per_upgrade == 0
            && self.current_tier < MAX_TIER
        {
            self.set_tier(self.current_tier + 1);
        }

        let offset_norm = paddle
            .map(|b| ((pos.x - b.center.x) / b.extents.x.max(1e-4)).clamp(-1.0, 1.0))
            .unwrap_or(0.0);

        let mut reflected = reflect(self.dir, normal);
        reflected.x += offset_norm * self.english_strength;
        if reflected.y <= 0.0 {
            reflected.y = self.nudge_up_after_paddle;
        }
        self.dir = self.limits.enforce(reflected);
    }

    /// Per-frame bookkeeping: death line, ghost fading, flash countdown
    pub fn update(&mut self, dt: f32) {
        if self.launched && self.pos.y < self.death_line_y {
            self.launched = false;
            log::info!("Ball fell below death line at {:?}", self.pos);
            self.events.publish(BounceEvent::Death);
        }
        self.afterimages.update(dt);
        self.flash_timer = (self.flash_timer - dt).max(0.0);
    }

    /// Position at the start of the last tick
    pub fn previous_position(&self) -> Vec2 {
        self.prev_pos
    }
}
