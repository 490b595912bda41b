//! Game tuning
//!
//! Loaded once per session from JSON. Every struct is `#[serde(default)]`, so a
//! file only needs the values it overrides.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One entry of the ordered ball-type table (index = level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallType {
    pub name: String,
    pub radius: f32,
    pub mass: f32,
}

impl BallType {
    pub fn new(name: &str, radius: f32, mass: f32) -> Self {
        Self {
            name: name.to_string(),
            radius,
            mass,
        }
    }
}

/// Held-ball dropper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropperTuning {
    pub x_min: f32,
    pub x_max: f32,
    pub y_spawn: f32,
    /// Seconds between drops
    pub drop_cooldown: f32,
    /// Downward impulse applied on release
    pub drop_impulse: f32,
}

impl Default for DropperTuning {
    fn default() -> Self {
        Self {
            x_min: -2.4,
            x_max: 2.4,
            y_spawn: 4.5,
            drop_cooldown: 0.35,
            drop_impulse: 0.5,
        }
    }
}

/// Drag, clamps and sleep thresholds for simulated merge balls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallPhysicsTuning {
    pub air_drag: f32,
    pub air_angular_drag: f32,
    pub ground_drag: f32,
    pub ground_angular_drag: f32,
    pub max_speed: f32,
    /// Degrees per second
    pub max_angular_vel: f32,
    /// Fraction of velocity removed on every impact
    pub impact_damp: f32,
    /// Squared linear speed below which a ball counts as still
    pub sleep_vel_sqr: f32,
    pub sleep_angular: f32,
    pub stable_frames_to_sleep: u32,
    /// Seconds after spawn during which a ball never sleeps
    pub sleep_grace: f32,
    /// Ground probe: offset below the ball's bottom and probe radius
    pub ground_probe_offset: f32,
    pub ground_probe_radius: f32,
}

impl Default for BallPhysicsTuning {
    fn default() -> Self {
        Self {
            air_drag: 0.05,
            air_angular_drag: 2.5,
            ground_drag: 3.5,
            ground_angular_drag: 7.0,
            max_speed: 6.0,
            max_angular_vel: 120.0,
            impact_damp: 0.35,
            sleep_vel_sqr: 0.0025,
            sleep_angular: 5.0,
            stable_frames_to_sleep: 10,
            sleep_grace: 0.4,
            ground_probe_offset: 0.02,
            ground_probe_radius: 0.04,
        }
    }
}

/// Merge scoring with combos
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeScoring {
    /// Points indexed by `level - 1`; empty means `10 * 2^(level-1)`
    pub points_by_level: Vec<u64>,
    /// Seconds within which consecutive merges build a combo
    pub combo_window: f32,
    pub max_combo: u32,
}

impl Default for MergeScoring {
    fn default() -> Self {
        Self {
            points_by_level: Vec::new(),
            combo_window: 1.2,
            max_combo: 5,
        }
    }
}

/// Merge-ball simulator tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeTuning {
    pub ball_types: Vec<BallType>,
    pub start_max_drop_level: usize,
    pub unlock3_at_score: u64,
    pub unlock4_at_score: u64,
    /// Share of the parents' summed velocity carried by a merge result
    pub velocity_transfer: f32,
    /// Stacking above this line while moving upward ends the game
    pub lose_line_y: f32,
    pub upward_threshold: f32,
    pub dropper: DropperTuning,
    pub physics: BallPhysicsTuning,
    pub scoring: MergeScoring,
}

impl Default for MergeTuning {
    fn default() -> Self {
        Self {
            ball_types: vec![
                BallType::new("Golf", 0.22, 0.5),
                BallType::new("Tennis", 0.3, 0.7),
                BallType::new("Baseball", 0.36, 0.9),
                BallType::new("Volleyball", 0.48, 1.2),
                BallType::new("Basketball", 0.58, 1.6),
                BallType::new("Football", 0.66, 2.0),
                BallType::new("Bowling", 0.78, 3.0),
            ],
            start_max_drop_level: 2,
            unlock3_at_score: 300,
            unlock4_at_score: 900,
            velocity_transfer: 0.35,
            lose_line_y: 3.6,
            upward_threshold: 0.02,
            dropper: DropperTuning::default(),
            physics: BallPhysicsTuning::default(),
            scoring: MergeScoring::default(),
        }
    }
}

/// Per-tier afterimage cadence
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailTier {
    /// Seconds between stamps
    pub spawn_interval: f32,
    /// Seconds a ghost lives
    pub lifetime: f32,
    pub start_alpha: f32,
}

/// Afterimage ghost pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AfterimageTuning {
    pub pool_size: usize,
    pub tier2: TrailTier,
    pub tier3: TrailTier,
    pub min_speed_for_trail: f32,
    /// Fraction of scale lost by the end of a ghost's life
    pub scale_down_over_life: f32,
}

impl Default for AfterimageTuning {
    fn default() -> Self {
        Self {
            pool_size: 24,
            tier2: TrailTier {
                spawn_interval: 0.035,
                lifetime: 0.18,
                start_alpha: 0.38,
            },
            tier3: TrailTier {
                spawn_interval: 0.022,
                lifetime: 0.26,
                start_alpha: 0.55,
            },
            min_speed_for_trail: 4.0,
            scale_down_over_life: 0.12,
        }
    }
}

/// Bounce arena geometry and paddle handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    /// Visible play field half size, centered on the origin
    pub half_extents: Vec2,
    pub wall_thickness: f32,
    pub paddle_half_extents: Vec2,
    pub paddle_y: f32,
    /// Lerp rate toward the pointer (per second)
    pub paddle_lerp: f32,
    /// Keeps the paddle this far from the side edges
    pub paddle_padding: f32,
    pub spawn_point: Vec2,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            half_extents: Vec2::new(2.8, 5.0),
            wall_thickness: 1.0,
            paddle_half_extents: Vec2::new(0.8, 0.15),
            paddle_y: -4.0,
            paddle_lerp: 20.0,
            paddle_padding: 0.5,
            spawn_point: Vec2::ZERO,
        }
    }
}

/// Swept-circle bounce solver tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BounceTuning {
    pub radius: f32,
    pub skin: f32,
    pub max_bounces_per_step: u32,
    /// Base speed (units/s) before speed-tier multipliers
    pub speed: f32,
    pub initial_dir: Vec2,
    pub death_line_y: f32,
    /// Degrees
    pub min_angle_from_horizontal: f32,
    /// Degrees
    pub max_angle_from_vertical: f32,
    pub min_vy: f32,
    pub paddle_english_strength: f32,
    pub nudge_up_after_paddle: f32,
    pub bounces_per_upgrade: u32,
    /// Multiplier per speed tier 0..=3
    pub speed_multipliers: Vec<f32>,
    /// Total score needed for speed tiers 1..=3
    pub speed_milestones: Vec<u64>,
    /// Seconds the speed-up flash lasts
    pub flash_duration: f32,
    /// Horizontal jitter range applied on continue
    pub continue_jitter: f32,
    pub afterimage: AfterimageTuning,
    pub arena: ArenaTuning,
}

impl Default for BounceTuning {
    fn default() -> Self {
        Self {
            radius: 0.25,
            skin: 0.005,
            max_bounces_per_step: 4,
            speed: 13.0,
            initial_dir: Vec2::new(0.45, 1.0),
            death_line_y: -10.0,
            min_angle_from_horizontal: 12.0,
            max_angle_from_vertical: 80.0,
            min_vy: 0.10,
            paddle_english_strength: 2.6,
            nudge_up_after_paddle: 0.25,
            bounces_per_upgrade: 10,
            speed_multipliers: vec![1.0, 1.2, 1.4, 1.6],
            speed_milestones: vec![20, 40, 60],
            flash_duration: 0.25,
            continue_jitter: 0.1,
            afterimage: AfterimageTuning::default(),
            arena: ArenaTuning::default(),
        }
    }
}

/// Complete session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub merge: MergeTuning,
    pub bounce: BounceTuning,
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Like `load`, but a missing file falls back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let settings = Self::load(path)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let merge = &self.merge;
        for ball in &merge.ball_types {
            if !(ball.mass > 0.0) {
                return Err(ConfigError::invalid(
                    "merge.ball_types.mass",
                    format!("'{}' has non-positive mass {}", ball.name, ball.mass),
                ));
            }
            if !(ball.radius > 0.0) {
                return Err(ConfigError::invalid(
                    "merge.ball_types.radius",
                    format!("'{}' has non-positive radius {}", ball.name, ball.radius),
                ));
            }
        }
        if merge.dropper.x_min > merge.dropper.x_max {
            return Err(ConfigError::invalid(
                "merge.dropper.x_min",
                format!(
                    "x_min {} is greater than x_max {}",
                    merge.dropper.x_min, merge.dropper.x_max
                ),
            ));
        }
        if merge.dropper.drop_cooldown < 0.0 {
            return Err(ConfigError::invalid(
                "merge.dropper.drop_cooldown",
                "must not be negative",
            ));
        }

        let bounce = &self.bounce;
        if bounce.max_bounces_per_step == 0 {
            return Err(ConfigError::invalid(
                "bounce.max_bounces_per_step",
                "must be at least 1",
            ));
        }
        if !(bounce.speed > 0.0) {
            return Err(ConfigError::invalid("bounce.speed", "must be positive"));
        }
        if !(bounce.radius > 0.0) {
            return Err(ConfigError::invalid("bounce.radius", "must be positive"));
        }
        if !(bounce.min_angle_from_horizontal >= 0.0 && bounce.min_angle_from_horizontal < 90.0)
        {
            return Err(ConfigError::invalid(
                "bounce.min_angle_from_horizontal",
                "must be in [0, 90) degrees",
            ));
        }
        if !(bounce.max_angle_from_vertical > 0.0 && bounce.max_angle_from_vertical <= 90.0) {
            return Err(ConfigError::invalid(
                "bounce.max_angle_from_vertical",
                "must be in (0, 90] degrees",
            ));
        }
        if bounce.speed_multipliers.len() != 4 {
            return Err(ConfigError::invalid(
                "bounce.speed_multipliers",
                format!("expected 4 entries, got {}", bounce.speed_multipliers.len()),
            ));
        }
        Ok(())
    }
}
