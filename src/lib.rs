//! Merge Bounce - simulation cores for two casual minigames
//!
//! Core modules:
//! - `merge`: Same-level merge simulation (balls, drop pool, dropper, scoring)
//! - `bounce`: Swept-circle kinematic ball (angle envelope, tiers, afterimages)
//! - `events`: Synchronous observer bus used by both cores
//! - `settings`: Data-driven tuning loaded from JSON
//! - `highscores`: Single persisted best score

pub mod bounce;
pub mod error;
pub mod events;
pub mod highscores;
pub mod merge;
pub mod settings;

pub use error::ConfigError;
pub use events::EventBus;
pub use highscores::BestScore;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Gravity used by the stand-in merge arena (units/s²)
    pub const MERGE_GRAVITY: f32 = -9.81;
}

/// Reflect a vector off a surface with unit normal `normal`
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect(v: Vec2, normal: Vec2) -> Vec2 {
    v - 2.0 * v.dot(normal) * normal
}

/// Sign that treats zero as positive
#[inline]
pub fn sign_or_one(x: f32) -> f32 {
    if x < 0.0 { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_off_floor() {
        let r = reflect(Vec2::new(1.0, -1.0), Vec2::Y);
        assert!((r - Vec2::new(1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_sign_or_one() {
        assert_eq!(sign_or_one(0.0), 1.0);
        assert_eq!(sign_or_one(-0.5), -1.0);
        assert_eq!(sign_or_one(3.0), 1.0);
    }
}
