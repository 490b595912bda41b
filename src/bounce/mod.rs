//! Swept-circle bounce solver
//!
//! A single kinematic ball driven by circle casts against walls and a paddle,
//! with an angle envelope that keeps rallies playable and a tiered trail.

pub mod afterimage;
pub mod collider;
pub mod game;
pub mod kinematic;
pub mod score;

pub use afterimage::{AfterimagePool, Ghost};
pub use collider::{
    ALL_LAYERS, Bounds, CastHit, CircleCaster, Collider, ColliderId, ColliderSet, LayerMask, Shape,
};
pub use game::{
    BounceGame, BounceTickReport, PADDLE_LAYER, PICKUP_LAYER, Pickup, WALL_LAYER, build_arena,
};
pub use kinematic::{AngleLimits, ArcadeBall, BounceEvent, MAX_SPEED_TIER, MAX_TIER};
pub use score::BounceScore;
