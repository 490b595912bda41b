//! Merge-ball simulator
//!
//! Balls of equal level that touch combine into one ball of the next level.
//! Which levels the dropper may hand out grows with the score.
//!
//! Deterministic by construction:
//! - Seeded RNG for the drop pool
//! - Balls kept sorted by id
//! - Contacts collected during the physics step, resolved afterwards in id order

pub mod arena;
pub mod ball;
pub mod dropper;
pub mod game;
pub mod manager;
pub mod physics;
pub mod score;

pub use arena::BoxArena;
pub use ball::{Ball, BallId};
pub use dropper::{DropInput, Dropper, DropperState};
pub use game::{MergeGame, MergePhase, MergeTickReport};
pub use manager::{Contact, DROP_WEIGHTS, MAX_DROP_LEVEL, MergeEvent, MergeManager};
pub use physics::{BallPhysics, Damping, FlatGround, GroundProbe};
pub use score::MergeScore;
