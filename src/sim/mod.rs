//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `Game::tick`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod clock;
pub mod events;
pub mod game;
pub mod motion;
pub mod scoring;
pub mod spawner;
pub mod state;

pub use clock::{Deferred, Fired, Scheduler};
pub use events::{DuckSnapshot, GameEvent, Snapshot};
pub use game::{Command, Game};
pub use motion::{Step, advance};
pub use scoring::{AwardCertificate, HitScore, points, record_hit, record_miss};
pub use spawner::{Placement, place_duck, ramp_difficulty};
pub use state::{Duck, Facing, GamePhase, Outcome, Session};
