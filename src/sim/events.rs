//! What the game tells the front end
//!
//! Events are queued as they happen and drained by the renderer; snapshots are
//! read-only copies for positioning and HUD sync.

use serde::{Deserialize, Serialize};

use super::scoring::AwardCertificate;
use super::state::{Duck, Facing, GamePhase, Session};

/// Something the front end should react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A fresh session began (start or restart)
    SessionStarted { generation: u32 },
    Paused,
    Resumed,
    DuckSpawned {
        id: u32,
        x: f32,
        y: f32,
        facing: Facing,
    },
    DuckShot {
        id: u32,
        points: u64,
        combo: u32,
    },
    DuckEscaped { id: u32 },
    /// A terminal duck finished its display delay and left the store
    DuckRemoved { id: u32 },
    /// The spawn interval was re-armed with a new period
    SpawnRateChanged { spawn_rate_ms: u64 },
    /// The 100th hit just landed
    MilestoneReached,
    /// Award screen is up; play is paused until dismissed
    AwardPresented(AwardCertificate),
}

/// Per-duck view for rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuckSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub hit: bool,
    pub terminal: bool,
    pub facing: Facing,
}

impl From<&Duck> for DuckSnapshot {
    fn from(duck: &Duck) -> Self {
        Self {
            id: duck.id,
            x: duck.pos.x,
            y: duck.pos.y,
            hit: duck.is_hit(),
            terminal: duck.is_terminal(),
            facing: duck.facing,
        }
    }
}

/// Read-only view of the whole game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: GamePhase,
    pub is_active: bool,
    pub is_paused: bool,
    pub award_showing: bool,
    pub session: Session,
    pub ducks: Vec<DuckSnapshot>,
}
