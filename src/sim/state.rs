//! Game state and core simulation types
//!
//! Everything a front end reads back lives here: the duck entities, the
//! per-session counters and the session phase.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No session started yet
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Game is paused (by the player or by the award screen)
    Paused,
    /// Tearing down the previous session before a fresh start
    Restarting,
}

impl GamePhase {
    /// True while a session exists (running or paused)
    pub fn is_active(&self) -> bool {
        matches!(self, GamePhase::Running | GamePhase::Paused)
    }
}

/// Which way a duck is flying (and facing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    /// Entered from the left edge, flying right
    Right,
    /// Entered from the right edge, flying left
    Left,
}

impl Facing {
    pub fn sign(&self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

/// How a duck's flight ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Shot,
    Escaped,
}

/// A duck entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Duck {
    pub id: u32,
    pub pos: Vec2,
    /// Units per animation frame, not per second
    pub vel: Vec2,
    /// Flight time accumulated in nominal frame steps (ms)
    pub lifetime_ms: u64,
    pub facing: Facing,
    /// Set exactly once; a terminal duck never moves or scores again
    pub outcome: Option<Outcome>,
}

impl Duck {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, facing: Facing) -> Self {
        Self {
            id,
            pos,
            vel,
            lifetime_ms: 0,
            facing,
            outcome: None,
        }
    }

    /// True once the duck was shot or escaped
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// True when the duck was shot ("hit flag")
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.outcome == Some(Outcome::Shot)
    }
}

/// Per-session counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub score: u64,
    pub ducks_hit: u32,
    pub ducks_missed: u32,
    /// Consecutive hits; reset by any escape
    pub combo: u32,
    /// Best combo this session, never decreases
    pub max_combo: u32,
    /// Rises every spawn interval while running
    pub difficulty: f64,
    /// Current spawn interval (ms), never below the configured floor
    #[serde(rename = "spawnRate")]
    pub spawn_rate_ms: u64,
    /// The 100-hit award has been granted this session
    #[serde(rename = "certificateAwarded")]
    pub award_granted: bool,
}

impl Session {
    /// Fresh counters for a new session
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            ducks_hit: 0,
            ducks_missed: 0,
            combo: 0,
            max_combo: 0,
            difficulty: tuning.initial_difficulty,
            spawn_rate_ms: tuning.initial_spawn_rate_ms.max(tuning.min_spawn_rate_ms),
            award_granted: false,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Tuning::default())
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_starts_from_tuning() {
        let tuning = Tuning {
            initial_difficulty: 2.5,
            initial_spawn_rate_ms: 1500,
            ..Default::default()
        };
        let session = Session::new(&tuning);
        assert_eq!(session.difficulty, 2.5);
        assert_eq!(session.spawn_rate_ms, 1500);
        assert_eq!(session.score, 0);
        assert!(!session.award_granted);
    }

    #[test]
    fn test_duck_outcome_flags() {
        let mut duck = Duck::new(1, Vec2::ZERO, Vec2::X, Facing::Right);
        assert!(!duck.is_terminal());
        duck.outcome = Some(Outcome::Escaped);
        assert!(duck.is_terminal());
        assert!(!duck.is_hit());
    }

    #[test]
    fn test_phase_activity() {
        assert!(!GamePhase::Idle.is_active());
        assert!(GamePhase::Running.is_active());
        assert!(GamePhase::Paused.is_active());
        assert!(!GamePhase::Restarting.is_active());
    }
}
