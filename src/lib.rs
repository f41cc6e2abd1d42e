//! Duck Range - a casual duck-shooting arcade engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, scoring, session flow)
//! - `settings`: Runtime tunables and the override surface
//!
//! Rendering is not part of this crate. A front end drives [`sim::Game::tick`]
//! once per animation frame, feeds it commands, and renders from
//! [`sim::Game::snapshot`] and the drained [`sim::GameEvent`]s.

pub mod settings;
pub mod sim;

pub use settings::{OverrideRejected, Overrides, Tuning};
pub use sim::{Game, GameEvent, GamePhase, Snapshot};

/// Game configuration constants
pub mod consts {
    /// Nominal animation frame duration (ms) used for lifetime accounting
    pub const FRAME_MS: u64 = 16;
    /// Longest real time a single tick may cover (ms)
    pub const MAX_TICK_MS: u64 = 60_000;

    /// Delay between a duck's terminal outcome and its removal from the store (ms)
    pub const REMOVAL_DELAY_MS: u64 = 1000;
    /// Delay between reaching the milestone and presenting the award (ms)
    pub const AWARD_DELAY_MS: u64 = 1500;
    /// Hit count that earns the award
    pub const AWARD_MILESTONE: u32 = 100;

    /// Ducks are considered escaped this far beyond the play field width
    pub const ESCAPE_MARGIN: f32 = 100.0;
    /// Ducks spawn this far outside the left/right edge
    pub const SPAWN_MARGIN: f32 = 100.0;
    /// Offset from the top of the field for spawn heights
    pub const SPAWN_TOP_OFFSET: f32 = 50.0;
    /// Fraction of the field height ducks spawn within
    pub const SPAWN_BAND: f32 = 0.6;
    /// Fraction of the field height ducks may fly within
    pub const FLIGHT_CEILING: f32 = 0.7;

    /// Speed gained per point of difficulty
    pub const SPEED_PER_DIFFICULTY: f64 = 0.5;
    /// Score multiplier gained per point of difficulty
    pub const POINTS_PER_DIFFICULTY: f64 = 0.1;
    /// Consecutive hits needed for each combo bonus step
    pub const COMBO_STEP: u32 = 3;
    /// Vertical speed as a fraction of horizontal speed
    pub const VERTICAL_SPEED_FACTOR: f32 = 0.6;

    /// Default play field size
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;
}

/// Round a hit/miss ratio to a whole percentage (0 when nothing was shot at)
#[inline]
pub fn accuracy_percent(hit: u32, missed: u32) -> u32 {
    let total = hit as u64 + missed as u64;
    if total == 0 {
        return 0;
    }
    ((hit as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_percent() {
        assert_eq!(accuracy_percent(0, 0), 0);
        assert_eq!(accuracy_percent(100, 0), 100);
        assert_eq!(accuracy_percent(2, 1), 67);
        assert_eq!(accuracy_percent(1, 3), 25);
    }
}
