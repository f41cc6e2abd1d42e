//! Duck spawning and the difficulty curve

use glam::Vec2;
use rand::Rng;

use super::state::{Facing, Session};
use crate::consts::*;
use crate::settings::Tuning;

/// Initial kinematics for a new duck
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pos: Vec2,
    pub vel: Vec2,
    pub facing: Facing,
}

/// Whether the store has room for another duck
///
/// Terminal ducks still waiting for removal count against the cap.
#[inline]
pub fn has_room(duck_count: usize, tuning: &Tuning) -> bool {
    duck_count < tuning.max_active_ducks
}

/// Highest y a duck may occupy
#[inline]
pub fn flight_ceiling(tuning: &Tuning) -> f32 {
    tuning.field_height * FLIGHT_CEILING
}

/// Pick a spawn side, height and velocity for a new duck
pub fn place_duck<R: Rng>(rng: &mut R, tuning: &Tuning, difficulty: f64) -> Placement {
    let facing = if rng.random_bool(0.5) {
        Facing::Right
    } else {
        Facing::Left
    };
    let x = match facing {
        Facing::Right => -SPAWN_MARGIN,
        Facing::Left => tuning.field_width + SPAWN_MARGIN,
    };
    let band = tuning.field_height * SPAWN_BAND;
    let y = (rng.random::<f32>() * band + SPAWN_TOP_OFFSET).min(flight_ceiling(tuning));

    let base = (tuning.base_duck_speed as f64 + difficulty * SPEED_PER_DIFFICULTY) as f32;
    let speed = base * rng.random_range(0.5f32..1.0);
    let vertical = (rng.random::<f32>() - 0.5) * speed * VERTICAL_SPEED_FACTOR;

    Placement {
        pos: Vec2::new(x, y),
        vel: Vec2::new(speed * facing.sign(), vertical),
        facing,
    }
}

/// Raise difficulty and shorten the spawn interval for one elapsed interval
///
/// Returns true when the spawn interval changed and the timer must be re-armed.
pub fn ramp_difficulty(session: &mut Session, tuning: &Tuning) -> bool {
    session.difficulty += tuning.difficulty_increment;

    if session.spawn_rate_ms > tuning.min_spawn_rate_ms {
        let next = session
            .spawn_rate_ms
            .saturating_sub(tuning.spawn_rate_decrease_ms)
            .max(tuning.min_spawn_rate_ms);
        let changed = next != session.spawn_rate_ms;
        session.spawn_rate_ms = next;
        changed
    } else {
        false
    }
}
