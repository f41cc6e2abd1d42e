//! Per-frame duck motion
//!
//! Motion is integrated once per animation frame in "units per frame"; it is
//! deliberately not scaled by the real frame duration. Lifetime is accounted in
//! nominal `FRAME_MS` steps.

use super::spawner::flight_ceiling;
use super::state::Duck;
use crate::consts::{ESCAPE_MARGIN, FRAME_MS};
use crate::settings::Tuning;

/// Result of advancing a duck one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Still on the field
    Flying,
    /// Left the field or outlived its lifetime
    Escaped,
    /// Already terminal; nothing changed
    Inert,
}

/// Advance a live duck by one frame
pub fn advance(duck: &mut Duck, tuning: &Tuning) -> Step {
    if duck.is_terminal() {
        return Step::Inert;
    }

    duck.pos += duck.vel;
    duck.lifetime_ms += FRAME_MS;

    // Bounce off top and bottom
    let max_y = flight_ceiling(tuning);
    if duck.pos.y < 0.0 {
        duck.pos.y = 0.0;
        duck.vel.y = -duck.vel.y;
    } else if duck.pos.y > max_y {
        duck.pos.y = max_y;
        duck.vel.y = -duck.vel.y;
    }

    let off_field = duck.pos.x.abs() > tuning.field_width + ESCAPE_MARGIN;
    let timed_out = duck.lifetime_ms > tuning.duck_lifetime_ms;
    if off_field || timed_out {
        Step::Escaped
    } else {
        Step::Flying
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Facing, Outcome};
    use glam::Vec2;
    use proptest::prelude::*;

    fn duck(pos: Vec2, vel: Vec2) -> Duck {
        Duck::new(1, pos, vel, Facing::Right)
    }

    #[test]
    fn test_advance_moves_one_velocity_per_frame() {
        let tuning = Tuning::default();
        let mut d = duck(Vec2::new(10.0, 100.0), Vec2::new(2.0, -1.0));
        assert_eq!(advance(&mut d, &tuning), Step::Flying);
        assert_eq!(d.pos, Vec2::new(12.0, 99.0));
        assert_eq!(d.lifetime_ms, FRAME_MS);
    }

    #[test]
    fn test_bounce_reflects_vertical_speed() {
        let tuning = Tuning::default();
        let mut d = duck(Vec2::new(100.0, 1.0), Vec2::new(1.0, -3.0));
        advance(&mut d, &tuning);
        assert_eq!(d.pos.y, 0.0);
        assert_eq!(d.vel.y, 3.0);

        let ceiling = flight_ceiling(&tuning);
        let mut d = duck(Vec2::new(100.0, ceiling - 1.0), Vec2::new(1.0, 4.0));
        advance(&mut d, &tuning);
        assert_eq!(d.pos.y, ceiling);
        assert_eq!(d.vel.y, -4.0);
    }

    #[test]
    fn test_escape_off_either_side() {
        let tuning = Tuning::default();
        let edge = tuning.field_width + ESCAPE_MARGIN;
        let mut d = duck(Vec2::new(edge, 100.0), Vec2::new(1.0, 0.0));
        assert_eq!(advance(&mut d, &tuning), Step::Escaped);
        let mut d = duck(Vec2::new(-edge, 100.0), Vec2::new(-1.0, 0.0));
        assert_eq!(advance(&mut d, &tuning), Step::Escaped);
        let mut d = duck(Vec2::new(edge, 100.0), Vec2::new(-1.0, 0.0));
        assert_eq!(advance(&mut d, &tuning), Step::Flying);
    }

    #[test]
    fn test_escape_on_lifetime() {
        let tuning = Tuning {
            duck_lifetime_ms: 32,
            ..Default::default()
        };
        let mut d = duck(Vec2::new(100.0, 100.0), Vec2::ZERO);
        assert_eq!(advance(&mut d, &tuning), Step::Flying);
        assert_eq!(advance(&mut d, &tuning), Step::Flying);
        assert_eq!(advance(&mut d, &tuning), Step::Escaped);
    }

    #[test]
    fn test_terminal_duck_is_inert() {
        let tuning = Tuning::default();
        let mut d = duck(Vec2::new(100.0, 100.0), Vec2::new(5.0, 5.0));
        d.outcome = Some(Outcome::Shot);
        assert_eq!(advance(&mut d, &tuning), Step::Inert);
        assert_eq!(d.pos, Vec2::new(100.0, 100.0));
        assert_eq!(d.lifetime_ms, 0);
    }

    proptest! {
        #[test]
        fn prop_bounce_keeps_duck_in_band(
            y in 0.0f32..420.0,
            vx in -5.0f32..5.0,
            vy in -50.0f32..50.0,
            steps in 1usize..400
        ) {
            let tuning = Tuning {
                duck_lifetime_ms: u64::MAX,
                ..Default::default()
            };
            let ceiling = flight_ceiling(&tuning);
            let mut d = duck(Vec2::new(400.0, y), Vec2::new(vx, vy));
            for _ in 0..steps {
                advance(&mut d, &tuning);
                prop_assert!(d.pos.y >= 0.0 && d.pos.y <= ceiling);
                prop_assert_eq!(d.vel.y.abs(), vy.abs());
            }
        }
    }
}
