//! Hit scoring, combo tracking and the 100-hit award

use serde::{Deserialize, Serialize};

use super::state::Session;
use crate::accuracy_percent;
use crate::consts::*;
use crate::settings::Tuning;

/// Combo bonus steps earned by a combo
#[inline]
pub fn combo_bonus(combo: u32) -> u32 {
    combo / COMBO_STEP
}

/// Points for a hit at the given combo and difficulty
pub fn points(base_points: u32, combo: u32, combo_multiplier: f64, difficulty: f64) -> u64 {
    let combo_factor = 1.0 + combo_bonus(combo) as f64 * combo_multiplier;
    let difficulty_factor = 1.0 + difficulty * POINTS_PER_DIFFICULTY;
    let raw = (base_points as f64 * combo_factor * difficulty_factor).floor();
    if raw.is_finite() && raw > 0.0 { raw as u64 } else { 0 }
}

/// What a single hit earned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitScore {
    pub points: u64,
    /// Combo including this hit
    pub combo: u32,
    /// This hit crossed the award milestone
    pub milestone: bool,
}

/// Record a hit: counters, combo, score and the award check
pub fn record_hit(session: &mut Session, tuning: &Tuning) -> HitScore {
    session.ducks_hit = session.ducks_hit.saturating_add(1);
    session.combo = session.combo.saturating_add(1);
    session.max_combo = session.max_combo.max(session.combo);

    let points = points(
        tuning.base_points,
        session.combo,
        tuning.combo_multiplier,
        session.difficulty,
    );
    session.score = session.score.saturating_add(points);

    HitScore {
        points,
        combo: session.combo,
        milestone: check_milestone(session),
    }
}

/// Record an escaped duck: the combo is lost, no score change
pub fn record_miss(session: &mut Session) {
    session.ducks_missed = session.ducks_missed.saturating_add(1);
    session.combo = 0;
}

/// Grant the award on the hit that lands exactly on the milestone
///
/// Only the transition onto the milestone counts; once granted it stays granted
/// until `award_granted` is explicitly cleared.
pub fn check_milestone(session: &mut Session) -> bool {
    if session.ducks_hit == AWARD_MILESTONE && !session.award_granted {
        session.award_granted = true;
        true
    } else {
        false
    }
}

/// Summary shown on the award screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardCertificate {
    pub score: u64,
    pub ducks_hit: u32,
    pub ducks_missed: u32,
    pub accuracy_percent: u32,
    pub max_combo: u32,
}

impl AwardCertificate {
    pub fn from_session(session: &Session) -> Self {
        Self {
            score: session.score,
            ducks_hit: session.ducks_hit,
            ducks_missed: session.ducks_missed,
            accuracy_percent: accuracy_percent(session.ducks_hit, session.ducks_missed),
            max_combo: session.max_combo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_points_examples() {
        assert_eq!(points(100, 1, 1.5, 1.0), 110);
        assert_eq!(points(100, 3, 1.5, 1.0), 275);
        assert_eq!(points(100, 6, 1.5, 1.0), 440);
        assert_eq!(points(100, 2, 1.5, 0.0), 100);
    }

    #[test]
    fn test_hit_then_miss() {
        let tuning = Tuning::default();
        let mut session = Session::new(&tuning);
        for expected in [110, 110, 275] {
            assert_eq!(record_hit(&mut session, &tuning).points, expected);
        }
        assert_eq!(session.score, 495);
        assert_eq!(session.combo, 3);
        assert_eq!(session.max_combo, 3);

        record_miss(&mut session);
        assert_eq!(session.combo, 0);
        assert_eq!(session.max_combo, 3);
        assert_eq!(session.ducks_missed, 1);
        assert_eq!(session.score, 495);
    }

    #[test]
    fn test_milestone_fires_once() {
        let tuning = Tuning::default();
        let mut session = Session::new(&tuning);
        session.ducks_hit = 98;
        let fired: Vec<bool> = (0..3)
            .map(|_| record_hit(&mut session, &tuning).milestone)
            .collect();
        assert_eq!(fired, vec![false, true, false]);
        assert!(session.award_granted);
    }

    #[test]
    fn test_milestone_skipped_when_forced_past() {
        let tuning = Tuning::default();
        let mut session = Session::new(&tuning);
        session.ducks_hit = 150;
        assert!(!record_hit(&mut session, &tuning).milestone);
        assert!(!session.award_granted);
    }

    #[test]
    fn test_milestone_rearms_after_reset() {
        let tuning = Tuning::default();
        let mut session = Session::new(&tuning);
        session.ducks_hit = 99;
        assert!(record_hit(&mut session, &tuning).milestone);
        session.ducks_hit = 99;
        assert!(!record_hit(&mut session, &tuning).milestone);
        session.ducks_hit = 99;
        session.award_granted = false;
        assert!(record_hit(&mut session, &tuning).milestone);
    }

    #[test]
    fn test_certificate_accuracy() {
        let mut session = Session::default();
        session.ducks_hit = 100;
        session.ducks_missed = 25;
        session.max_combo = 12;
        let cert = AwardCertificate::from_session(&session);
        assert_eq!(cert.accuracy_percent, 80);
        assert_eq!(cert.max_combo, 12);
    }

    proptest! {
        #[test]
        fn prop_combo_resets_and_max_never_drops(hits in proptest::collection::vec(any::<bool>(), 0..200)) {
            let tuning = Tuning::default();
            let mut session = Session::new(&tuning);
            let mut max_seen = 0;
            for hit in hits {
                if hit {
                    record_hit(&mut session, &tuning);
                } else {
                    record_miss(&mut session);
                    prop_assert_eq!(session.combo, 0);
                }
                prop_assert!(session.max_combo >= max_seen);
                prop_assert!(session.combo <= session.ducks_hit);
                prop_assert!(session.max_combo >= session.combo);
                max_seen = session.max_combo;
            }
        }

        #[test]
        fn prop_points_pure(combo in 0u32..500, difficulty in 0.0f64..50.0) {
            prop_assert_eq!(
                points(100, combo, 1.5, difficulty),
                points(100, combo, 1.5, difficulty)
            );
            prop_assert!(points(100, combo, 1.5, difficulty) >= 100);
        }
    }
}
