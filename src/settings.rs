//! Runtime tunables and the live override surface
//!
//! `Tuning` holds the gameplay constants. It is owned by the running game and
//! read fresh on every step, so an override takes effect on the next tick.
//! `Overrides` carries any subset of tunables plus direct session-field values;
//! invalid entries are rejected one by one and the field keeps its prior value.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH};

/// Why an override value was not applied
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideRejected {
    /// Value could not be read as the field's type
    Unparseable { field: String },
    /// Key does not name an overridable field
    UnknownField { field: String },
    /// Value parsed but lies outside the field's valid range
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

impl fmt::Display for OverrideRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideRejected::Unparseable { field } => {
                write!(f, "override '{}' is not a valid value", field)
            }
            OverrideRejected::UnknownField { field } => {
                write!(f, "'{}' is not an overridable field", field)
            }
            OverrideRejected::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "override '{}' = {} rejected (expected {})", field, value, expected),
        }
    }
}

impl std::error::Error for OverrideRejected {}

/// Build an out-of-range rejection unless `ok` holds
pub(crate) fn ensure(
    ok: bool,
    field: &'static str,
    value: f64,
    expected: &'static str,
) -> Result<(), OverrideRejected> {
    if ok {
        Ok(())
    } else {
        Err(OverrideRejected::OutOfRange {
            field,
            value,
            expected,
        })
    }
}

/// Gameplay tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    /// Horizontal speed before difficulty scaling (units per frame)
    pub base_duck_speed: f32,
    /// A duck escapes after flying this long (ms)
    #[serde(rename = "duckLifetime")]
    pub duck_lifetime_ms: u64,
    /// Points for a hit before combo/difficulty multipliers
    pub base_points: u32,
    /// Extra multiplier per combo bonus step
    pub combo_multiplier: f64,
    /// Difficulty gained per spawn interval
    pub difficulty_increment: f64,
    /// Spawn interval shortening per spawn interval (ms)
    #[serde(rename = "spawnRateDecrease")]
    pub spawn_rate_decrease_ms: u64,
    /// Spawn interval floor (ms)
    #[serde(rename = "minSpawnRate")]
    pub min_spawn_rate_ms: u64,
    /// Cap on ducks held by the store, terminal ones included
    pub max_active_ducks: usize,
    /// Spawn interval at session start (ms)
    #[serde(rename = "initialSpawnRate")]
    pub initial_spawn_rate_ms: u64,
    /// Difficulty at session start
    pub initial_difficulty: f64,

    // === Play field ===
    pub field_width: f32,
    pub field_height: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_duck_speed: 2.0,
            duck_lifetime_ms: 10_000,
            base_points: 100,
            combo_multiplier: 1.5,
            difficulty_increment: 0.1,
            spawn_rate_decrease_ms: 50,
            min_spawn_rate_ms: 500,
            max_active_ducks: 8,
            initial_spawn_rate_ms: 2000,
            initial_difficulty: 1.0,

            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
        }
    }
}

impl Tuning {
    /// Load tunables from a (possibly partial) JSON document
    ///
    /// Missing keys keep their defaults. A document that does not parse falls
    /// back to the defaults entirely; invalid values are reset field by field.
    pub fn from_json(json: &str) -> Self {
        let mut tuning = match serde_json::from_str::<Tuning>(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Tuning document rejected ({}), using defaults", e);
                return Self::default();
            }
        };
        for rejected in tuning.validate() {
            log::warn!("{}; using default", rejected);
        }
        tuning
    }

    /// Reset every out-of-range field to its default, reporting each one
    pub fn validate(&mut self) -> Vec<OverrideRejected> {
        let defaults = Self::default();
        let mut rejected = Vec::new();

        if let Err(e) = check_speed(self.base_duck_speed) {
            self.base_duck_speed = defaults.base_duck_speed;
            rejected.push(e);
        }
        if let Err(e) = check_lifetime(self.duck_lifetime_ms) {
            self.duck_lifetime_ms = defaults.duck_lifetime_ms;
            rejected.push(e);
        }
        if let Err(e) = check_base_points(self.base_points) {
            self.base_points = defaults.base_points;
            rejected.push(e);
        }
        if let Err(e) = check_non_negative("comboMultiplier", self.combo_multiplier) {
            self.combo_multiplier = defaults.combo_multiplier;
            rejected.push(e);
        }
        if let Err(e) = check_non_negative("difficultyIncrement", self.difficulty_increment) {
            self.difficulty_increment = defaults.difficulty_increment;
            rejected.push(e);
        }
        if let Err(e) = check_min_spawn_rate(self.min_spawn_rate_ms) {
            self.min_spawn_rate_ms = defaults.min_spawn_rate_ms;
            rejected.push(e);
        }
        if let Err(e) = check_max_ducks(self.max_active_ducks) {
            self.max_active_ducks = defaults.max_active_ducks;
            rejected.push(e);
        }
        if let Err(e) = ensure(
            self.initial_spawn_rate_ms >= self.min_spawn_rate_ms,
            "initialSpawnRate",
            self.initial_spawn_rate_ms as f64,
            ">= minSpawnRate",
        ) {
            self.initial_spawn_rate_ms = defaults.initial_spawn_rate_ms.max(self.min_spawn_rate_ms);
            rejected.push(e);
        }
        if let Err(e) = check_non_negative("initialDifficulty", self.initial_difficulty) {
            self.initial_difficulty = defaults.initial_difficulty;
            rejected.push(e);
        }
        if let Err(e) = check_extent("fieldWidth", self.field_width) {
            self.field_width = defaults.field_width;
            rejected.push(e);
        }
        if let Err(e) = check_extent("fieldHeight", self.field_height) {
            self.field_height = defaults.field_height;
            rejected.push(e);
        }

        rejected
    }

    /// Apply the tunable part of an override batch
    ///
    /// Each field is checked on its own; a rejected field keeps its value and
    /// the rest of the batch still applies.
    pub fn apply(&mut self, overrides: &Overrides) -> Vec<OverrideRejected> {
        let mut rejected = Vec::new();
        let mut take = |result: Result<(), OverrideRejected>| -> bool {
            match result {
                Ok(()) => true,
                Err(e) => {
                    rejected.push(e);
                    false
                }
            }
        };

        if let Some(v) = overrides.base_duck_speed {
            if take(check_speed(v)) {
                self.base_duck_speed = v;
            }
        }
        if let Some(v) = overrides.duck_lifetime_ms {
            if take(check_lifetime(v)) {
                self.duck_lifetime_ms = v;
            }
        }
        if let Some(v) = overrides.base_points {
            if take(check_base_points(v)) {
                self.base_points = v;
            }
        }
        if let Some(v) = overrides.combo_multiplier {
            if take(check_non_negative("comboMultiplier", v)) {
                self.combo_multiplier = v;
            }
        }
        if let Some(v) = overrides.difficulty_increment {
            if take(check_non_negative("difficultyIncrement", v)) {
                self.difficulty_increment = v;
            }
        }
        if let Some(v) = overrides.spawn_rate_decrease_ms {
            self.spawn_rate_decrease_ms = v;
        }
        if let Some(v) = overrides.min_spawn_rate_ms {
            if take(check_min_spawn_rate(v)) {
                self.min_spawn_rate_ms = v;
            }
        }
        if let Some(v) = overrides.max_active_ducks {
            if take(check_max_ducks(v)) {
                self.max_active_ducks = v;
            }
        }

        rejected
    }
}

fn check_speed(v: f32) -> Result<(), OverrideRejected> {
    ensure(v.is_finite() && v > 0.0, "baseDuckSpeed", v as f64, "a positive number")
}

fn check_lifetime(v: u64) -> Result<(), OverrideRejected> {
    ensure(v > 0, "duckLifetime", v as f64, "a positive duration")
}

fn check_base_points(v: u32) -> Result<(), OverrideRejected> {
    ensure(v > 0, "basePoints", v as f64, "a positive integer")
}

fn check_min_spawn_rate(v: u64) -> Result<(), OverrideRejected> {
    ensure(v > 0, "minSpawnRate", v as f64, "a positive duration")
}

fn check_max_ducks(v: usize) -> Result<(), OverrideRejected> {
    ensure(v > 0, "maxActiveDucks", v as f64, "at least 1")
}

fn check_extent(field: &'static str, v: f32) -> Result<(), OverrideRejected> {
    ensure(v.is_finite() && v > 0.0, field, v as f64, "a positive number")
}

pub(crate) fn check_non_negative(field: &'static str, v: f64) -> Result<(), OverrideRejected> {
    ensure(v.is_finite() && v >= 0.0, field, v, "a finite number >= 0")
}

/// A batch of live overrides: any subset of tunables and session fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Overrides {
    // === Tunables ===
    pub base_duck_speed: Option<f32>,
    #[serde(rename = "duckLifetime")]
    pub duck_lifetime_ms: Option<u64>,
    pub base_points: Option<u32>,
    pub combo_multiplier: Option<f64>,
    pub difficulty_increment: Option<f64>,
    #[serde(rename = "spawnRateDecrease")]
    pub spawn_rate_decrease_ms: Option<u64>,
    #[serde(rename = "minSpawnRate")]
    pub min_spawn_rate_ms: Option<u64>,
    pub max_active_ducks: Option<usize>,

    // === Session fields ===
    pub score: Option<u64>,
    pub ducks_hit: Option<u32>,
    pub ducks_missed: Option<u32>,
    pub combo: Option<u32>,
    pub max_combo: Option<u32>,
    pub difficulty: Option<f64>,
    #[serde(rename = "spawnRate")]
    pub spawn_rate_ms: Option<u64>,
    #[serde(rename = "certificateAwarded")]
    pub award_granted: Option<bool>,
}

impl Overrides {
    /// Parse an override batch leniently
    ///
    /// Numbers may be given as JSON numbers or numeric strings. A field that
    /// cannot be read is reported and skipped; the remaining fields are kept.
    pub fn from_json(json: &str) -> (Self, Vec<OverrideRejected>) {
        let mut rejected = Vec::new();
        let map = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(map)) => map,
            _ => {
                rejected.push(OverrideRejected::Unparseable {
                    field: "<document>".to_string(),
                });
                return (Self::default(), rejected);
            }
        };

        let mut o = Self::default();
        for key in map.keys() {
            let parsed = match key.as_str() {
                "baseDuckSpeed" => lenient(&map, key).map(|v| o.base_duck_speed = Some(v)),
                "duckLifetime" => lenient(&map, key).map(|v| o.duck_lifetime_ms = Some(v)),
                "basePoints" => lenient(&map, key).map(|v| o.base_points = Some(v)),
                "comboMultiplier" => lenient(&map, key).map(|v| o.combo_multiplier = Some(v)),
                "difficultyIncrement" => {
                    lenient(&map, key).map(|v| o.difficulty_increment = Some(v))
                }
                "spawnRateDecrease" => {
                    lenient(&map, key).map(|v| o.spawn_rate_decrease_ms = Some(v))
                }
                "minSpawnRate" => lenient(&map, key).map(|v| o.min_spawn_rate_ms = Some(v)),
                "maxActiveDucks" => lenient(&map, key).map(|v| o.max_active_ducks = Some(v)),
                "score" => lenient(&map, key).map(|v| o.score = Some(v)),
                "ducksHit" => lenient(&map, key).map(|v| o.ducks_hit = Some(v)),
                "ducksMissed" => lenient(&map, key).map(|v| o.ducks_missed = Some(v)),
                "combo" => lenient(&map, key).map(|v| o.combo = Some(v)),
                "maxCombo" => lenient(&map, key).map(|v| o.max_combo = Some(v)),
                "difficulty" => lenient(&map, key).map(|v| o.difficulty = Some(v)),
                "spawnRate" => lenient(&map, key).map(|v| o.spawn_rate_ms = Some(v)),
                "certificateAwarded" => lenient(&map, key).map(|v| o.award_granted = Some(v)),
                _ => Err(OverrideRejected::UnknownField { field: key.clone() }),
            };
            if let Err(e) = parsed {
                rejected.push(e);
            }
        }
        (o, rejected)
    }

    /// Fast ducks, rapid spawning
    pub fn max_speed() -> Self {
        Self {
            base_duck_speed: Some(10.0),
            spawn_rate_ms: Some(300),
            min_spawn_rate_ms: Some(300),
            ..Default::default()
        }
    }

    /// Slow ducks, sparse spawning
    pub fn slow_motion() -> Self {
        Self {
            base_duck_speed: Some(0.5),
            spawn_rate_ms: Some(5000),
            ..Default::default()
        }
    }

    /// Every tunable back to its default, difficulty and spawn rate restarted
    pub fn factory_reset() -> Self {
        let d = Tuning::default();
        Self {
            base_duck_speed: Some(d.base_duck_speed),
            duck_lifetime_ms: Some(d.duck_lifetime_ms),
            base_points: Some(d.base_points),
            combo_multiplier: Some(d.combo_multiplier),
            difficulty_increment: Some(d.difficulty_increment),
            spawn_rate_decrease_ms: Some(d.spawn_rate_decrease_ms),
            min_spawn_rate_ms: Some(d.min_spawn_rate_ms),
            max_active_ducks: Some(d.max_active_ducks),
            difficulty: Some(d.initial_difficulty),
            spawn_rate_ms: Some(d.initial_spawn_rate_ms),
            ..Default::default()
        }
    }

    /// Inflated stats for testing the HUD
    pub fn god_mode() -> Self {
        Self {
            score: Some(10_000),
            ducks_hit: Some(200),
            max_combo: Some(50),
            ..Default::default()
        }
    }
}

/// Read `map[key]` as `T`, accepting numeric strings like a text input would
fn lenient<T>(map: &Map<String, Value>, key: &str) -> Result<T, OverrideRejected>
where
    T: DeserializeOwned + FromStr,
{
    let unparseable = || OverrideRejected::Unparseable {
        field: key.to_string(),
    };
    let value = map.get(key).ok_or_else(unparseable)?;
    if let Ok(v) = serde_json::from_value::<T>(value.clone()) {
        return Ok(v);
    }
    match value {
        Value::String(s) => s.trim().parse::<T>().map_err(|_| unparseable()),
        _ => Err(unparseable()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_game() {
        let t = Tuning::default();
        assert_eq!(t.base_duck_speed, 2.0);
        assert_eq!(t.duck_lifetime_ms, 10_000);
        assert_eq!(t.base_points, 100);
        assert_eq!(t.max_active_ducks, 8);
        assert_eq!(t.min_spawn_rate_ms, 500);
        assert_eq!(t.initial_spawn_rate_ms, 2000);
    }

    #[test]
    fn test_tuning_from_partial_json() {
        let t = Tuning::from_json(r#"{ "basePoints": 250, "maxActiveDucks": 3 }"#);
        assert_eq!(t.base_points, 250);
        assert_eq!(t.max_active_ducks, 3);
        assert_eq!(t.duck_lifetime_ms, 10_000);
    }

    #[test]
    fn test_tuning_from_bad_json_uses_defaults() {
        assert_eq!(Tuning::from_json("not json"), Tuning::default());
        let t = Tuning::from_json(r#"{ "baseDuckSpeed": -4.0, "basePoints": 7 }"#);
        assert_eq!(t.base_duck_speed, 2.0);
        assert_eq!(t.base_points, 7);
    }

    #[test]
    fn test_apply_keeps_previous_on_rejection() {
        let mut t = Tuning::default();
        let o = Overrides {
            base_duck_speed: Some(f32::NAN),
            max_active_ducks: Some(0),
            base_points: Some(150),
            ..Default::default()
        };
        let rejected = t.apply(&o);
        assert_eq!(rejected.len(), 2);
        assert_eq!(t.base_duck_speed, 2.0);
        assert_eq!(t.max_active_ducks, 8);
        assert_eq!(t.base_points, 150);
    }

    #[test]
    fn test_floor_leaves_initial_rate() {
        let mut t = Tuning::default();
        assert!(
            t.apply(&Overrides {
                min_spawn_rate_ms: Some(3000),
                ..Default::default()
            })
            .is_empty()
        );
        assert_eq!(t.min_spawn_rate_ms, 3000);
        assert_eq!(t.initial_spawn_rate_ms, 2000);
    }

    #[test]
    fn test_overrides_from_json_is_lenient() {
        let (o, rejected) = Overrides::from_json(
            r#"{ "spawnRate": "1200", "basePoints": "abc", "combo": 4, "bogus": 1 }"#,
        );
        assert_eq!(o.spawn_rate_ms, Some(1200));
        assert_eq!(o.combo, Some(4));
        assert_eq!(o.base_points, None);
        assert_eq!(rejected.len(), 2);
        assert!(rejected.contains(&OverrideRejected::UnknownField {
            field: "bogus".to_string()
        }));
    }

    #[test]
    fn test_overrides_from_garbage() {
        let (o, rejected) = Overrides::from_json("[1, 2]");
        assert_eq!(o, Overrides::default());
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn test_rejection_display() {
        let e = OverrideRejected::OutOfRange {
            field: "basePoints",
            value: 0.0,
            expected: "a positive integer",
        };
        assert_eq!(
            e.to_string(),
            "override 'basePoints' = 0 rejected (expected a positive integer)"
        );
    }
}
