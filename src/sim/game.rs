//! Session engine
//!
//! `Game` owns the tuning, the session counters, the duck store and the clock.
//! A front end calls [`Game::tick`] once per animation frame and feeds player
//! actions in as commands between ticks; every mutation happens at one of those
//! two boundaries, so a given seed and input sequence always replays the same.

use rand_pcg::Pcg32;

use super::clock::{Deferred, Fired, Scheduler};
use super::events::{DuckSnapshot, GameEvent, Snapshot};
use super::motion::{Step, advance};
use super::scoring::{AwardCertificate, record_hit, record_miss};
use super::spawner::{has_room, place_duck, ramp_difficulty};
use super::state::{Duck, GamePhase, Outcome, RngState, Session};
use crate::consts::*;
use crate::settings::{OverrideRejected, Overrides, Tuning, check_non_negative, ensure};

/// Inbound command from the front end
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    TogglePause,
    Restart,
    Shoot(u32),
    DismissAward,
    AwardNow,
    ClearDucks,
    Override(Overrides),
}

/// The game engine
#[derive(Debug, Clone)]
pub struct Game {
    tuning: Tuning,
    session: Session,
    phase: GamePhase,
    /// Sorted by id; terminal ducks stay until their removal fires
    ducks: Vec<Duck>,
    scheduler: Scheduler,
    rng_state: RngState,
    rng: Pcg32,
    /// Bumped on every start so timers from an earlier session are ignored
    generation: u32,
    next_id: u32,
    award_showing: bool,
    events: Vec<GameEvent>,
}

impl Game {
    /// Create an idle game with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(Tuning::default(), seed)
    }

    /// Create an idle game with the given tuning
    pub fn with_tuning(mut tuning: Tuning, seed: u64) -> Self {
        for rejected in tuning.validate() {
            log::warn!("{}; using default", rejected);
        }
        let rng_state = RngState::new(seed);
        Self {
            session: Session::new(&tuning),
            tuning,
            phase: GamePhase::Idle,
            ducks: Vec::new(),
            scheduler: Scheduler::new(),
            rng: rng_state.to_rng(),
            rng_state,
            generation: 0,
            next_id: 1,
            award_showing: false,
            events: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn ducks(&self) -> &[Duck] {
        &self.ducks
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn seed(&self) -> u64 {
        self.rng_state.seed
    }

    /// Current virtual time (ms)
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now()
    }

    /// Current spawn interval period, if armed
    pub fn spawn_period_ms(&self) -> Option<u64> {
        self.scheduler.spawn_timer().map(|t| t.period_ms)
    }

    pub fn is_award_showing(&self) -> bool {
        self.award_showing
    }

    /// Ducks still flying (not shot or escaped)
    pub fn live_count(&self) -> usize {
        self.ducks.iter().filter(|d| !d.is_terminal()).count()
    }

    /// Read-only copy of everything a renderer needs
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            is_active: self.phase.is_active(),
            is_paused: self.phase == GamePhase::Paused,
            award_showing: self.award_showing,
            session: self.session.clone(),
            ducks: self.ducks.iter().map(DuckSnapshot::from).collect(),
        }
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply a front-end command
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::TogglePause => self.toggle_pause(),
            Command::Restart => self.restart(),
            Command::Shoot(id) => {
                self.shoot(id);
            }
            Command::DismissAward => self.dismiss_award(),
            Command::AwardNow => self.award_now(),
            Command::ClearDucks => self.clear_ducks(),
            Command::Override(overrides) => {
                self.apply_overrides(&overrides);
            }
        }
    }

    /// Begin a fresh session
    ///
    /// Calling this mid-session resets it; it never fails.
    pub fn start(&mut self) {
        self.quiesce();
        self.session = Session::new(&self.tuning);
        self.phase = GamePhase::Running;
        self.generation = self.generation.wrapping_add(1);
        self.scheduler.arm_spawn(self.session.spawn_rate_ms);
        self.events.push(GameEvent::SessionStarted {
            generation: self.generation,
        });
        log::info!(
            "Session {} started (spawn rate {} ms, difficulty {:.1})",
            self.generation,
            self.session.spawn_rate_ms,
            self.session.difficulty
        );

        // First duck right away, the interval takes over from here
        self.spawn_duck();
    }

    /// Tear down the current session and start a new one
    pub fn restart(&mut self) {
        self.phase = GamePhase::Restarting;
        log::info!("Restarting after session {}", self.generation);
        self.start();
    }

    /// Flip between running and paused; ignored with no active session
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                self.events.push(GameEvent::Paused);
                log::info!("Paused at {} ms", self.now_ms());
            }
            GamePhase::Paused => {
                self.award_showing = false;
                self.phase = GamePhase::Running;
                self.events.push(GameEvent::Resumed);
                log::info!("Resumed at {} ms", self.now_ms());
            }
            GamePhase::Idle | GamePhase::Restarting => {}
        }
    }

    /// Close the award screen and resume play
    pub fn dismiss_award(&mut self) {
        if !self.award_showing {
            return;
        }
        self.award_showing = false;
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Running;
            self.events.push(GameEvent::Resumed);
        }
    }

    /// Jump straight to the milestone and show the award screen
    ///
    /// Sets the hit count to the milestone and grants the award without a hit,
    /// so no `MilestoneReached` is emitted. Ignored with no active session.
    pub fn award_now(&mut self) {
        if !self.phase.is_active() {
            return;
        }
        let s = &mut self.session;
        s.ducks_hit = AWARD_MILESTONE;
        s.combo = s.combo.min(AWARD_MILESTONE);
        s.award_granted = true;
        log::info!("Award forced at {} ms", self.now_ms());
        self.present_award();
    }

    /// Shoot a duck, returning the points earned
    ///
    /// Unknown, already-terminal ducks and shots while not running are ignored.
    pub fn shoot(&mut self, id: u32) -> Option<u64> {
        if self.phase != GamePhase::Running {
            return None;
        }
        let duck = self
            .ducks
            .iter_mut()
            .find(|d| d.id == id && !d.is_terminal())?;
        duck.outcome = Some(Outcome::Shot);

        let hit = record_hit(&mut self.session, &self.tuning);
        self.events.push(GameEvent::DuckShot {
            id,
            points: hit.points,
            combo: hit.combo,
        });
        log::debug!("Duck {} shot: +{} (combo {})", id, hit.points, hit.combo);

        if hit.milestone {
            self.events.push(GameEvent::MilestoneReached);
            self.scheduler
                .defer(AWARD_DELAY_MS, self.generation, Deferred::PresentAward);
            log::info!("Milestone reached: {} ducks hit", self.session.ducks_hit);
        }
        self.scheduler
            .defer(REMOVAL_DELAY_MS, self.generation, Deferred::RemoveDuck(id));

        Some(hit.points)
    }

    /// Drop every duck from the store at once, without miss accounting
    pub fn clear_ducks(&mut self) {
        for duck in self.ducks.drain(..) {
            self.events.push(GameEvent::DuckRemoved { id: duck.id });
        }
        log::debug!("All ducks cleared");
    }

    /// Apply a batch of live overrides
    ///
    /// Each rejected entry is logged and returned; its field keeps the previous
    /// value. A changed spawn rate re-arms the spawn interval immediately.
    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Vec<OverrideRejected> {
        let mut rejected = self.tuning.apply(overrides);
        let previous_rate = self.session.spawn_rate_ms;
        let s = &mut self.session;

        // Hit count and combo are checked together against the batch's result
        let hit = overrides.ducks_hit.unwrap_or(s.ducks_hit);
        let combo = overrides.combo.unwrap_or(s.combo);
        if combo <= hit {
            s.ducks_hit = hit;
            s.combo = combo;
            s.max_combo = s.max_combo.max(combo);
        } else {
            if let Some(v) = overrides.combo {
                rejected.push(OverrideRejected::OutOfRange {
                    field: "combo",
                    value: v as f64,
                    expected: "<= ducksHit",
                });
            }
            if let Some(v) = overrides.ducks_hit {
                match ensure(v >= s.combo, "ducksHit", v as f64, ">= combo") {
                    Ok(()) => s.ducks_hit = v,
                    Err(e) => rejected.push(e),
                }
            }
        }
        if let Some(v) = overrides.ducks_missed {
            s.ducks_missed = v;
        }
        if let Some(v) = overrides.max_combo {
            match ensure(v >= s.max_combo, "maxCombo", v as f64, ">= current maxCombo") {
                Ok(()) => s.max_combo = v,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(v) = overrides.score {
            s.score = v;
        }
        if let Some(v) = overrides.difficulty {
            match check_non_negative("difficulty", v) {
                Ok(()) => s.difficulty = v,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(v) = overrides.spawn_rate_ms {
            match ensure(
                v >= self.tuning.min_spawn_rate_ms,
                "spawnRate",
                v as f64,
                ">= minSpawnRate",
            ) {
                Ok(()) => s.spawn_rate_ms = v,
                Err(e) => rejected.push(e),
            }
        }
        if let Some(v) = overrides.award_granted {
            s.award_granted = v;
        }
        // A raised floor lifts the current rate with it
        s.spawn_rate_ms = s.spawn_rate_ms.max(self.tuning.min_spawn_rate_ms);

        if self.session.spawn_rate_ms != previous_rate && self.phase.is_active() {
            self.scheduler.arm_spawn(self.session.spawn_rate_ms);
            self.events.push(GameEvent::SpawnRateChanged {
                spawn_rate_ms: self.session.spawn_rate_ms,
            });
        }

        for e in &rejected {
            log::warn!("{}; keeping previous value", e);
        }
        rejected
    }

    /// Advance one animation frame of `dt_ms` real time
    ///
    /// Due timers fire first in time order, then every live duck moves one step.
    /// While paused the clock still runs but nothing in the game changes.
    /// A single tick covers at most `MAX_TICK_MS`.
    pub fn tick(&mut self, dt_ms: u64) {
        self.scheduler.advance(dt_ms.min(MAX_TICK_MS));
        if !self.phase.is_active() {
            return;
        }

        while let Some(fired) = self.scheduler.pop_due(self.phase == GamePhase::Paused) {
            self.fire(fired);
        }

        if self.phase == GamePhase::Running {
            self.step_ducks();
        }
    }

    /// Advance one nominal frame
    pub fn frame(&mut self) {
        self.tick(FRAME_MS);
    }

    fn fire(&mut self, fired: Fired) {
        match fired {
            Fired::SpawnTick { at_ms } => {
                // Interval elapses while paused, but has no effect
                if self.phase != GamePhase::Running {
                    return;
                }
                self.spawn_duck();
                if ramp_difficulty(&mut self.session, &self.tuning) {
                    self.scheduler
                        .arm_spawn_from(at_ms, self.session.spawn_rate_ms);
                    self.events.push(GameEvent::SpawnRateChanged {
                        spawn_rate_ms: self.session.spawn_rate_ms,
                    });
                }
            }
            Fired::Deferred {
                generation, action, ..
            } => {
                if generation != self.generation {
                    return;
                }
                match action {
                    Deferred::RemoveDuck(id) => self.remove_duck(id),
                    Deferred::PresentAward => self.present_award(),
                }
            }
        }
    }

    fn spawn_duck(&mut self) {
        if !has_room(self.ducks.len(), &self.tuning) {
            return;
        }
        let placement = place_duck(&mut self.rng, &self.tuning, self.session.difficulty);
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        self.ducks
            .push(Duck::new(id, placement.pos, placement.vel, placement.facing));
        self.events.push(GameEvent::DuckSpawned {
            id,
            x: placement.pos.x,
            y: placement.pos.y,
            facing: placement.facing,
        });
        log::debug!(
            "Duck {} spawned at ({:.0}, {:.0}) heading {:?}",
            id,
            placement.pos.x,
            placement.pos.y,
            placement.facing
        );
    }

    fn step_ducks(&mut self) {
        for duck in self.ducks.iter_mut() {
            if advance(duck, &self.tuning) != Step::Escaped {
                continue;
            }
            duck.outcome = Some(Outcome::Escaped);
            record_miss(&mut self.session);
            self.events.push(GameEvent::DuckEscaped { id: duck.id });
            self.scheduler
                .defer(REMOVAL_DELAY_MS, self.generation, Deferred::RemoveDuck(duck.id));
            log::debug!("Duck {} escaped after {} ms", duck.id, duck.lifetime_ms);
        }
    }

    fn remove_duck(&mut self, id: u32) {
        if let Some(index) = self
            .ducks
            .iter()
            .position(|d| d.id == id && d.is_terminal())
        {
            self.ducks.remove(index);
            self.events.push(GameEvent::DuckRemoved { id });
        }
    }

    fn present_award(&mut self) {
        let certificate = AwardCertificate::from_session(&self.session);
        log::info!(
            "Award presented: score {}, accuracy {}%, max combo {}",
            certificate.score,
            certificate.accuracy_percent,
            certificate.max_combo
        );
        self.award_showing = true;
        if self.phase == GamePhase::Running {
            self.phase = GamePhase::Paused;
        }
        self.events.push(GameEvent::AwardPresented(certificate));
    }

    /// Cancel every timer and empty the store
    fn quiesce(&mut self) {
        self.scheduler.clear();
        self.ducks.clear();
        self.award_showing = false;
    }
}
