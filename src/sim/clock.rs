//! Virtual clock and timers
//!
//! The clock only moves when the front end ticks the game. Two kinds of timer
//! hang off it: the repeating spawn interval and one-shot deferred actions.
//! Deferred actions carry the session generation they were scheduled in so a
//! restart can never be acted on by a stale timer.

/// One-shot action scheduled for later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Drop a terminal duck from the store after its display delay
    RemoveDuck(u32),
    /// Show the award screen
    PresentAward,
}

#[derive(Debug, Clone)]
struct Pending {
    due_ms: u64,
    seq: u64,
    generation: u32,
    action: Deferred,
}

/// Repeating spawn interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTimer {
    pub period_ms: u64,
    pub next_due_ms: u64,
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    SpawnTick {
        at_ms: u64,
    },
    Deferred {
        at_ms: u64,
        generation: u32,
        action: Deferred,
    },
}

/// Millisecond clock with a spawn interval and a deferred-action queue
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    spawn: Option<SpawnTimer>,
    pending: Vec<Pending>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Move the clock forward; due timers are collected with [`Self::pop_due`]
    pub fn advance(&mut self, dt_ms: u64) {
        self.now_ms = self.now_ms.saturating_add(dt_ms);
    }

    /// Replace the spawn interval, first firing `period_ms` after now
    pub fn arm_spawn(&mut self, period_ms: u64) {
        self.arm_spawn_from(self.now_ms, period_ms);
    }

    /// Replace the spawn interval, first firing `period_ms` after `from_ms`
    ///
    /// The old interval is dropped in the same call, so there is no window in
    /// which both could fire.
    pub fn arm_spawn_from(&mut self, from_ms: u64, period_ms: u64) {
        let period_ms = period_ms.max(1);
        self.spawn = from_ms
            .checked_add(period_ms)
            .map(|next_due_ms| SpawnTimer {
                period_ms,
                next_due_ms,
            });
    }

    pub fn spawn_timer(&self) -> Option<SpawnTimer> {
        self.spawn
    }

    /// Schedule `action` to fire `delay_ms` from now
    pub fn defer(&mut self, delay_ms: u64, generation: u32, action: Deferred) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq,
            generation,
            action,
        });
    }

    /// Number of deferred actions still waiting
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Cancel the spawn interval and every deferred action
    pub fn clear(&mut self) {
        self.spawn = None;
        self.pending.clear();
    }

    /// Take the earliest timer due at or before now
    ///
    /// With `hold_deferred` set, deferred actions stay queued (they fire once
    /// released) while the spawn interval keeps elapsing. On equal due times a
    /// deferred action goes first, then insertion order.
    pub fn pop_due(&mut self, hold_deferred: bool) -> Option<Fired> {
        let deferred = if hold_deferred {
            None
        } else {
            self.pending
                .iter()
                .enumerate()
                .filter(|(_, p)| p.due_ms <= self.now_ms)
                .min_by_key(|(_, p)| (p.due_ms, p.seq))
                .map(|(i, p)| (i, p.due_ms))
        };
        let spawn_due = self
            .spawn
            .filter(|t| t.next_due_ms <= self.now_ms)
            .map(|t| t.next_due_ms);

        match (deferred, spawn_due) {
            (Some((i, due)), spawn) if spawn.is_none_or(|s| due <= s) => {
                let p = self.pending.remove(i);
                Some(Fired::Deferred {
                    at_ms: p.due_ms,
                    generation: p.generation,
                    action: p.action,
                })
            }
            (_, Some(at_ms)) => {
                // An interval that would run past the end of time is disarmed
                self.spawn = self.spawn.and_then(|timer| {
                    at_ms
                        .checked_add(timer.period_ms)
                        .map(|next_due_ms| SpawnTimer { next_due_ms, ..timer })
                });
                Some(Fired::SpawnTick { at_ms })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler, hold: bool) -> Vec<Fired> {
        std::iter::from_fn(|| s.pop_due(hold)).collect()
    }

    #[test]
    fn test_spawn_interval_repeats() {
        let mut s = Scheduler::new();
        s.arm_spawn(100);
        s.advance(99);
        assert!(drain(&mut s, false).is_empty());
        s.advance(251);
        let fired = drain(&mut s, false);
        assert_eq!(
            fired,
            vec![
                Fired::SpawnTick { at_ms: 100 },
                Fired::SpawnTick { at_ms: 200 },
                Fired::SpawnTick { at_ms: 300 },
            ]
        );
    }

    #[test]
    fn test_rearm_replaces_old_interval() {
        let mut s = Scheduler::new();
        s.arm_spawn(100);
        s.advance(50);
        s.arm_spawn(500);
        s.advance(100);
        assert!(drain(&mut s, false).is_empty());
        s.advance(400);
        assert_eq!(drain(&mut s, false), vec![Fired::SpawnTick { at_ms: 550 }]);
    }

    #[test]
    fn test_deferred_order_and_ties() {
        let mut s = Scheduler::new();
        s.arm_spawn(1000);
        s.defer(1500, 1, Deferred::PresentAward);
        s.defer(1000, 1, Deferred::RemoveDuck(7));
        s.advance(2000);
        let fired = drain(&mut s, false);
        assert_eq!(
            fired,
            vec![
                Fired::Deferred {
                    at_ms: 1000,
                    generation: 1,
                    action: Deferred::RemoveDuck(7)
                },
                Fired::SpawnTick { at_ms: 1000 },
                Fired::Deferred {
                    at_ms: 1500,
                    generation: 1,
                    action: Deferred::PresentAward
                },
                Fired::SpawnTick { at_ms: 2000 },
            ]
        );
    }

    #[test]
    fn test_hold_keeps_deferred_queued() {
        let mut s = Scheduler::new();
        s.defer(10, 3, Deferred::RemoveDuck(1));
        s.advance(20);
        assert!(drain(&mut s, true).is_empty());
        assert_eq!(s.pending_len(), 1);
        assert_eq!(drain(&mut s, false).len(), 1);
        assert_eq!(s.pending_len(), 0);
    }

    #[test]
    fn test_interval_disarms_at_end_of_time() {
        let mut s = Scheduler::new();
        s.advance(u64::MAX - 10);
        s.arm_spawn(5);
        s.advance(u64::MAX);
        assert_eq!(drain(&mut s, false), vec![Fired::SpawnTick { at_ms: u64::MAX - 5 }]);
        assert!(s.spawn_timer().is_none());

        s.arm_spawn(1);
        assert!(s.spawn_timer().is_none());
        assert!(drain(&mut s, false).is_empty());
    }

    #[test]
    fn test_clear_cancels_everything() {
        let mut s = Scheduler::new();
        s.arm_spawn(10);
        s.defer(10, 1, Deferred::PresentAward);
        s.clear();
        s.advance(100);
        assert!(drain(&mut s, false).is_empty());
        assert!(s.spawn_timer().is_none());
    }
}
