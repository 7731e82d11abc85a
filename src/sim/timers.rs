//! Deterministic timer queue
//!
//! Stands in for the host's `setTimeout`/`setInterval` so the session can be
//! driven from a browser interval or from a test with exact millisecond steps.
//! Timers due at the same instant fire in the order they were scheduled.

/// What a timer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// One-second game clock
    GameClock,
    /// Turn unmatched cards back over
    FlipBack,
    /// Delay before the distraction policy begins polling
    PolicyStart,
    /// Distraction policy poll
    PolicyTick,
    /// Self re-arming ambient distraction
    Ambient,
}

/// Handle returned when scheduling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    due_ms: u64,
    /// Repeating interval, if any
    period_ms: Option<u64>,
}

/// A timer that has come due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    pub kind: TimerKind,
    /// Queue time at which it fired
    pub at_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now_ms: u64,
    timers: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn push(&mut self, kind: TimerKind, due_ms: u64, period_ms: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            kind,
            due_ms,
            period_ms,
        });
        id
    }

    /// Fire once after `delay_ms`
    pub fn once(&mut self, kind: TimerKind, delay_ms: u64) -> TimerId {
        self.push(kind, self.now_ms + delay_ms, None)
    }

    /// Fire once at queue time `due_ms` (immediately if already past)
    pub fn once_at(&mut self, kind: TimerKind, due_ms: u64) -> TimerId {
        self.push(kind, due_ms.max(self.now_ms), None)
    }

    /// Fire every `period_ms`, first after one period
    pub fn every(&mut self, kind: TimerKind, period_ms: u64) -> TimerId {
        // A zero period would fire forever within one advance
        let period_ms = period_ms.max(1);
        self.push(kind, self.now_ms + period_ms, Some(period_ms))
    }

    /// Cancel a timer. Returns false if it was not pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel every pending timer of `kind`, returning how many were removed
    pub fn cancel_kind(&mut self, kind: TimerKind) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| t.kind != kind);
        before - self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its due time. Repeating timers are re-armed.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired> {
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let (id, kind, due_ms, period_ms) = {
            let t = &self.timers[idx];
            (t.id, t.kind, t.due_ms, t.period_ms)
        };
        self.now_ms = self.now_ms.max(due_ms);
        match period_ms {
            Some(period) => self.timers[idx].due_ms += period,
            None => {
                self.timers.swap_remove(idx);
            }
        }
        Some(Fired {
            id,
            kind,
            at_ms: self.now_ms,
        })
    }

    /// Move the clock forward once every due timer has been popped
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
