//! Virtual timer queue
//!
//! Timeouts and intervals are scheduled against the frame clock and fired in
//! (due time, id) order. Handlers are free to schedule or cancel other timers
//! between pops. Every outstanding timer can be counted, so teardown can be
//! checked for leaks.

/// Opaque timer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub event: T,
    /// When it was due; handlers schedule follow-ups from here, not from "now"
    pub at_ms: f64,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    due_ms: f64,
    period_ms: Option<f64>,
    event: T,
}

/// Pending timeouts and intervals carrying an event payload
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
    scheduled_total: u64,
    cancelled_total: u64,
}

impl<T: Copy> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            scheduled_total: 0,
            cancelled_total: 0,
        }
    }

    /// Fire `event` once, `delay_ms` after `now_ms`
    pub fn set_timeout(&mut self, now_ms: f64, delay_ms: f64, event: T) -> TimerId {
        self.insert(now_ms + delay_ms.max(0.0), None, event)
    }

    /// Fire `event` every `period_ms`, first at `now_ms + period_ms`
    pub fn set_interval(&mut self, now_ms: f64, period_ms: f64, event: T) -> TimerId {
        // A zero period would spin forever inside one advance
        let period = period_ms.max(1.0);
        self.insert(now_ms + period, Some(period), event)
    }

    /// Cancel a timer; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.cancelled_total += 1;
        }
        removed
    }

    /// Cancel everything still pending; returns how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.cancelled_total += dropped as u64;
        self.entries.clear();
        dropped
    }

    /// Pop the earliest timer due at or before `now_ms`.
    ///
    /// Intervals are re-armed one period after their previous due time, so a
    /// long frame fires every missed period in order.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<Fired<T>> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)))
            .map(|(i, _)| i)?;

        let entry = &mut self.entries[index];
        let fired = Fired {
            id: entry.id,
            event: entry.event,
            at_ms: entry.due_ms,
        };
        match entry.period_ms {
            Some(period) => entry.due_ms += period,
            None => {
                self.entries.swap_remove(index);
            }
        }
        Some(fired)
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Number of timers still pending
    pub fn active(&self) -> usize {
        self.entries.len()
    }

    pub fn scheduled_total(&self) -> u64 {
        self.scheduled_total
    }

    pub fn cancelled_total(&self) -> u64 {
        self.cancelled_total
    }

    fn insert(&mut self, due_ms: f64, period_ms: Option<f64>, event: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.scheduled_total += 1;
        self.entries.push(Entry {
            id,
            due_ms,
            period_ms,
            event,
        });
        id
    }
}

impl<T: Copy> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
