use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Cancel token for one pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Single-threaded virtual-time timer queue.
///
/// Timers are ordered by due time, then by the order they were scheduled, so
/// callbacks that share a deadline fire in submission order. Time only moves
/// when the owner drains due timers with [`Scheduler::pop_due`] and then
/// [`Scheduler::settle`]s at the target instant.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), T>,
    due_by_id: HashMap<u64, Duration>,
    closed: bool,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
            due_by_id: HashMap::new(),
            closed: false,
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Queue `task` to fire `delay` after the current instant. Returns `None`
    /// once the scheduler has been closed.
    pub fn schedule(&mut self, delay: Duration, task: T) -> Option<TimerId> {
        if self.closed {
            return None;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now.saturating_add(delay);
        self.queue.insert((due, seq), task);
        self.due_by_id.insert(seq, due);
        Some(TimerId(seq))
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let Some(due) = self.due_by_id.remove(&id.0) else {
            return false;
        };
        self.queue.remove(&(due, id.0)).is_some()
    }

    /// Remove the earliest timer due at or before `until`, advancing the
    /// clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, T)> {
        if self.closed {
            return None;
        }
        let (&(due, seq), _) = self.queue.iter().next()?;
        if due > until {
            return None;
        }
        let task = self.queue.remove(&(due, seq))?;
        self.due_by_id.remove(&seq);
        if due > self.now {
            self.now = due;
        }
        Some((TimerId(seq), task))
    }

    /// Move the clock forward to `until` once no timer is due before it.
    pub fn settle(&mut self, until: Duration) {
        if !self.closed && until > self.now {
            self.now = until;
        }
    }

    /// Drop every pending timer and refuse new ones.
    pub fn close(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        self.due_by_id.clear();
        self.closed = true;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn fires_in_deadline_then_submission_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(secs(5), "late");
        scheduler.schedule(secs(1), "first");
        scheduler.schedule(secs(1), "second");

        let mut fired = Vec::new();
        while let Some((_, task)) = scheduler.pop_due(secs(10)) {
            fired.push((scheduler.now(), task));
        }
        assert_eq!(
            fired,
            vec![(secs(1), "first"), (secs(1), "second"), (secs(5), "late")]
        );
    }

    #[test]
    fn timers_beyond_the_horizon_stay_queued() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(secs(3), ());
        assert!(scheduler.pop_due(secs(2)).is_none());
        scheduler.settle(secs(2));
        assert_eq!(scheduler.now(), secs(2));
        assert_eq!(scheduler.next_due(), Some(secs(3)));

        // Relative delays count from the settled instant.
        scheduler.schedule(secs(2), ());
        assert_eq!(scheduler.pending(), 2);
        assert!(scheduler.pop_due(secs(3)).is_some());
        assert!(scheduler.pop_due(secs(3)).is_none());
        assert!(scheduler.pop_due(secs(4)).is_some());
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule(secs(1), "keep").unwrap();
        let drop = scheduler.schedule(secs(1), "drop").unwrap();
        assert!(scheduler.cancel(drop));
        assert!(!scheduler.cancel(drop));

        let (id, task) = scheduler.pop_due(secs(1)).unwrap();
        assert_eq!((id, task), (keep, "keep"));
        assert!(scheduler.pop_due(secs(100)).is_none());
        assert!(!scheduler.cancel(keep));
    }

    #[test]
    fn closing_drops_everything_and_freezes_time() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(secs(1), 1);
        scheduler.schedule(secs(2), 2);
        assert_eq!(scheduler.close(), 2);
        assert!(scheduler.is_closed());
        assert!(scheduler.schedule(secs(1), 3).is_none());
        assert!(scheduler.pop_due(secs(10)).is_none());
        scheduler.settle(secs(10));
        assert_eq!(scheduler.now(), Duration::ZERO);
    }
}
