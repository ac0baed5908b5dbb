//! One-shot timers for the cooperative input loop.
//!
//! Timers are keyed by a generational [`TimerId`] and carry an arbitrary
//! payload that is handed back when the timer fires. The manager never reads
//! a clock: callers pass `now` explicitly, usually the timestamp of the
//! input sample being processed or the loop's current platform time.
//!
//! Cancelling is idempotent. A cancelled timer's queue entry is skipped
//! lazily when it reaches the front of the queue.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use slotmap::{SlotMap, new_key_type};

use crate::error::TimerError;
use crate::logging::targets;
use crate::time::Timestamp;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData<P> {
    /// When this timer fires.
    fire_time: Timestamp,
    /// Value handed back on fire.
    payload: P,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Timestamp,
    /// Insertion order, so timers sharing a fire time fire in start order.
    seq: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.seq == other.seq
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A fired timer and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer<P> {
    /// The timer that fired.
    pub id: TimerId,
    /// When the timer was due.
    pub due: Timestamp,
    /// The payload supplied when the timer was started.
    pub payload: P,
}

/// Manages pending one-shot timers.
#[derive(Debug)]
pub struct TimerManager<P> {
    /// All pending timers.
    timers: SlotMap<TimerId, TimerData<P>>,
    /// Priority queue of pending timer fires (min-heap by fire time).
    queue: BinaryHeap<TimerQueueEntry>,
    next_seq: u64,
}

impl<P> TimerManager<P> {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Start a one-shot timer that fires `delay` after `now`.
    ///
    /// Returns the timer ID that can be used to cancel the timer.
    pub fn start_one_shot(&mut self, now: Timestamp, delay: Duration, payload: P) -> TimerId {
        let fire_time = now + delay;
        let id = self.timers.insert(TimerData { fire_time, payload });
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(TimerQueueEntry { id, fire_time, seq });

        tracing::trace!(target: targets::TIMER, ?id, %fire_time, "timer started");
        id
    }

    /// Cancel a pending timer.
    ///
    /// Returns `true` if the timer was pending. Cancelling an unknown, fired
    /// or already-cancelled timer is a no-op that returns `false`.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let removed = self.timers.remove(id).is_some();
        if removed {
            tracing::trace!(target: targets::TIMER, ?id, "timer cancelled");
        }
        removed
    }

    /// Cancel a pending timer, reporting unknown IDs as an error.
    pub fn stop(&mut self, id: TimerId) -> Result<P, TimerError> {
        self.timers
            .remove(id)
            .map(|data| data.payload)
            .ok_or(TimerError::InvalidTimerId)
    }

    /// Cancel every pending timer whose payload matches `predicate`.
    ///
    /// Returns the number of timers cancelled.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&P) -> bool) -> usize {
        let before = self.timers.len();
        self.timers.retain(|_, data| !predicate(&data.payload));
        before - self.timers.len()
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the payload of a pending timer.
    pub fn payload(&self, id: TimerId) -> Option<&P> {
        self.timers.get(id).map(|data| &data.payload)
    }

    /// Get the duration from `now` until the next timer fires, if any.
    ///
    /// Returns `Some(Duration::ZERO)` if a timer is already due.
    pub fn time_until_next(&mut self, now: Timestamp) -> Option<Duration> {
        self.discard_cancelled();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_since(now))
    }

    /// Remove and return all timers due at or before `now`, in fire order.
    #[tracing::instrument(skip(self), target = "horizon_touch_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Timestamp) -> Vec<FiredTimer<P>> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            // Cancelled timers leave their queue entry behind.
            let Some(data) = self.timers.remove(entry.id) else {
                continue;
            };

            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            fired.push(FiredTimer {
                id: entry.id,
                due: data.fire_time,
                payload: data.payload,
            });
        }

        fired
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Cancel all pending timers.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    fn discard_cancelled(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl<P> Default for TimerManager<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(500), "press");

        assert!(timers.process_expired(Timestamp::from_millis(499)).is_empty());
        assert!(timers.is_active(id));

        let fired = timers.process_expired(Timestamp::from_millis(500));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, id);
        assert_eq!(fired[0].payload, "press");
        assert!(!timers.is_active(id));

        assert!(timers.process_expired(Timestamp::from_millis(10_000)).is_empty());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(10), 1u32);

        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert_eq!(timers.stop(id), Err(TimerError::InvalidTimerId));
        assert!(timers.process_expired(Timestamp::from_millis(20)).is_empty());
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_fire_order() {
        let mut timers = TimerManager::new();
        let late = timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(30), 'b');
        let early = timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(10), 'a');
        let tie = timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(30), 'c');

        let fired: Vec<_> = timers
            .process_expired(Timestamp::from_millis(30))
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(fired, vec![early, late, tie]);
    }

    #[test]
    fn test_time_until_next_skips_cancelled() {
        let mut timers = TimerManager::new();
        let first = timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(10), ());
        timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(40), ());

        assert_eq!(
            timers.time_until_next(Timestamp::ZERO),
            Some(Duration::from_millis(10))
        );
        timers.cancel(first);
        assert_eq!(
            timers.time_until_next(Timestamp::from_millis(5)),
            Some(Duration::from_millis(35))
        );
        assert_eq!(
            timers.time_until_next(Timestamp::from_millis(50)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_cancel_where() {
        let mut timers = TimerManager::new();
        timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(10), 1);
        timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(10), 2);
        timers.start_one_shot(Timestamp::ZERO, Duration::from_millis(10), 1);

        assert_eq!(timers.cancel_where(|p| *p == 1), 2);
        assert_eq!(timers.active_count(), 1);
    }
}
