//! Discrete-event timeline.
//!
//! Single virtual clock plus a queue of delayed session events. Popping an
//! event advances the clock to its deadline; nothing runs in parallel.
//!
//! # Invariants
//!
//! - `now()` never decreases.
//! - Events with equal deadlines fire in scheduling order.
//! - A cancelled timer is physically removed and can never fire.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    time::Duration,
};

use crate::session::{SessionEvent, TimerToken};

/// An event that reached its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredEvent {
    /// Virtual time at which it fired.
    pub at: Duration,
    /// Session generation that scheduled it.
    pub generation: u64,
    /// The event.
    pub event: SessionEvent,
}

#[derive(Debug)]
struct Entry {
    due: Duration,
    seq: u64,
    generation: u64,
    token: Option<TimerToken>,
    event: SessionEvent,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Queue of pending events over virtual time.
#[derive(Debug, Default)]
pub struct Timeline {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

impl Timeline {
    /// Empty timeline at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Deadline of the next event, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Whether the timer `token` is still pending.
    pub fn is_armed(&self, token: TimerToken) -> bool {
        self.queue.iter().any(|Reverse(entry)| entry.token == Some(token))
    }

    /// Queue `event` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, generation: u64, event: SessionEvent) {
        self.push(delay, generation, None, event);
    }

    /// Arm the timeout identified by `token`.
    pub fn arm(&mut self, token: TimerToken, delay: Duration, generation: u64) {
        self.push(delay, generation, Some(token), SessionEvent::TimeoutFired { token });
    }

    /// Remove the timer `token`. Returns whether it was pending.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.queue.len();
        self.queue.retain(|Reverse(entry)| entry.token != Some(token));
        self.queue.len() != before
    }

    /// Drop every pending event. The clock keeps its value.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Fire the next event, advancing the clock to its deadline.
    pub fn pop(&mut self) -> Option<FiredEvent> {
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        tracing::trace!(at = ?self.now, event = ?entry.event, "timeline event");
        Some(FiredEvent { at: self.now, generation: entry.generation, event: entry.event })
    }

    fn push(
        &mut self,
        delay: Duration,
        generation: u64,
        token: Option<TimerToken>,
        event: SessionEvent,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry { due: self.now + delay, seq, generation, token, event }));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn pops_in_deadline_order_and_advances_clock() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(2000), 1, SessionEvent::Transmit);
        timeline.schedule(ms(1000), 1, SessionEvent::FrameArrived { index: 0, corrupted: false });

        let first = timeline.pop().unwrap();
        assert_eq!(first.at, ms(1000));
        assert!(matches!(first.event, SessionEvent::FrameArrived { .. }));

        let second = timeline.pop().unwrap();
        assert_eq!(second.at, ms(2000));
        assert_eq!(timeline.now(), ms(2000));
        assert!(timeline.pop().is_none());
    }

    #[test]
    fn equal_deadlines_fire_fifo() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(5), 1, SessionEvent::FrameArrived { index: 0, corrupted: false });
        timeline.schedule(ms(5), 1, SessionEvent::Transmit);

        assert!(matches!(timeline.pop().unwrap().event, SessionEvent::FrameArrived { .. }));
        assert!(matches!(timeline.pop().unwrap().event, SessionEvent::Transmit));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timeline = Timeline::new();
        let token = TimerToken(7);
        timeline.arm(token, ms(3000), 1);
        timeline.schedule(ms(4000), 1, SessionEvent::Transmit);

        assert!(timeline.is_armed(token));
        assert!(timeline.cancel(token));
        assert!(!timeline.cancel(token));
        assert!(!timeline.is_armed(token));

        let fired = timeline.pop().unwrap();
        assert!(matches!(fired.event, SessionEvent::Transmit));
    }

    #[test]
    fn delays_are_relative_to_current_time() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(1000), 1, SessionEvent::Transmit);
        timeline.pop().unwrap();

        timeline.arm(TimerToken(1), ms(3000), 1);
        assert_eq!(timeline.next_deadline(), Some(ms(4000)));

        timeline.clear();
        assert!(timeline.is_empty());
        assert_eq!(timeline.now(), ms(1000));
    }
}
