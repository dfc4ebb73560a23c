//! One-shot timers measured in simulation ticks
//!
//! Timers carry plain event data instead of callbacks. Whoever advances the
//! timer decides what a fired event means.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::trace;

/// Errors reported by a timer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimerError {
    #[error("invalid timer delay: {0} ticks")]
    InvalidDelay(f64),

    #[error("timer unavailable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget one-shot scheduling
pub trait Timer<E> {
    /// Fire `event` once, `delay_ticks` from now
    fn schedule_once(&mut self, delay_ticks: f64, event: E) -> Result<(), TimerError>;

    /// Move time forward and return the events that came due, in due order
    fn advance(&mut self, dt: f64) -> Vec<E>;

    /// Number of events still waiting
    fn pending(&self) -> usize;
}

struct Scheduled<E> {
    due: f64,
    sequence: u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    // Reversed so the std max-heap pops the earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Heap-backed [`Timer`]. Events due at the same tick fire in scheduling order.
pub struct TickScheduler<E> {
    now: f64,
    next_sequence: u64,
    queue: BinaryHeap<Scheduled<E>>,
}

impl<E> Default for TickScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TickScheduler<E> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_sequence: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Ticks elapsed since creation
    pub fn now(&self) -> f64 {
        self.now
    }
}

impl<E> Timer<E> for TickScheduler<E> {
    fn schedule_once(&mut self, delay_ticks: f64, event: E) -> Result<(), TimerError> {
        if !delay_ticks.is_finite() || delay_ticks < 0.0 {
            return Err(TimerError::InvalidDelay(delay_ticks));
        }

        let due = self.now + delay_ticks;
        trace!(due, now = self.now, "Scheduled one-shot timer");
        self.queue.push(Scheduled {
            due,
            sequence: self.next_sequence,
            event,
        });
        self.next_sequence += 1;
        Ok(())
    }

    fn advance(&mut self, dt: f64) -> Vec<E> {
        self.now += dt;

        let mut fired = Vec::new();
        while self.queue.peek().is_some_and(|next| next.due <= self.now) {
            if let Some(scheduled) = self.queue.pop() {
                fired.push(scheduled.event);
            }
        }
        fired
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let mut timer = TickScheduler::new();
        timer.schedule_once(3.0, "a").unwrap();

        assert!(timer.advance(1.0).is_empty());
        assert!(timer.advance(1.0).is_empty());
        assert_eq!(timer.advance(1.0), vec!["a"]);
        assert_eq!(timer.pending(), 0);
        assert!(timer.advance(1.0).is_empty());
    }

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let mut timer = TickScheduler::new();
        timer.schedule_once(0.0, 7).unwrap();
        assert_eq!(timer.pending(), 1);
        assert_eq!(timer.advance(1.0), vec![7]);
    }

    #[test]
    fn test_due_order_and_fifo_ties() {
        let mut timer = TickScheduler::new();
        timer.schedule_once(5.0, "late").unwrap();
        timer.schedule_once(2.0, "first").unwrap();
        timer.schedule_once(2.0, "second").unwrap();
        timer.schedule_once(4.0, "middle").unwrap();

        assert_eq!(
            timer.advance(10.0),
            vec!["first", "second", "middle", "late"]
        );
    }

    #[test]
    fn test_delay_is_relative_to_now() {
        let mut timer = TickScheduler::new();
        timer.advance(10.0);
        timer.schedule_once(2.0, ()).unwrap();
        assert!(timer.advance(1.0).is_empty());
        assert_eq!(timer.advance(1.0).len(), 1);
        assert_eq!(timer.now(), 12.0);
    }

    #[test]
    fn test_rejects_invalid_delays() {
        let mut timer = TickScheduler::new();
        assert_eq!(
            timer.schedule_once(-1.0, ()),
            Err(TimerError::InvalidDelay(-1.0))
        );
        assert!(timer.schedule_once(f64::NAN, ()).is_err());
        assert!(timer.schedule_once(f64::INFINITY, ()).is_err());
        assert_eq!(timer.pending(), 0);
    }
}
