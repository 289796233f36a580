//! One-shot timer queue.
//!
//! Fixed-slot, allocation-free deadline queue shared by the fall detector
//! and the escalation orchestrator.  Timers never call back; the owner
//! polls [`TimerQueue::pop_expired`] with the current clock reading and
//! reacts to whatever has fired.
//!
//! Every scheduled timer gets a fresh generation number.  Owners keep the
//! [`TimerHandle`] of the timer they are currently waiting on and ignore
//! any fired handle that does not match, so a timer that was superseded
//! by a state change can never act on the newer state.

use log::{debug, warn};

/// Identifies one scheduled timer.  Never reused while the queue lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    slot: usize,
    generation: u64,
}

impl TimerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct Pending<T> {
    deadline_ms: u64,
    generation: u64,
    tag: T,
}

pub struct TimerQueue<T, const N: usize> {
    slots: [Option<Pending<T>>; N],
    next_generation: u64,
}

impl<T, const N: usize> TimerQueue<T, N> {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            next_generation: 1,
        }
    }

    /// Arm a timer `delay_ms` after `now_ms`.  `None` when all slots are busy.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, tag: T) -> Option<TimerHandle> {
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            warn!("TimerQueue: all {} slots busy", N);
            return None;
        };
        let generation = self.next_generation;
        self.next_generation += 1;
        let deadline_ms = now_ms.saturating_add(delay_ms);
        debug!("TimerQueue: armed gen {} at slot {} for t={}", generation, slot, deadline_ms);
        self.slots[slot] = Some(Pending {
            deadline_ms,
            generation,
            tag,
        });
        Some(TimerHandle { slot, generation })
    }

    /// Disarm a timer.  Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.slots.get_mut(handle.slot) {
            Some(slot) if slot.as_ref().is_some_and(|p| p.generation == handle.generation) => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Remove and return the earliest timer whose deadline is `<= now_ms`.
    /// Ties fire in arming order.
    pub fn pop_expired(&mut self, now_ms: u64) -> Option<(TimerHandle, T)> {
        let slot = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|p| (i, p)))
            .filter(|(_, p)| p.deadline_ms <= now_ms)
            .min_by_key(|(_, p)| (p.deadline_ms, p.generation))
            .map(|(i, _)| i)?;
        let pending = self.slots[slot].take()?;
        Some((
            TimerHandle {
                slot,
                generation: pending.generation,
            },
            pending.tag,
        ))
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.slots.iter().flatten().map(|p| p.deadline_ms).min()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, const N: usize> Default for TimerQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_deadline() {
        let mut q: TimerQueue<&str, 4> = TimerQueue::new();
        let h = q.schedule(1_000, 500, "a").unwrap();
        assert!(q.pop_expired(1_499).is_none());
        assert_eq!(q.pop_expired(1_500), Some((h, "a")));
        assert!(q.is_empty());
    }

    #[test]
    fn earliest_first() {
        let mut q: TimerQueue<u8, 4> = TimerQueue::new();
        q.schedule(0, 300, 3).unwrap();
        q.schedule(0, 100, 1).unwrap();
        q.schedule(0, 200, 2).unwrap();
        assert_eq!(q.next_deadline(), Some(100));
        let order: Vec<u8> = core::iter::from_fn(|| q.pop_expired(1_000).map(|(_, t)| t)).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut q: TimerQueue<(), 2> = TimerQueue::new();
        let h = q.schedule(0, 10, ()).unwrap();
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        assert!(q.pop_expired(100).is_none());
    }

    #[test]
    fn stale_handle_does_not_cancel_reused_slot() {
        let mut q: TimerQueue<u8, 1> = TimerQueue::new();
        let old = q.schedule(0, 10, 1).unwrap();
        q.pop_expired(10).unwrap();
        let new = q.schedule(10, 10, 2).unwrap();
        assert_ne!(old, new);
        assert!(!q.cancel(old));
        assert_eq!(q.pop_expired(20), Some((new, 2)));
    }

    #[test]
    fn full_queue_rejects() {
        let mut q: TimerQueue<u8, 1> = TimerQueue::new();
        assert!(q.schedule(0, 1, 0).is_some());
        assert!(q.schedule(0, 1, 1).is_none());
    }
}
