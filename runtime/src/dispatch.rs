// Deferred Dispatch
//
// The handoff that lets a periodic interrupt drive application work
// without running that work in interrupt context. The pattern splits the
// two kinds of interrupt source by policy:
//
// - a cheap, latency-sensitive source does its work directly inside its
//   line handler (acknowledge, short bounded work, return)
// - a potentially long source gets a minimal handler that acknowledges
//   the hardware and calls `signal`; the real work runs from the main
//   loop, which polls `consume` (or spins in `wait`) and then ticks the
//   application
//
// This bounds interrupt-context time to "ack plus one flag write" and
// keeps heavy application logic from re-entering or masking further
// interrupts for a whole tick.
//
// Coalescing: there is exactly one unit of work in flight. A signal that
// arrives while the flag is still set raises the triggered count but does
// not queue a second dispatch. The triggered/handled gap is the
// observable record of dropped ticks; it is a diagnostic, not an error.
// For the gap to mean that, the handler must acknowledge its hardware
// source before signalling.
//
// Single producer (the line handler), single consumer (the main loop).
// The flag is the only state shared across the two contexts, so plain
// atomics are all the synchronization there is.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// One-slot handoff from a line handler to the main loop.
pub struct DeferredTick {
    pending: AtomicBool,
    triggered: AtomicU32,
    handled: AtomicU32,
}

impl DeferredTick {
    pub const fn new() -> Self {
        DeferredTick {
            pending: AtomicBool::new(false),
            triggered: AtomicU32::new(0),
            handled: AtomicU32::new(0),
        }
    }

    /// Interrupt side: records the event and marks one unit of work
    /// pending. Call after acknowledging the hardware source.
    pub fn signal(&self) {
        self.triggered.fetch_add(1, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
    }

    /// Main-loop side: claims the pending unit of work, if any.
    ///
    /// Returns whether work was pending; the caller performs the actual
    /// tick after a true return. Clearing happens before the work, so a
    /// rollover arriving mid-tick is not lost, only coalesced.
    pub fn consume(&self) -> bool {
        if self.pending.swap(false, Ordering::Acquire) {
            self.handled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Spins until a unit of work is pending, then claims it.
    ///
    /// This is a deliberate busy-wait: the hardware offers no blocking
    /// primitive and the platform has no scheduler to yield to.
    pub fn wait(&self) {
        while !self.consume() {
            core::hint::spin_loop();
        }
    }

    /// Number of times the interrupt side signalled.
    pub fn triggered(&self) -> u32 {
        self.triggered.load(Ordering::Relaxed)
    }

    /// Number of units of work the main loop actually claimed.
    pub fn handled(&self) -> u32 {
        self.handled.load(Ordering::Relaxed)
    }
}

impl Default for DeferredTick {
    fn default() -> Self {
        DeferredTick::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn signal_then_consume_dispatches_once() {
        let tick = DeferredTick::new();
        assert!(!tick.consume());

        tick.signal();
        assert!(tick.consume());
        assert!(!tick.consume());

        assert_eq!(tick.triggered(), 1);
        assert_eq!(tick.handled(), 1);
    }

    #[test]
    fn back_to_back_signals_coalesce() {
        let tick = DeferredTick::new();

        // Two rollovers land before the main loop gets to the flag.
        tick.signal();
        tick.signal();

        let mut dispatches = 0;
        while tick.consume() {
            dispatches += 1;
        }

        assert_eq!(dispatches, 1);
        assert_eq!(tick.triggered(), 2);
        assert_eq!(tick.handled(), 1);
    }

    #[test]
    fn wait_returns_once_work_is_pending() {
        let tick = DeferredTick::new();
        tick.signal();
        tick.wait();
        assert_eq!(tick.handled(), 1);
    }

    #[test]
    fn counters_track_a_steady_run() {
        let tick = DeferredTick::new();
        for _ in 0..5 {
            tick.signal();
            assert!(tick.consume());
        }
        assert_eq!(tick.triggered(), 5);
        assert_eq!(tick.handled(), 5);
    }
}
