// Pulse runtime crate root
//
// Pulse is the hardware-facing core of a bare-metal platform built around
// memory-mapped AXI peripherals: an interrupt controller, three cascadable
// 64-bit interval timers, and the deferred-dispatch discipline that moves
// time-driven application work out of interrupt context.
//
// Key responsibilities:
// - Narrow, volatile register access at fixed offsets from peripheral bases
// - Interval timer configuration (count-up and auto-reloading count-down)
// - Interrupt line registration, masking, and trap-time servicing
// - The dispatch-flag handoff between interrupt and main-loop context
// - Structured logging through a board-supplied sink
//
// Layering (leaves first):
// - `mmio` is the only module that touches raw pointers
// - `timer` and `intc` are pure register transactions on top of `mmio`
// - `dispatch` is plain atomics, no hardware access at all
// - `log` depends on nothing below it and is usable before any driver
//
// What this crate is not:
// - No scheduler, no preemption, no dynamic timer allocation. The hardware
//   exposes exactly three timers and a fixed set of interrupt lines, and
//   the API mirrors that.
// - No display, GPIO, or application logic. Collaborators consume only the
//   tick/callback contract exposed by `intc` and `timer`.
//
// Safety model:
// - `unsafe` is confined to `Mmio::new` (asserting a base address maps a
//   device) and the interrupt-mask instructions in `intc::cpu`. Everything
//   above those points is safe Rust.
// - Register setup happens single-threaded before interrupts are unmasked;
//   the only value shared with interrupt context afterwards is the
//   dispatch flag, which is atomic.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod dispatch;
pub mod intc;
pub mod log;
pub mod mmio;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests {
    // End-to-end exercise of the runtime in the shape a board application
    // uses it: two count-down timers feed two interrupt lines, the
    // latency-sensitive line ticks directly in its handler, the heavy line
    // only raises the dispatch flag and the "application" tick runs from
    // the main-loop side.
    use crate::dispatch::DeferredTick;
    use crate::intc::controller::InterruptController;
    use crate::intc::{TIMER_0_LINE, TIMER_1_LINE};
    use crate::testing::{FakeIntcRegs, FakeTimerRegs};
    use crate::timer::{IntervalTimers, TIMER_CLOCK_HZ};
    use core::sync::atomic::{AtomicU32, Ordering};
    use pretty_assertions::assert_eq;

    #[test]
    fn deferred_game_loop_round() {
        static GAME_FLAG: DeferredTick = DeferredTick::new();
        static TOUCH_TICKS: AtomicU32 = AtomicU32::new(0);

        let timers = IntervalTimers::new([
            FakeTimerRegs::new(),
            FakeTimerRegs::new(),
            FakeTimerRegs::new(),
        ]);

        // Heavy source on timer 0, cheap source on timer 1, as in the
        // reference application split.
        timers.init_count_down(0, 0.1);
        timers.init_count_down(1, 0.01);
        timers.enable_interrupt(0);
        timers.enable_interrupt(1);

        // Heavy source: acknowledge and defer. Cheap source: acknowledge
        // and do the bounded work right there in interrupt context.
        let heavy = || {
            timers.ack_interrupt(0);
            GAME_FLAG.signal();
        };
        let cheap = || {
            timers.ack_interrupt(1);
            TOUCH_TICKS.fetch_add(1, Ordering::Relaxed);
        };

        let mut intc = InterruptController::new(FakeIntcRegs::new());
        intc.register(TIMER_0_LINE, &heavy);
        intc.register(TIMER_1_LINE, &cheap);
        intc.enable(TIMER_0_LINE);
        intc.enable(TIMER_1_LINE);

        timers.start(0);
        timers.start(1);

        // Run the cheap timer to its rollover and present both pendings to
        // the controller, lowest line first by contract.
        let tenth = TIMER_CLOCK_HZ / 10;
        timers.regs(0).step(tenth);
        timers.regs(1).step(tenth);
        assert!(timers.regs(0).interrupt_pending());
        assert!(timers.regs(1).interrupt_pending());

        intc.regs().raise(TIMER_0_LINE);
        intc.regs().raise(TIMER_1_LINE);
        intc.service();

        // Cheap work already done in interrupt context, heavy work still
        // waiting for the main loop.
        assert_eq!(TOUCH_TICKS.load(Ordering::Relaxed), 1);
        assert_eq!(GAME_FLAG.triggered(), 1);
        assert_eq!(GAME_FLAG.handled(), 0);
        assert!(!timers.regs(0).interrupt_pending());
        assert!(!timers.regs(1).interrupt_pending());

        // Main-loop side of the pattern.
        let mut game_ticks = 0u32;
        if GAME_FLAG.consume() {
            game_ticks += 1;
        }
        assert_eq!(game_ticks, 1);
        assert_eq!(GAME_FLAG.handled(), 1);

        // The count-down timers kept going without reprogramming.
        assert!(timers.elapsed_seconds(0) > 0.0);
    }
}
