// Interrupt Subsystem
//
// Ties together the two halves of interrupt delivery:
//
// - `controller`: the AXI interrupt controller driver. Owns the callback
//   table, the per-line enable state, and the trap-time servicing sweep.
// - `cpu`: the processor-level handshake. Binds one controller instance to
//   the IRQ trap path and masks/unmasks interrupts at the core.
//
// Bring-up order matters and is the same as the reference applications:
// construct the controller, register every handler, then `init()` (which
// also unmasks the core), then enable the individual lines. A handler must
// be registered before its line is enabled so the servicing sweep never
// observes an enabled line racing its own registration.

pub mod controller;
pub mod cpu;

pub(crate) const LOG_ORIGIN: &str = "intc";

/// Number of interrupt input lines wired on the platform.
pub const LINE_COUNT: usize = 3;

/// Interrupt line of timer instance 0.
pub const TIMER_0_LINE: usize = 0;
/// Interrupt line of timer instance 1.
pub const TIMER_1_LINE: usize = 1;
/// Interrupt line of timer instance 2.
pub const TIMER_2_LINE: usize = 2;
