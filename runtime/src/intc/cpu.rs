// Processor-Level Interrupt Handshake
//
// The thin layer between the interrupt controller driver and the core's
// exception model. The platform's startup code owns the exception vector
// table; its IRQ vector must branch to `pulse_irq_entry`, which forwards
// to the one attached controller's servicing sweep.
//
// `attach` may succeed exactly once per reset. The controller's `init`
// path relies on this to make a second initialization fatal instead of
// silently re-running against live hardware.
//
// The mask/unmask pair compiles to `cpsid i`/`cpsie i` on the ARM target.
// On other targets (the host-side test build) they compile to nothing, so
// the rest of the crate stays testable off-target.

use crate::intc::controller::InterruptController;
use crate::intc::LOG_ORIGIN;
use crate::log_debug;
use spin::Once;

static ATTACHED: Once<&'static InterruptController<'static>> = Once::new();

/// Binds `controller` to the IRQ trap path.
///
/// Panics on a second call: rebinding would leave the first controller
/// half-initialized with its lines still enabled.
pub(crate) fn attach(controller: &'static InterruptController<'static>) {
    if ATTACHED.is_completed() {
        panic!("interrupt controller already attached to the IRQ trap");
    }
    ATTACHED.call_once(|| controller);
    log_debug!(LOG_ORIGIN, "controller attached to IRQ trap path");
}

/// IRQ trap entry point. The startup code's IRQ vector branches here.
///
/// Runs with interrupts masked at the core per the exception model. An
/// IRQ taken before `attach` has completed is ignored; with every line
/// masked until `init`, none should occur.
#[no_mangle]
pub extern "C" fn pulse_irq_entry() {
    if let Some(controller) = ATTACHED.get() {
        controller.service();
    }
}

/// Unmasks IRQs at the core.
pub fn unmask() {
    #[cfg(target_arch = "arm")]
    unsafe {
        core::arch::asm!("cpsie i", options(nomem, nostack));
    }
}

/// Masks IRQs at the core.
pub fn mask() {
    #[cfg(target_arch = "arm")]
    unsafe {
        core::arch::asm!("cpsid i", options(nomem, nostack));
    }
}
