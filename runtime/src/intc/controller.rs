// AXI Interrupt Controller Driver
//
// Manages the platform interrupt controller: master output enable, per-line
// input enables, a fixed-size callback table, and the servicing sweep the
// processor trap invokes.
//
// Key responsibilities:
// - `init` brings the controller from reset to delivering interrupts:
//   master enable on, every input line masked, controller bound to the
//   processor trap path, core unmasked. It must run exactly once.
// - `register` binds a zero-argument handler to one line, overwriting any
//   previous registration. Handlers run in interrupt context and must not
//   block or allocate.
// - `enable`/`disable` write one bit to the controller's set/clear pulse
//   registers, so no read-modify-write is involved and other lines are
//   never disturbed.
// - `service` sweeps pending lines in ascending index order and
//   acknowledges each one it visits, registered handler or not. A pending
//   line without a handler is acknowledged and dropped silently so an
//   unused source can never wedge the controller.
//
// Concurrency model:
// - The callback table is mutated only before the controller is bound to
//   the trap path (register-before-enable). After that the table is read
//   only, from interrupt context, through a shared reference.
// - `service` runs with interrupts masked at the core, per the processor
//   exception model; nothing in it takes a lock.

use crate::intc::{cpu, LINE_COUNT, LOG_ORIGIN};
use crate::log_info;
use crate::mmio::{Mmio, RegisterBlock};

// Register offsets from the controller base.
const IPR: usize = 0x04; // interrupt pending
const IER: usize = 0x08; // interrupt enable (whole-word)
const IAR: usize = 0x0C; // acknowledge, write 1 to clear
const SIE: usize = 0x10; // set individual enable bits
const CIE: usize = 0x14; // clear individual enable bits
const MER: usize = 0x1C; // master enable

// MER value enabling both the master output and hardware pass-through.
const MER_ENABLE: u32 = 0x3;

/// Fixed base address of the interrupt controller.
const INTC_BASE: usize = 0x4180_0000;

/// A line handler. Runs in interrupt context: keep it short, never block,
/// never allocate, and acknowledge the source device before returning.
pub type LineHandler<'h> = &'h (dyn Fn() + Sync);

/// The platform interrupt controller and its callback table.
pub struct InterruptController<'h, B: RegisterBlock = Mmio> {
    regs: B,
    handlers: [Option<LineHandler<'h>>; LINE_COUNT],
}

impl InterruptController<'static, Mmio> {
    /// Binds the driver to the platform's fixed controller base address.
    ///
    /// # Safety
    ///
    /// The caller must guarantee the controller register bank is mapped at
    /// its platform address and that no other code owns it.
    pub const unsafe fn on_platform() -> Self {
        InterruptController {
            regs: Mmio::new(INTC_BASE),
            handlers: [None; LINE_COUNT],
        }
    }

    /// Brings the controller into service.
    ///
    /// Enables the master interrupt output, masks every input line, binds
    /// this controller to the processor trap path and unmasks interrupts
    /// at the core. All registrations must already be in place; lines are
    /// enabled individually afterwards with [`enable`](Self::enable).
    ///
    /// Panics if called a second time: initialization assumes the
    /// interrupts-disabled reset state and cannot be repeated without a
    /// full reset.
    pub fn init(&'static self) {
        self.reset_controller();
        cpu::attach(self);
        cpu::unmask();
        log_info!(LOG_ORIGIN, "interrupt controller in service");
    }
}

impl<'h, B: RegisterBlock> InterruptController<'h, B> {
    /// Builds the driver over a caller-supplied register bank.
    pub const fn new(regs: B) -> Self {
        InterruptController {
            regs,
            handlers: [None; LINE_COUNT],
        }
    }

    /// Master enable on, all input lines masked.
    fn reset_controller(&self) {
        self.regs.write(MER, MER_ENABLE);
        self.regs.write(IER, 0);
    }

    fn check_line(line: usize) {
        assert!(
            line < LINE_COUNT,
            "interrupt line {} out of range (0..{})",
            line,
            LINE_COUNT
        );
    }

    /// Registers `handler` for `line`, replacing any previous handler.
    ///
    /// Registration must happen before the line is enabled; the servicing
    /// sweep reads the table from interrupt context.
    pub fn register(&mut self, line: usize, handler: LineHandler<'h>) {
        Self::check_line(line);
        self.handlers[line] = Some(handler);
    }

    /// Unmasks one input line. Other lines are untouched: the hardware
    /// exposes a dedicated set-enable pulse register.
    pub fn enable(&self, line: usize) {
        Self::check_line(line);
        self.regs.write(SIE, 1 << line);
    }

    /// Masks one input line, leaving all other enable bits untouched.
    pub fn disable(&self, line: usize) {
        Self::check_line(line);
        self.regs.write(CIE, 1 << line);
    }

    /// Services every pending line once. Invoked from the processor trap.
    ///
    /// The pending word is snapshotted on entry and the lines it names are
    /// visited in ascending index order, exactly one sweep per entry.
    /// Each visited line is acknowledged after its handler returns, and a
    /// pending line with no registered handler is acknowledged anyway so
    /// it cannot re-trigger forever.
    pub fn service(&self) {
        let pending = self.regs.read(IPR);

        for line in 0..LINE_COUNT {
            let mask = 1 << line;
            if pending & mask == 0 {
                continue;
            }

            if let Some(handler) = self.handlers[line] {
                handler();
            }

            self.regs.write(IAR, mask);
        }
    }

    #[cfg(test)]
    pub(crate) fn regs(&self) -> &B {
        &self.regs
    }
}
