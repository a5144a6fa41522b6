// Host-side register doubles for the unit tests.
//
// Both fakes implement `RegisterBlock` over atomic cells so handler
// closures capturing them stay `Sync`, and both model the write semantics
// the drivers depend on: pulse registers, write-1-to-clear acknowledge
// bits, and load latching. `FakeTimerRegs::step` advances the cascade
// counter the way the hardware clock would.

use crate::mmio::RegisterBlock;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

// Interrupt controller register offsets, mirroring the driver.
const IPR: usize = 0x04;
const IER: usize = 0x08;
const IAR: usize = 0x0C;
const SIE: usize = 0x10;
const CIE: usize = 0x14;
const MER: usize = 0x1C;

/// Interrupt controller bank: IER accumulated from SIE/CIE pulses, IPR
/// raised by tests and cleared through IAR.
pub struct FakeIntcRegs {
    pending: AtomicU32,
    enabled: AtomicU32,
    master: AtomicU32,
}

impl FakeIntcRegs {
    pub fn new() -> Self {
        FakeIntcRegs {
            pending: AtomicU32::new(0),
            enabled: AtomicU32::new(0),
            master: AtomicU32::new(0),
        }
    }

    /// Marks one input line pending, as the wired device would.
    pub fn raise(&self, line: usize) {
        self.pending.fetch_or(1 << line, Ordering::Relaxed);
    }

    pub fn pending_lines(&self) -> u32 {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn enabled_lines(&self) -> u32 {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled_lines(&self, lines: u32) {
        self.enabled.store(lines, Ordering::Relaxed);
    }

    pub fn master_enable(&self) -> u32 {
        self.master.load(Ordering::Relaxed)
    }
}

impl RegisterBlock for FakeIntcRegs {
    fn read(&self, offset: usize) -> u32 {
        match offset {
            IPR => self.pending.load(Ordering::Relaxed),
            IER => self.enabled.load(Ordering::Relaxed),
            MER => self.master.load(Ordering::Relaxed),
            _ => 0,
        }
    }

    fn write(&self, offset: usize, value: u32) {
        match offset {
            IER => self.enabled.store(value, Ordering::Relaxed),
            IAR => {
                self.pending.fetch_and(!value, Ordering::Relaxed);
            }
            SIE => {
                self.enabled.fetch_or(value, Ordering::Relaxed);
            }
            CIE => {
                self.enabled.fetch_and(!value, Ordering::Relaxed);
            }
            MER => self.master.store(value, Ordering::Relaxed),
            _ => {}
        }
    }
}

// Timer register offsets and bits, mirroring the driver.
const TCSR0: usize = 0x00;
const TLR0: usize = 0x04;
const TCR0: usize = 0x08;
const TCSR1: usize = 0x10;
const TLR1: usize = 0x14;
const TCR1: usize = 0x18;

const UDT: u32 = 0x0002;
const ARHT: u32 = 0x0010;
const LOAD: u32 = 0x0020;
const ENT: u32 = 0x0080;
const TINT: u32 = 0x0100;

/// One cascaded timer bank with clocked counter behavior.
pub struct FakeTimerRegs {
    control_lo: AtomicU32,
    control_hi: AtomicU32,
    load_lo: AtomicU32,
    load_hi: AtomicU32,
    counter: AtomicU64,
    pending: AtomicBool,
}

impl FakeTimerRegs {
    pub fn new() -> Self {
        FakeTimerRegs {
            control_lo: AtomicU32::new(0),
            control_hi: AtomicU32::new(0),
            load_lo: AtomicU32::new(0),
            load_hi: AtomicU32::new(0),
            counter: AtomicU64::new(0),
            pending: AtomicBool::new(false),
        }
    }

    fn load_value(&self) -> u64 {
        let low = self.load_lo.load(Ordering::Relaxed) as u64;
        let high = self.load_hi.load(Ordering::Relaxed) as u64;
        (high << 32) | low
    }

    /// Advances the hardware clock by `ticks`.
    ///
    /// A stopped counter, or one with a load bit held asserted, does not
    /// move. A count-down counter reaching zero raises the pending flag
    /// and, in auto-reload mode, re-latches the load value.
    pub fn step(&self, ticks: u64) {
        let control = self.control_lo.load(Ordering::Relaxed);
        if control & ENT == 0 {
            return;
        }
        if (control | self.control_hi.load(Ordering::Relaxed)) & LOAD != 0 {
            return;
        }

        let counter = self.counter.load(Ordering::Relaxed);
        let next = if control & UDT != 0 {
            if ticks < counter {
                counter - ticks
            } else {
                self.pending.store(true, Ordering::Relaxed);
                let past_zero = ticks - counter;
                let period = self.load_value();
                if control & ARHT != 0 && period > 0 {
                    match past_zero % period {
                        0 => period,
                        partial => period - partial,
                    }
                } else {
                    0
                }
            }
        } else {
            match counter.checked_add(ticks) {
                Some(next) => next,
                None => {
                    self.pending.store(true, Ordering::Relaxed);
                    counter.wrapping_add(ticks)
                }
            }
        };
        self.counter.store(next, Ordering::Relaxed);
    }

    pub fn interrupt_pending(&self) -> bool {
        self.pending.load(Ordering::Relaxed)
    }

    pub fn counter(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    pub fn load_low(&self) -> u32 {
        self.load_lo.load(Ordering::Relaxed)
    }

    pub fn load_high(&self) -> u32 {
        self.load_hi.load(Ordering::Relaxed)
    }

    pub fn control_low(&self) -> u32 {
        self.read(TCSR0)
    }

    pub fn control_high(&self) -> u32 {
        self.read(TCSR1)
    }

    fn latch_low(&self) {
        let low = self.load_lo.load(Ordering::Relaxed) as u64;
        let keep_high = self.counter.load(Ordering::Relaxed) & !0xFFFF_FFFF;
        self.counter.store(keep_high | low, Ordering::Relaxed);
    }

    fn latch_high(&self) {
        let high = (self.load_hi.load(Ordering::Relaxed) as u64) << 32;
        let keep_low = self.counter.load(Ordering::Relaxed) & 0xFFFF_FFFF;
        self.counter.store(high | keep_low, Ordering::Relaxed);
    }
}

impl RegisterBlock for FakeTimerRegs {
    fn read(&self, offset: usize) -> u32 {
        match offset {
            TCSR0 => {
                let pending = if self.pending.load(Ordering::Relaxed) {
                    TINT
                } else {
                    0
                };
                self.control_lo.load(Ordering::Relaxed) | pending
            }
            TCSR1 => self.control_hi.load(Ordering::Relaxed),
            TLR0 => self.load_lo.load(Ordering::Relaxed),
            TLR1 => self.load_hi.load(Ordering::Relaxed),
            TCR0 => self.counter.load(Ordering::Relaxed) as u32,
            TCR1 => (self.counter.load(Ordering::Relaxed) >> 32) as u32,
            _ => 0,
        }
    }

    fn write(&self, offset: usize, value: u32) {
        match offset {
            TCSR0 => {
                // The pending bit is write-1-to-clear, not a plain store.
                if value & TINT != 0 {
                    self.pending.store(false, Ordering::Relaxed);
                }
                self.control_lo.store(value & !TINT, Ordering::Relaxed);
                if value & LOAD != 0 {
                    self.latch_low();
                }
            }
            TCSR1 => {
                self.control_hi.store(value & !TINT, Ordering::Relaxed);
                if value & LOAD != 0 {
                    self.latch_high();
                }
            }
            TLR0 => self.load_lo.store(value, Ordering::Relaxed),
            TLR1 => self.load_hi.store(value, Ordering::Relaxed),
            _ => {}
        }
    }
}
