// Interval Timer Driver
//
// Driver for the platform's three cascadable AXI interval timers. Each
// instance pairs two 32-bit counters into one logical 64-bit counter
// (cascade mode) and runs in one of two configurations:
//
// - count-up: counter increments from zero; used for elapsed-time
//   measurement and as a timestamp source
// - count-down with auto-reload: counter decrements from a loaded period
//   and re-latches itself on reaching zero, producing a periodic interrupt
//   source with no software involvement per period
//
// Register layout per instance (offsets from the instance base):
// TCSR0/TCSR1 control-status, TLR0/TLR1 load, TCR0/TCR1 counter, one set
// per cascade half. In cascade mode the low half's TCSR0 carries all mode,
// enable, and interrupt bits; TCSR1 participates only in load pulses.
//
// Contract notes:
// - `start`/`stop` and the interrupt enable pair are read-modify-write on
//   exactly one TCSR0 bit; other mode bits are never disturbed
// - `reload` always deasserts the load bit again within the same call.
//   A load bit left asserted freezes the counter at the load value
// - both counter halves are read inside one `elapsed_seconds` call with no
//   intervening reload, so the 64-bit value is never torn
// - timer indices outside 0..=2 are contract violations and panic
//
// A period of zero is accepted: the counter rolls over continuously, as
// fast as the hardware allows. Periods whose tick count exceeds 64 bits
// are outside the contract.

use crate::mmio::{Mmio, RegisterBlock};
use crate::{log_debug, log_info};

const LOG_ORIGIN: &str = "timer";

/// Number of hardware timer instances on the platform.
pub const TIMER_COUNT: usize = 3;

/// Input clock of every timer instance, in Hz.
pub const TIMER_CLOCK_HZ: u64 = 100_000_000;

/// Fixed base address of each timer instance, indexed by timer number.
const TIMER_BASES: [usize; TIMER_COUNT] = [0x4280_0000, 0x4284_0000, 0x4288_0000];

// Register offsets, low half then high half of the cascade.
const TCSR0: usize = 0x00;
const TLR0: usize = 0x04;
const TCR0: usize = 0x08;
const TCSR1: usize = 0x10;
const TLR1: usize = 0x14;
const TCR1: usize = 0x18;

// TCSR bits.
const UDT: u32 = 0x0002; // count down when set
const ARHT: u32 = 0x0010; // auto reload on rollover
const LOAD: u32 = 0x0020; // latch TLR into TCR while asserted
const ENIT: u32 = 0x0040; // interrupt output enable
const ENT: u32 = 0x0080; // counter enable
const TINT: u32 = 0x0100; // rollover pending, write 1 to clear
const CASC: u32 = 0x0800; // 64-bit cascade mode

/// The three fixed timer instances, addressed by index 0..=2.
pub struct IntervalTimers<B: RegisterBlock = Mmio> {
    banks: [B; TIMER_COUNT],
}

impl IntervalTimers<Mmio> {
    /// Binds the driver to the platform's fixed timer base addresses.
    ///
    /// # Safety
    ///
    /// The caller must guarantee the timer register banks are mapped at
    /// their platform addresses and that no other code owns them.
    pub const unsafe fn on_platform() -> Self {
        IntervalTimers {
            banks: [
                Mmio::new(TIMER_BASES[0]),
                Mmio::new(TIMER_BASES[1]),
                Mmio::new(TIMER_BASES[2]),
            ],
        }
    }
}

impl<B: RegisterBlock> IntervalTimers<B> {
    /// Builds the driver over caller-supplied register banks.
    pub const fn new(banks: [B; TIMER_COUNT]) -> Self {
        IntervalTimers { banks }
    }

    fn bank(&self, timer: usize) -> &B {
        assert!(
            timer < TIMER_COUNT,
            "timer index {} out of range (0..{})",
            timer,
            TIMER_COUNT
        );
        &self.banks[timer]
    }

    fn set_control_bits(&self, timer: usize, offset: usize, bits: u32) {
        let bank = self.bank(timer);
        bank.write(offset, bank.read(offset) | bits);
    }

    fn clear_control_bits(&self, timer: usize, offset: usize, bits: u32) {
        let bank = self.bank(timer);
        bank.write(offset, bank.read(offset) & !bits);
    }

    /// Configures `timer` as a 64-bit count-up counter starting from zero.
    ///
    /// Resets all control state, selects cascade mode, zeroes both load
    /// registers and latches them into the counter. The counter does not
    /// run until `start` is called.
    pub fn init_count_up(&self, timer: usize) {
        let bank = self.bank(timer);
        bank.write(TCSR0, 0);
        bank.write(TCSR1, 0);
        bank.write(TCSR0, CASC);
        bank.write(TLR0, 0);
        bank.write(TLR1, 0);
        self.reload(timer);
        log_info!(LOG_ORIGIN, "timer {} configured count-up", timer);
    }

    /// Configures `timer` as a 64-bit auto-reloading count-down counter
    /// with the given period in seconds.
    ///
    /// On reaching zero the hardware re-latches the load value itself and
    /// raises its rollover flag, so a started timer with the interrupt
    /// output enabled is a periodic interrupt source.
    pub fn init_count_down(&self, timer: usize, period_seconds: f64) {
        let ticks = (period_seconds * TIMER_CLOCK_HZ as f64) as u64;
        let low = ticks as u32;
        let high = (ticks >> 32) as u32;

        let bank = self.bank(timer);
        bank.write(TCSR0, 0);
        bank.write(TCSR1, 0);
        bank.write(TCSR0, CASC | UDT | ARHT);
        bank.write(TLR0, low);
        bank.write(TLR1, high);
        self.reload(timer);
        log_debug!(
            LOG_ORIGIN,
            "timer {} configured count-down: period {}s = {} ticks",
            timer,
            period_seconds,
            ticks
        );
    }

    /// Starts the counter. A no-op if it is already running.
    pub fn start(&self, timer: usize) {
        self.set_control_bits(timer, TCSR0, ENT);
    }

    /// Stops the counter. A no-op if it is already stopped.
    pub fn stop(&self, timer: usize) {
        self.clear_control_bits(timer, TCSR0, ENT);
    }

    /// Re-latches the counter from the load registers: back to zero for a
    /// count-up timer, back to the full period for a count-down timer.
    pub fn reload(&self, timer: usize) {
        // Pulse the load bit on both cascade halves. The deassert must
        // happen in this same call; a held load freezes the counter.
        self.set_control_bits(timer, TCSR0, LOAD);
        self.clear_control_bits(timer, TCSR0, LOAD);
        self.set_control_bits(timer, TCSR1, LOAD);
        self.clear_control_bits(timer, TCSR1, LOAD);
    }

    /// Reads the running 64-bit counter and converts it to seconds.
    ///
    /// The high half (TCR1) is read before the low half (TCR0) and the
    /// two are concatenated as `high << 32 | low`, matching the cascade
    /// wiring of the hardware.
    pub fn elapsed_seconds(&self, timer: usize) -> f64 {
        let bank = self.bank(timer);
        let high = bank.read(TCR1) as u64;
        let low = bank.read(TCR0) as u64;
        let ticks = (high << 32) | low;
        ticks as f64 / TIMER_CLOCK_HZ as f64
    }

    /// Enables the timer's own interrupt output.
    ///
    /// This is distinct from the controller-level line enable; both must
    /// be set for a rollover to reach the interrupt controller.
    pub fn enable_interrupt(&self, timer: usize) {
        self.set_control_bits(timer, TCSR0, ENIT);
    }

    /// Disables the timer's own interrupt output.
    pub fn disable_interrupt(&self, timer: usize) {
        self.clear_control_bits(timer, TCSR0, ENIT);
    }

    /// Clears the timer's rollover pending flag.
    ///
    /// Every handler bound to this timer's interrupt line must call this
    /// before returning, or the line re-triggers immediately.
    pub fn ack_interrupt(&self, timer: usize) {
        self.set_control_bits(timer, TCSR0, TINT);
        self.clear_control_bits(timer, TCSR0, TINT);
    }

    #[cfg(test)]
    pub(crate) fn regs(&self, timer: usize) -> &B {
        self.bank(timer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTimerRegs;
    use pretty_assertions::assert_eq;

    fn timers() -> IntervalTimers<FakeTimerRegs> {
        IntervalTimers::new([
            FakeTimerRegs::new(),
            FakeTimerRegs::new(),
            FakeTimerRegs::new(),
        ])
    }

    #[test]
    fn count_down_splits_period_into_cascade_halves() {
        let timers = timers();
        timers.init_count_down(0, 0.1);

        // 0.1 s at 100 MHz is 10,000,000 ticks, entirely in the low half.
        assert_eq!(timers.regs(0).load_low(), 10_000_000);
        assert_eq!(timers.regs(0).load_high(), 0);
        assert_eq!(timers.regs(0).counter(), 10_000_000);
    }

    #[test]
    fn count_down_period_spanning_both_halves() {
        let timers = timers();
        // 60 s at 100 MHz is 6e9 ticks, which needs the high half.
        timers.init_count_down(1, 60.0);

        let ticks = 6_000_000_000u64;
        assert_eq!(timers.regs(1).load_low(), ticks as u32);
        assert_eq!(timers.regs(1).load_high(), (ticks >> 32) as u32);
        assert_eq!(timers.regs(1).counter(), ticks);
    }

    #[test]
    fn init_count_down_sets_mode_bits() {
        let timers = timers();
        timers.init_count_down(0, 1.0);

        let tcsr0 = timers.regs(0).control_low();
        assert_eq!(tcsr0 & CASC, CASC);
        assert_eq!(tcsr0 & UDT, UDT);
        assert_eq!(tcsr0 & ARHT, ARHT);
        assert_eq!(tcsr0 & (ENT | ENIT | LOAD), 0);
    }

    #[test]
    fn start_and_stop_touch_only_the_enable_bit() {
        let timers = timers();
        timers.init_count_down(0, 1.0);

        let before = timers.regs(0).control_low();
        timers.start(0);
        assert_eq!(timers.regs(0).control_low(), before | ENT);

        timers.stop(0);
        assert_eq!(timers.regs(0).control_low(), before);

        // Idempotence: a second stop changes nothing.
        timers.stop(0);
        assert_eq!(timers.regs(0).control_low(), before);
    }

    #[test]
    fn interrupt_enable_round_trip_restores_control_word() {
        let timers = timers();
        timers.init_count_down(2, 0.5);

        let before = timers.regs(2).control_low();
        timers.enable_interrupt(2);
        assert_eq!(timers.regs(2).control_low(), before | ENIT);
        timers.disable_interrupt(2);
        assert_eq!(timers.regs(2).control_low(), before);
    }

    #[test]
    fn reload_never_leaves_load_asserted() {
        let timers = timers();
        timers.init_count_up(0);
        timers.reload(0);

        assert_eq!(timers.regs(0).control_low() & LOAD, 0);
        assert_eq!(timers.regs(0).control_high() & LOAD, 0);
    }

    #[test]
    fn count_up_measures_elapsed_time() {
        let timers = timers();
        timers.init_count_up(0);
        timers.start(0);

        timers.regs(0).step(TIMER_CLOCK_HZ / 4);
        assert_eq!(timers.elapsed_seconds(0), 0.25);

        // Stopping freezes the reading.
        timers.stop(0);
        timers.regs(0).step(TIMER_CLOCK_HZ);
        assert_eq!(timers.elapsed_seconds(0), 0.25);
    }

    #[test]
    fn count_up_reload_returns_to_zero() {
        let timers = timers();
        timers.init_count_up(1);
        timers.start(1);
        timers.regs(1).step(12_345);

        timers.reload(1);
        assert_eq!(timers.elapsed_seconds(1), 0.0);
    }

    #[test]
    fn elapsed_concatenates_high_then_low() {
        let timers = timers();
        timers.init_count_up(0);
        timers.start(0);

        // Run past the 32-bit boundary so both halves carry value.
        let ticks = (1u64 << 32) + 5;
        timers.regs(0).step(ticks);
        assert_eq!(timers.elapsed_seconds(0), ticks as f64 / 1e8);
    }

    #[test]
    fn count_down_auto_reloads_without_software() {
        let timers = timers();
        timers.init_count_down(0, 0.1);
        timers.enable_interrupt(0);
        timers.start(0);

        let period = TIMER_CLOCK_HZ / 10;
        timers.regs(0).step(period);

        // Rollover raised the pending flag and re-latched the full period
        // with no re-init call.
        assert!(timers.regs(0).interrupt_pending());
        assert_eq!(timers.regs(0).counter(), period);
        assert_eq!(timers.elapsed_seconds(0), 0.1);

        timers.ack_interrupt(0);
        assert!(!timers.regs(0).interrupt_pending());

        // Still counting: a second full period rolls over again.
        timers.regs(0).step(period);
        assert!(timers.regs(0).interrupt_pending());
    }

    #[test]
    fn ack_preserves_mode_and_enable_bits() {
        let timers = timers();
        timers.init_count_down(0, 0.1);
        timers.enable_interrupt(0);
        timers.start(0);

        let before = timers.regs(0).control_low();
        timers.regs(0).step(TIMER_CLOCK_HZ / 10);
        timers.ack_interrupt(0);
        assert_eq!(timers.regs(0).control_low(), before);
    }

    #[test]
    #[should_panic(expected = "timer index 3 out of range")]
    fn out_of_range_timer_panics() {
        timers().start(3);
    }
}
