// Memory-Mapped Register Access
//
// The one module that dereferences raw pointers. Peripheral drivers never
// touch addresses themselves; they go through `RegisterBlock`, which reads
// and writes 32-bit values at fixed offsets from an instance-bound base.
//
// `Mmio` is the hardware backend. Its constructor is the single unsafe
// point: the caller vouches that the base address maps a live device
// register bank for the whole program. Every access after construction is
// a safe volatile read or write, so drivers built on top contain no
// `unsafe` at all. The test suite substitutes an in-memory backend behind
// the same trait.

/// 32-bit register access at fixed offsets from a peripheral base.
pub trait RegisterBlock {
    /// Reads the register at `offset` bytes from the base.
    fn read(&self, offset: usize) -> u32;

    /// Writes the register at `offset` bytes from the base.
    fn write(&self, offset: usize, value: u32);
}

/// A live peripheral register bank at a fixed physical base address.
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Binds a register bank at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the word-aligned base address of a device register
    /// bank that stays mapped and exclusively owned by this instance for
    /// the lifetime of the program. All offsets later passed to `read` and
    /// `write` must fall inside that bank.
    pub const unsafe fn new(base: usize) -> Self {
        Mmio { base }
    }
}

impl RegisterBlock for Mmio {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        let addr = (self.base + offset) as *const u32;
        // Volatile so the compiler never elides or reorders device reads.
        unsafe { core::ptr::read_volatile(addr) }
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        let addr = (self.base + offset) as *mut u32;
        unsafe { core::ptr::write_volatile(addr, value) }
    }
}
