//! Counting semaphore between the capture interrupt and the poll loop
//!
//! The semaphore is the only synchronization between the two contexts. It is
//! built from two monotonically increasing tallies instead of one shared
//! counter:
//!
//! - `released` is written only by the producer (interrupt context)
//! - `acquired` is written only by the consumer (poll context)
//!
//! Available permits are `released - acquired` in wrapping arithmetic. Each
//! side updates its own tally with a plain load/store pair, so no
//! read-modify-write atomics are needed (Cortex-M0+ has none). The
//! `Release` store of `released` publishes the slot contents written before
//! it; the consumer's `Acquire` load makes them visible before the slot is
//! read.
//!
//! # Single-writer contract
//!
//! [`release`](CountingSemaphore::release) must only ever be called from one
//! context, and [`try_acquire`](CountingSemaphore::try_acquire) /
//! [`acquire_timeout`](CountingSemaphore::acquire_timeout) from one other
//! context. The ring buffer enforces this by giving each side its own handle.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::hal::clock::{Clock, elapsed_us};

/// Lock-free counting semaphore with single-writer tallies
#[derive(Debug)]
pub struct CountingSemaphore {
    released: AtomicU32,
    acquired: AtomicU32,
}

impl Default for CountingSemaphore {
    fn default() -> Self {
        Self::new()
    }
}

impl CountingSemaphore {
    /// Create a semaphore with no permits
    #[must_use]
    pub const fn new() -> Self {
        Self {
            released: AtomicU32::new(0),
            acquired: AtomicU32::new(0),
        }
    }

    /// Permits currently available
    ///
    /// From the producer side this may overstate the count (the consumer can
    /// acquire concurrently), never understate it.
    #[inline]
    pub fn available(&self) -> u32 {
        let acquired = self.acquired.load(Ordering::Acquire);
        let released = self.released.load(Ordering::Acquire);
        released.wrapping_sub(acquired)
    }

    /// Add one permit. Producer only.
    #[inline]
    pub fn release(&self) {
        let released = self.released.load(Ordering::Relaxed);
        self.released.store(released.wrapping_add(1), Ordering::Release);
    }

    /// Take one permit if available. Consumer only.
    #[inline]
    pub fn try_acquire(&self) -> bool {
        let acquired = self.acquired.load(Ordering::Relaxed);
        let released = self.released.load(Ordering::Acquire);
        if released.wrapping_sub(acquired) == 0 {
            return false;
        }
        self.acquired.store(acquired.wrapping_add(1), Ordering::Release);
        true
    }

    /// Spin until a permit is available or `timeout_us` has elapsed.
    /// Consumer only.
    ///
    /// Timing out is not an error; it lets the poll loop interleave its
    /// other housekeeping.
    pub fn acquire_timeout<K: Clock>(&self, clock: &K, timeout_us: u32) -> bool {
        let start = clock.now_us();
        loop {
            if self.try_acquire() {
                return true;
            }
            if elapsed_us(start, clock.now_us()) >= timeout_us {
                return false;
            }
            core::hint::spin_loop();
        }
    }
}
