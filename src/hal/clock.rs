//! Monotonic time source
//!
//! The driver only needs a free-running microsecond counter: it paces the
//! link poll, bounds the receive wait, and timestamps instrumentation
//! windows. A 32-bit counter wraps after about 71 minutes; every comparison
//! goes through [`elapsed_us`] so wrap-around is harmless.

/// Free-running microsecond counter
///
/// On RP2040 this is the low word of the TIMER peripheral; any counter that
/// increases by one per microsecond and wraps at `u32::MAX` works.
pub trait Clock {
    /// Current time in microseconds
    fn now_us(&self) -> u32;
}

impl<K: Clock + ?Sized> Clock for &K {
    #[inline]
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}

/// Microseconds from `since` to `now`, tolerant of counter wrap
#[inline]
#[must_use]
pub const fn elapsed_us(since: u32, now: u32) -> u32 {
    now.wrapping_sub(since)
}
