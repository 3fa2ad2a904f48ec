//! Statistics and timing instrumentation
//!
//! Two strategies implement [`Instrumentation`]:
//!
//! - [`NoStats`]: zero-sized, every method an inlined no-op. The data path
//!   compiles to exactly what it would be without instrumentation.
//! - [`Counters`]: running totals per outcome class plus min/max/count
//!   timing windows per critical section.
//!
//! # Single-writer counters
//!
//! Each counter is only ever incremented from one context (`rx_ok`,
//! `rx_full` and `deadlock_clear` from the capture interrupt, the remaining
//! receive counters from the poll loop, `tx_ok` from the transmit path), so
//! increments are a plain load and store. Interval figures are deltas
//! against a snapshot that only the reporter writes; totals are never reset.
//!
//! Timing windows are reset by the reporter. A sample recorded by another
//! context while the reset is in progress may be lost; the windows are
//! diagnostics and never feed back into the data path.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::hal::clock::{Clock, elapsed_us};

/// Outcome classes that are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Counter {
    /// Frame captured into a ring slot
    RxOk = 0,
    /// Frame dropped: ring full, or captured by a channel out of turn
    RxFull = 1,
    /// Frame dropped on FCS mismatch
    BadCrc = 2,
    /// Host stack had no buffer for a good frame
    AllocFail = 3,
    /// Host stack refused a good frame
    DeliverFail = 4,
    /// Frame handed to the transmit DMA
    TxOk = 5,
    /// Both capture channels force-cleared
    DeadlockClear = 6,
}

impl Counter {
    /// Number of counters
    pub const COUNT: usize = 7;

    /// All counters in report order
    pub const ALL: [Counter; Counter::COUNT] = [
        Counter::RxOk,
        Counter::RxFull,
        Counter::BadCrc,
        Counter::AllocFail,
        Counter::DeliverFail,
        Counter::TxOk,
        Counter::DeadlockClear,
    ];
}

/// Instrumented critical sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Section {
    /// FCS verification of a received frame
    Crc = 0,
    /// Capture interrupt handler
    RxIrq = 1,
    /// Transmit preparation up to DMA start
    Tx = 2,
    /// Copy into and delivery to the host stack
    Deliver = 3,
}

impl Section {
    /// Number of sections
    pub const COUNT: usize = 4;

    /// All sections in report order
    pub const ALL: [Section; Section::COUNT] =
        [Section::Crc, Section::RxIrq, Section::Tx, Section::Deliver];

    /// Short name for log output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Section::Crc => "crc",
            Section::RxIrq => "rx-irq",
            Section::Tx => "tx",
            Section::Deliver => "deliver",
        }
    }
}

/// Counter deltas over one report interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    /// Frames captured
    pub rx_ok: u32,
    /// Frames transmitted
    pub tx_ok: u32,
    /// Frames dropped, ring full
    pub rx_full: u32,
    /// Frames dropped, bad FCS
    pub bad_crc: u32,
    /// Frames dropped, no host buffer
    pub alloc_fail: u32,
    /// Frames refused by the host stack
    pub deliver_fail: u32,
    /// Dual-capture force clears
    pub deadlock_clear: u32,
}

impl Report {
    /// Whether every tally is zero
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rx_ok == 0
            && self.tx_ok == 0
            && self.rx_full == 0
            && self.bad_crc == 0
            && self.alloc_fail == 0
            && self.deliver_fail == 0
            && self.deadlock_clear == 0
    }

    fn set(&mut self, counter: Counter, value: u32) {
        let field = match counter {
            Counter::RxOk => &mut self.rx_ok,
            Counter::RxFull => &mut self.rx_full,
            Counter::BadCrc => &mut self.bad_crc,
            Counter::AllocFail => &mut self.alloc_fail,
            Counter::DeliverFail => &mut self.deliver_fail,
            Counter::TxOk => &mut self.tx_ok,
            Counter::DeadlockClear => &mut self.deadlock_clear,
        };
        *field = value;
    }
}

/// Timing window summary in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowReport {
    /// Section measured
    pub section: Section,
    /// Shortest sample
    pub min_us: u32,
    /// Longest sample
    pub max_us: u32,
    /// Number of samples
    pub count: u32,
    /// Sum of all samples
    pub total_us: u32,
}

// =============================================================================
// Instrumentation Trait
// =============================================================================

/// Statistics strategy shared by the interrupt and poll contexts
pub trait Instrumentation: Sync {
    /// Whether this strategy records anything
    const ENABLED: bool;

    /// Increment `counter`
    ///
    /// Each counter must only be incremented from one context.
    fn count(&self, counter: Counter);

    /// Start timing a section; pass the result to [`end`](Self::end)
    fn begin(&self) -> u32;

    /// Record one sample for `section`
    fn end(&self, section: Section, started: u32);

    /// Running total of `counter`
    fn total(&self, counter: Counter) -> u32;

    /// Deltas since the previous call. Reporter only.
    fn take_report(&self) -> Report;

    /// Summary of `section` since the previous call, `None` without samples.
    /// Reporter only.
    fn take_window(&self, section: Section) -> Option<WindowReport>;

    /// Time `f` as one sample of `section`
    #[inline]
    fn time<R>(&self, section: Section, f: impl FnOnce() -> R) -> R {
        let started = self.begin();
        let result = f();
        self.end(section, started);
        result
    }
}

// =============================================================================
// No-op Strategy
// =============================================================================

/// Instrumentation disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStats;

impl Instrumentation for NoStats {
    const ENABLED: bool = false;

    #[inline(always)]
    fn count(&self, _counter: Counter) {}

    #[inline(always)]
    fn begin(&self) -> u32 {
        0
    }

    #[inline(always)]
    fn end(&self, _section: Section, _started: u32) {}

    #[inline(always)]
    fn total(&self, _counter: Counter) -> u32 {
        0
    }

    #[inline(always)]
    fn take_report(&self) -> Report {
        Report::default()
    }

    #[inline(always)]
    fn take_window(&self, _section: Section) -> Option<WindowReport> {
        None
    }

    #[inline(always)]
    fn time<R>(&self, _section: Section, f: impl FnOnce() -> R) -> R {
        f()
    }
}

// =============================================================================
// Counting Strategy
// =============================================================================

#[derive(Debug)]
struct TimingWindow {
    min: AtomicU32,
    max: AtomicU32,
    count: AtomicU32,
    total: AtomicU32,
}

impl TimingWindow {
    const fn new() -> Self {
        Self {
            min: AtomicU32::new(u32::MAX),
            max: AtomicU32::new(0),
            count: AtomicU32::new(0),
            total: AtomicU32::new(0),
        }
    }

    fn record(&self, sample: u32) {
        if sample < self.min.load(Ordering::Relaxed) {
            self.min.store(sample, Ordering::Relaxed);
        }
        if sample > self.max.load(Ordering::Relaxed) {
            self.max.store(sample, Ordering::Relaxed);
        }
        let total = self.total.load(Ordering::Relaxed);
        self.total.store(total.wrapping_add(sample), Ordering::Relaxed);
        let count = self.count.load(Ordering::Relaxed);
        self.count.store(count.wrapping_add(1), Ordering::Relaxed);
    }

    fn take(&self, section: Section) -> Option<WindowReport> {
        let count = self.count.load(Ordering::Relaxed);
        if count == 0 {
            return None;
        }
        let report = WindowReport {
            section,
            min_us: self.min.load(Ordering::Relaxed),
            max_us: self.max.load(Ordering::Relaxed),
            count,
            total_us: self.total.load(Ordering::Relaxed),
        };
        self.count.store(0, Ordering::Relaxed);
        self.total.store(0, Ordering::Relaxed);
        self.min.store(u32::MAX, Ordering::Relaxed);
        self.max.store(0, Ordering::Relaxed);
        Some(report)
    }
}

/// Counting strategy
///
/// Place it in a `static` next to the ring so both contexts can reach it.
#[derive(Debug)]
pub struct Counters<K: Clock> {
    clock: K,
    totals: [AtomicU32; Counter::COUNT],
    reported: [AtomicU32; Counter::COUNT],
    windows: [TimingWindow; Section::COUNT],
}

impl<K: Clock> Counters<K> {
    /// Create zeroed counters timed by `clock`
    pub const fn new(clock: K) -> Self {
        Self {
            clock,
            totals: [const { AtomicU32::new(0) }; Counter::COUNT],
            reported: [const { AtomicU32::new(0) }; Counter::COUNT],
            windows: [const { TimingWindow::new() }; Section::COUNT],
        }
    }
}

impl<K: Clock + Sync> Instrumentation for Counters<K> {
    const ENABLED: bool = true;

    #[inline]
    fn count(&self, counter: Counter) {
        let slot = &self.totals[counter as usize];
        let value = slot.load(Ordering::Relaxed);
        slot.store(value.wrapping_add(1), Ordering::Relaxed);
    }

    #[inline]
    fn begin(&self) -> u32 {
        self.clock.now_us()
    }

    #[inline]
    fn end(&self, section: Section, started: u32) {
        let sample = elapsed_us(started, self.clock.now_us());
        self.windows[section as usize].record(sample);
    }

    fn total(&self, counter: Counter) -> u32 {
        self.totals[counter as usize].load(Ordering::Relaxed)
    }

    fn take_report(&self) -> Report {
        let mut report = Report::default();
        for counter in Counter::ALL {
            let total = self.total(counter);
            let snapshot = &self.reported[counter as usize];
            report.set(counter, total.wrapping_sub(snapshot.load(Ordering::Relaxed)));
            snapshot.store(total, Ordering::Relaxed);
        }
        report
    }

    fn take_window(&self, section: Section) -> Option<WindowReport> {
        self.windows[section as usize].take(section)
    }
}
