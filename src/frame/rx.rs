//! Receive ring
//!
//! Frames flow from the capture interrupt to the poll loop through a fixed
//! ring of [`SLOT_SIZE`]-byte slots:
//!
//! ```text
//!  capture SM ──DMA──▶ slot[head]      (RxProducer, interrupt context)
//!                         │ permits.release()
//!                         ▼
//!  host stack ◀─copy── slot[rear]      (RxConsumer, poll context)
//! ```
//!
//! # Ownership
//!
//! [`RxRing::split`] hands out exactly one [`RxProducer`] and one
//! [`RxConsumer`]. `head` lives in the producer, `rear` in the consumer, so
//! each index has a single writer by construction. The
//! [`CountingSemaphore`] is the only state both sides touch: one permit per
//! completed capture, released after the slot length is written and
//! acquired before the slot is read.
//!
//! # Backpressure
//!
//! Before arming a slot the producer checks
//! `permits + slots armed on the other channel` against
//! `N - RESERVED_SLOTS`. At or above it the channel is pointed at a scratch
//! buffer instead and the next frame is dropped (`rx_full`). The reserve
//! covers the slot the consumer is reading after taking its permit, so a
//! slot is never re-armed while its contents can still be read.
//!
//! # Dual capture
//!
//! With two capture state machines, frames alternate between them and one
//! channel is re-armed while the other is already listening. Permits are
//! only ever released for `head`: a channel that completes while the other
//! one still holds `head` has its frame dropped (`rx_full`) and is re-armed
//! on the slot it already had. If both channels are found waiting at their
//! wrap point in the same interrupt, both are force-cleared and the two
//! frames are lost (`deadlock_clear`); indices and permits are left
//! untouched.

use core::cell::UnsafeCell;

use crate::driver::config::CaptureMode;
use crate::driver::error::{IoError, IoResult};
use crate::driver::netif::NetStack;
use crate::driver::stats::{Counter, Instrumentation, Section};
use crate::frame::crc;
use crate::hal::clock::Clock;
use crate::hal::sequencer::CaptureChannel;
use crate::internal::constants::{FCS_SIZE, RESERVED_SLOTS, SLOT_SIZE};
use crate::sync::semaphore::CountingSemaphore;

/// Result of one consumer step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxOutcome {
    /// No frame arrived within the wait
    Idle,
    /// Frame of this many bytes (FCS excluded) handed to the host stack
    Delivered(usize),
    /// FCS mismatch; frame dropped
    BadCrc,
    /// Host stack had no buffer; frame dropped
    NoBuffer,
    /// Host stack refused the frame
    DeliveryFailed,
}

struct FrameSlot {
    data: [u8; SLOT_SIZE],
    len: usize,
}

impl FrameSlot {
    const fn new() -> Self {
        Self {
            data: [0; SLOT_SIZE],
            len: 0,
        }
    }
}

/// Fixed ring of capture slots shared by the producer and consumer
///
/// Place it in a `static`: DMA writes into the slots while the interrupt
/// handler and poll loop hold their handles.
///
/// ```ignore
/// static mut RING: RxRing<NoStats, 4> = RxRing::new(NoStats);
/// let ring = unsafe { &mut *core::ptr::addr_of_mut!(RING) };
/// let (producer, consumer) = ring.split(Capture::Single(capture));
/// ```
pub struct RxRing<S: Instrumentation, const N: usize> {
    slots: [UnsafeCell<FrameSlot>; N],
    dummy: UnsafeCell<[u8; SLOT_SIZE]>,
    permits: CountingSemaphore,
    stats: S,
}

// SAFETY: slot contents are handed between contexts through the semaphore;
// each slot is written only while armed and read only while its permit is
// held by the consumer (see module docs).
unsafe impl<S: Instrumentation, const N: usize> Sync for RxRing<S, N> {}

impl<S: Instrumentation, const N: usize> RxRing<S, N> {
    const RESERVE_FITS: () = assert!(N > RESERVED_SLOTS, "ring must be larger than the reserve");

    /// Create an empty ring
    pub const fn new(stats: S) -> Self {
        let () = Self::RESERVE_FITS;
        Self {
            slots: [const { UnsafeCell::new(FrameSlot::new()) }; N],
            dummy: UnsafeCell::new([0; SLOT_SIZE]),
            permits: CountingSemaphore::new(),
            stats,
        }
    }

    /// Split into the interrupt-side producer and poll-side consumer
    pub fn split<C: CaptureChannel>(
        &mut self,
        capture: Capture<C>,
    ) -> (RxProducer<'_, C, S, N>, RxConsumer<'_, S, N>) {
        let ring: &Self = self;
        let mode = capture.mode();
        let (primary, secondary) = match capture {
            Capture::Single(channel) => (Lane::new(channel), None),
            Capture::Dual(first, second) => (Lane::new(first), Some(Lane::new(second))),
        };
        (
            RxProducer {
                ring,
                head: 0,
                primary,
                secondary,
            },
            RxConsumer { ring, rear: 0, mode },
        )
    }

    /// Instrumentation shared by both handles
    pub fn stats(&self) -> &S {
        &self.stats
    }

    fn slot_ptr(&self, index: usize) -> *mut u8 {
        let slot = self.slots[index].get();
        // SAFETY: projecting a field of a live slot; no reference is created.
        unsafe { (&raw mut (*slot).data).cast::<u8>() }
    }

    fn target_ptr(&self, target: Target) -> *mut u8 {
        match target {
            Target::Slot(index) => self.slot_ptr(index),
            Target::Dummy | Target::Idle => self.dummy.get().cast::<u8>(),
        }
    }
}

/// Capture channels handed to the producer
#[derive(Debug)]
pub enum Capture<C> {
    /// One capture state machine
    Single(C),
    /// Two capture state machines taking frames in turn
    Dual(C, C),
}

impl<C> Capture<C> {
    /// The capture mode these channels implement
    pub const fn mode(&self) -> CaptureMode {
        match self {
            Capture::Single(_) => CaptureMode::Single,
            Capture::Dual(..) => CaptureMode::Dual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Idle,
    Slot(usize),
    Dummy,
}

struct Lane<C> {
    channel: C,
    target: Target,
}

impl<C> Lane<C> {
    const fn new(channel: C) -> Self {
        Self {
            channel,
            target: Target::Idle,
        }
    }

    const fn holds_slot(&self) -> bool {
        matches!(self.target, Target::Slot(_))
    }
}

// =============================================================================
// Producer (interrupt context)
// =============================================================================

/// Interrupt-side handle: services capture completions
///
/// Nothing here blocks, allocates or logs. On RP2040 put the interrupt
/// handler that calls [`on_interrupt`](Self::on_interrupt) in RAM.
pub struct RxProducer<'a, C: CaptureChannel, S: Instrumentation, const N: usize> {
    ring: &'a RxRing<S, N>,
    head: usize,
    primary: Lane<C>,
    secondary: Option<Lane<C>>,
}

impl<C: CaptureChannel, S: Instrumentation, const N: usize> RxProducer<'_, C, S, N> {
    /// Arm every capture channel and let it listen
    ///
    /// Call once, before enabling the capture interrupt.
    pub fn start(&mut self) {
        let target = self.next_target(0);
        self.arm_primary(target);
        if self.secondary.is_some() {
            let others = usize::from(self.primary.holds_slot());
            let target = self.next_target(others);
            self.arm_secondary(target);
        }
    }

    /// Capture interrupt handler body
    pub fn on_interrupt(&mut self) {
        let ring = self.ring;
        let stats = &ring.stats;
        let started = stats.begin();

        let primary = self.primary.channel.wrap_pending();
        let secondary = self
            .secondary
            .as_ref()
            .is_some_and(|lane| lane.channel.wrap_pending());

        match (primary, secondary) {
            (true, true) => {
                self.primary.channel.force_clear_wrap();
                if let Some(lane) = self.secondary.as_mut() {
                    lane.channel.force_clear_wrap();
                }
                stats.count(Counter::DeadlockClear);
            }
            (true, false) => {
                let current = self.primary.target;
                if self.in_turn(current) {
                    let len = self.primary.channel.captured_len();
                    self.commit(current, len);
                    let others = usize::from(self.secondary.as_ref().is_some_and(Lane::holds_slot));
                    let target = self.next_target(others);
                    self.arm_primary(target);
                } else {
                    stats.count(Counter::RxFull);
                    self.arm_primary(current);
                }
            }
            (false, true) => {
                let lane_target = self.secondary.as_ref().map(|lane| (lane.target, lane.channel.captured_len()));
                if let Some((current, len)) = lane_target {
                    if self.in_turn(current) {
                        self.commit(current, len);
                        let others = usize::from(self.primary.holds_slot());
                        let target = self.next_target(others);
                        self.arm_secondary(target);
                    } else {
                        stats.count(Counter::RxFull);
                        self.arm_secondary(current);
                    }
                }
            }
            (false, false) => {}
        }

        stats.end(Section::RxIrq, started);
    }

    /// Whether a capture into `target` may be published now
    ///
    /// Only the slot at `head` can be; the dummy buffer never is, so it is
    /// always in turn.
    const fn in_turn(&self, target: Target) -> bool {
        match target {
            Target::Slot(index) => index == self.head,
            Target::Dummy | Target::Idle => true,
        }
    }

    /// Publish a completed capture into the slot at `head`
    fn commit(&mut self, target: Target, captured: usize) {
        if let Target::Slot(index) = target {
            let slot = self.ring.slots[index].get();
            // SAFETY: the slot was armed on the channel that just completed;
            // the consumer cannot read it before the permit below is released.
            unsafe { (*slot).len = captured.min(SLOT_SIZE) };
            self.head = (index + 1) % N;
            self.ring.permits.release();
            self.ring.stats.count(Counter::RxOk);
        }
    }

    /// Pick the slot to arm next, or the dummy buffer when the ring is full
    fn next_target(&self, armed_elsewhere: usize) -> Target {
        let permits = self.ring.permits.available() as usize;
        if permits + armed_elsewhere >= N - RESERVED_SLOTS {
            self.ring.stats.count(Counter::RxFull);
            Target::Dummy
        } else {
            Target::Slot((self.head + armed_elsewhere) % N)
        }
    }

    fn arm_primary(&mut self, target: Target) {
        let dst = self.ring.target_ptr(target);
        self.primary.target = target;
        // SAFETY: `dst` is either a free slot (see `next_target`) or the
        // dummy buffer, which is never read; both live as long as the ring.
        unsafe { self.primary.channel.arm(dst, SLOT_SIZE) };
        self.primary.channel.restart();
    }

    fn arm_secondary(&mut self, target: Target) {
        let dst = self.ring.target_ptr(target);
        if let Some(lane) = self.secondary.as_mut() {
            lane.target = target;
            // SAFETY: as in `arm_primary`.
            unsafe { lane.channel.arm(dst, SLOT_SIZE) };
            lane.channel.restart();
        }
    }
}

// =============================================================================
// Consumer (poll context)
// =============================================================================

/// Poll-side handle: verifies and delivers captured frames
pub struct RxConsumer<'a, S: Instrumentation, const N: usize> {
    ring: &'a RxRing<S, N>,
    rear: usize,
    mode: CaptureMode,
}

impl<'a, S: Instrumentation, const N: usize> RxConsumer<'a, S, N> {
    /// Wait up to `timeout_us` for a frame and deliver it to `host`
    pub fn receive<H: NetStack, K: Clock>(&mut self, host: &mut H, clock: &K, timeout_us: u32) -> RxOutcome {
        if !self.ring.permits.acquire_timeout(clock, timeout_us) {
            return RxOutcome::Idle;
        }
        self.process(host)
    }

    /// Deliver a frame to `host` if one is ready
    pub fn try_receive<H: NetStack>(&mut self, host: &mut H) -> RxOutcome {
        if !self.ring.permits.try_acquire() {
            return RxOutcome::Idle;
        }
        self.process(host)
    }

    /// Copy a ready frame (FCS excluded) into `buf`
    ///
    /// A `buf` too small for the frame drops it as [`RxOutcome::NoBuffer`].
    pub fn try_receive_into(&mut self, buf: &mut [u8]) -> RxOutcome {
        let mut host = SliceHost { buf: Some(buf) };
        self.try_receive(&mut host)
    }

    /// Capture mode of the producer this consumer was split with
    pub const fn capture_mode(&self) -> CaptureMode {
        self.mode
    }

    /// Completed captures waiting to be consumed
    pub fn pending(&self) -> usize {
        self.ring.permits.available() as usize
    }

    /// Instrumentation shared with the producer
    pub fn stats(&self) -> &'a S {
        &self.ring.stats
    }

    fn process<H: NetStack>(&mut self, host: &mut H) -> RxOutcome {
        let ring = self.ring;
        let stats = &ring.stats;

        // SAFETY: the permit for `rear` is held, so the producer finished
        // this slot and will not re-arm it until `rear` moves past it.
        let slot = unsafe { &*ring.slots[self.rear].get() };
        let frame = &slot.data[..slot.len];

        if !stats.time(Section::Crc, || crc::verify(frame)) {
            self.advance();
            stats.count(Counter::BadCrc);
            return RxOutcome::BadCrc;
        }

        let started = stats.begin();
        let len = frame.len() - FCS_SIZE;
        let buffer = host.alloc_rx(len).and_then(|mut buffer| {
            let dst = buffer.as_mut().get_mut(..len).ok_or(IoError::NoBuffer)?;
            dst.copy_from_slice(&frame[..len]);
            Ok(buffer)
        });

        // The slot is free for capture from here on
        self.advance();

        let Ok(buffer) = buffer else {
            stats.count(Counter::AllocFail);
            return RxOutcome::NoBuffer;
        };

        let delivered = host.input(buffer, len);
        stats.end(Section::Deliver, started);
        match delivered {
            Ok(()) => RxOutcome::Delivered(len),
            Err(_) => {
                stats.count(Counter::DeliverFail);
                RxOutcome::DeliveryFailed
            }
        }
    }

    fn advance(&mut self) {
        self.rear = (self.rear + 1) % N;
    }
}

/// Host adapter that copies into a caller-supplied slice
struct SliceHost<'b> {
    buf: Option<&'b mut [u8]>,
}

impl<'b> NetStack for SliceHost<'b> {
    type Buffer = &'b mut [u8];

    fn alloc_rx(&mut self, len: usize) -> IoResult<Self::Buffer> {
        self.buf.take().filter(|buf| buf.len() >= len).ok_or(IoError::NoBuffer)
    }

    fn input(&mut self, _frame: Self::Buffer, _len: usize) -> IoResult<()> {
        Ok(())
    }
}
