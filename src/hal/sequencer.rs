//! Sequencer and DMA channel abstraction
//!
//! Each RMII direction is a PIO state machine paired with a DMA channel:
//!
//! - **Capture** (receive): the state machine shifts RX0/RX1 into its RX FIFO
//!   one byte at a time while CRS_DV is high; a byte-wide DMA channel paced
//!   by the FIFO's DREQ writes them to memory with write-increment. When
//!   carrier drops the program raises an interrupt and jumps back to its
//!   wrap target, where it stalls until the CPU acknowledges.
//! - **Transmit**: a DMA channel with read-increment feeds bytes into the TX
//!   FIFO; the state machine emits preamble, SFD, data and the inter-packet
//!   gap on its own.
//!
//! The traits below are the whole contract between the frame pipelines and
//! the hardware. Captured length is reported by the channel; how it is
//! obtained (typically write address minus slot base) stays inside the
//! implementation.

/// One capture state machine plus its DMA channel
///
/// All methods are called from the capture interrupt only, except
/// [`arm`](CaptureChannel::arm) and [`restart`](CaptureChannel::restart),
/// which are also called once before the interrupt is enabled.
pub trait CaptureChannel {
    /// Whether the state machine has signalled end of frame and is waiting
    /// at its wrap point
    fn wrap_pending(&self) -> bool;

    /// Bytes written by DMA since the last [`arm`](CaptureChannel::arm)
    fn captured_len(&self) -> usize;

    /// Point the DMA channel at a new destination
    ///
    /// Bytes beyond `capacity` must not be written.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for `capacity` byte writes until the channel is
    /// re-armed, and nothing else may access that memory in the meantime.
    unsafe fn arm(&mut self, dst: *mut u8, capacity: usize);

    /// Acknowledge the wrap so the state machine hunts for the next preamble
    fn restart(&mut self);

    /// Clear a pending wrap without servicing it
    ///
    /// The channel keeps its current destination and captures into it from
    /// the start; the frame that raised the wrap is lost.
    fn force_clear_wrap(&mut self);
}

/// The transmit state machine plus its DMA channel
pub trait TransmitChannel {
    /// Whether the previous transfer is still being read by DMA
    fn is_busy(&self) -> bool;

    /// Start a byte-granular transfer into the transmit FIFO
    ///
    /// Returns as soon as the channel is armed.
    ///
    /// # Safety
    ///
    /// `src` must stay valid and unmodified for `len` bytes until
    /// [`is_busy`](TransmitChannel::is_busy) returns `false`.
    unsafe fn start(&mut self, src: *const u8, len: usize);
}
