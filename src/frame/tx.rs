//! Transmit pipeline
//!
//! One scratch buffer, no queue. Each call waits for the previous DMA
//! transfer to finish, gathers the frame into the scratch buffer, pads it to
//! the Ethernet minimum, appends the FCS and starts DMA. It returns once DMA
//! is armed, not once the frame is on the wire.

use crate::driver::stats::{Counter, Instrumentation, Section};
use crate::frame::crc;
use crate::hal::sequencer::TransmitChannel;
use crate::internal::constants::{MAX_PAYLOAD_SIZE, MIN_FRAME_SIZE, TX_BUFFER_SIZE};

/// Transmit scratch buffer
///
/// DMA reads from it after [`Transmitter::transmit`] returns, so it must live
/// at a fixed address (typically a `static`).
#[repr(C, align(4))]
pub struct TxBuffer {
    data: [u8; TX_BUFFER_SIZE],
}

impl Default for TxBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TxBuffer {
    /// Zeroed buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: [0; TX_BUFFER_SIZE],
        }
    }
}

/// Frame transmitter over one sequencer/DMA pair
pub struct Transmitter<'a, T: TransmitChannel, S: Instrumentation> {
    channel: T,
    scratch: &'a mut TxBuffer,
    stats: &'a S,
}

impl<'a, T: TransmitChannel, S: Instrumentation> Transmitter<'a, T, S> {
    /// Create a transmitter using `scratch` as the DMA source
    pub fn new(channel: T, scratch: &'a mut TxBuffer, stats: &'a S) -> Self {
        Self {
            channel,
            scratch,
            stats,
        }
    }

    /// Busy-wait until the previous frame has been read by DMA
    pub fn wait_idle(&self) {
        while self.channel.is_busy() {
            core::hint::spin_loop();
        }
    }

    /// Whether a frame can be prepared without waiting
    pub fn is_ready(&self) -> bool {
        !self.channel.is_busy()
    }

    /// Transmit a frame made of `fragments`
    ///
    /// Copies at most `total_len` bytes (clamped to the largest frame before
    /// FCS), ignoring fragment data beyond it. Returns the number of bytes
    /// handed to DMA, FCS included.
    pub fn transmit_chain<'f, I>(&mut self, total_len: usize, fragments: I) -> usize
    where
        I: IntoIterator<Item = &'f [u8]>,
    {
        self.wait_idle();

        let started = self.stats.begin();
        let limit = total_len.min(MAX_PAYLOAD_SIZE);
        let data = &mut self.scratch.data;

        let mut len = 0;
        for fragment in fragments {
            if len >= limit {
                break;
            }
            let take = fragment.len().min(limit - len);
            data[len..len + take].copy_from_slice(&fragment[..take]);
            len += take;
        }

        self.finish(len, started)
    }

    /// Transmit a contiguous frame
    pub fn transmit(&mut self, frame: &[u8]) -> usize {
        self.transmit_chain(frame.len(), core::iter::once(frame))
    }

    /// Fill the scratch buffer in place and transmit it
    ///
    /// `f` writes `len` bytes of frame (clamped as in
    /// [`transmit_chain`](Self::transmit_chain)).
    pub fn transmit_with<R, F>(&mut self, len: usize, f: F) -> (usize, R)
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        self.wait_idle();
        let len = len.min(MAX_PAYLOAD_SIZE);
        let started = self.stats.begin();
        let result = f(&mut self.scratch.data[..len]);
        (self.finish(len, started), result)
    }

    /// Pad, append the FCS and start DMA for the `len` bytes already in
    /// the scratch buffer
    fn finish(&mut self, mut len: usize, started: u32) -> usize {
        let data = &mut self.scratch.data;
        if len < MIN_FRAME_SIZE {
            data[len..MIN_FRAME_SIZE].fill(0);
            len = MIN_FRAME_SIZE;
        }
        let wire_len = crc::append(data, len).unwrap_or(len);

        // SAFETY: the scratch buffer is borrowed for 'a and is not written
        // again before the next call, which waits for the channel to go idle.
        unsafe { self.channel.start(data.as_ptr(), wire_len) };

        self.stats.end(Section::Tx, started);
        self.stats.count(Counter::TxOk);
        wire_len
    }

    /// The transmit channel
    pub fn channel(&self) -> &T {
        &self.channel
    }
}
