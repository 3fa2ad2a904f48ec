//! Frame Pipelines
//!
//! Everything between a raw octet stream and a verified Ethernet frame:
//!
//! - [`crc`] - IEEE 802.3 frame check sequence
//! - [`tx`] - Single-buffer transmit path: gather, pad, FCS, DMA
//! - [`rx`] - Receive ring split into an interrupt-side producer and a
//!   poll-side consumer

pub mod crc;
pub mod rx;
pub mod tx;

pub use rx::{Capture, RxConsumer, RxOutcome, RxProducer, RxRing};
pub use tx::{Transmitter, TxBuffer};
