//! PIO RMII Ethernet Driver
//!
//! A `no_std`, `no_alloc` Ethernet driver for microcontrollers without an
//! Ethernet MAC, built for the RP2040.
//!
//! RMII signalling is produced and captured by programmable I/O state
//! machines; DMA moves octets between their FIFOs and memory. This crate
//! does everything a MAC would otherwise do in hardware: it frames the raw
//! capture, checks and generates the frame check sequence, talks to the PHY
//! over a bit-banged MDIO bus, and exchanges frames with a host TCP/IP
//! stack.
//!
//! # Architecture
//!
//! ```text
//!  interrupt context              poll context
//!  ─────────────────              ────────────
//!  RxProducer ──permits──▶ RxConsumer ──▶ host stack
//!      ▲                    RmiiEthernet ─▶ LinkMonitor ─▶ MDIO ─▶ PHY
//!  capture SM + DMA         Transmitter ──▶ transmit SM + DMA
//! ```
//!
//! 1. **Driver** ([`driver`]): configuration, errors, the poll-side
//!    [`RmiiEthernet`] facade, link monitoring and statistics
//! 2. **Frames** ([`frame`]): CRC-32, the transmit pipeline and the receive
//!    ring
//! 3. **HAL** ([`hal`]): traits for the sequencer/DMA pairs and the clock,
//!    plus the MDIO controller
//! 4. **PHY** ([`phy`]): address discovery and LAN8720A bring-up
//!
//! The sequencer programs themselves and the DMA channel setup belong to the
//! board crate, which implements [`hal::CaptureChannel`] and
//! [`hal::TransmitChannel`] on top of its HAL.
//!
//! # Features
//!
//! - `defmt`: Log through defmt and derive `defmt::Format`
//! - `log`: Log through the `log` facade
//! - `smoltcp`: Enable smoltcp network stack integration
//! - `critical-section`: Enable [`sync::IsrCell`] for handing the receive
//!   producer to an interrupt handler
//!
//! # Example
//!
//! ```ignore
//! use ph_rmii_pio::{Capture, NoStats, RmiiConfig, RmiiEthernet, RxRing, Transmitter, TxBuffer};
//! use ph_rmii_pio::sync::IsrCell;
//!
//! static mut RING: RxRing<NoStats, 4> = RxRing::new(NoStats);
//! static mut TX_BUF: TxBuffer = TxBuffer::new();
//! static PRODUCER: IsrCell<Producer> = IsrCell::new();
//!
//! let ring = unsafe { &mut *core::ptr::addr_of_mut!(RING) };
//! let (mut producer, consumer) = ring.split(Capture::Single(capture));
//! producer.start();
//! PRODUCER.install(producer);
//!
//! let tx = Transmitter::new(tx_channel, unsafe { &mut *core::ptr::addr_of_mut!(TX_BUF) }, consumer.stats());
//! let mut eth = RmiiEthernet::new(RmiiConfig::new(), &unique_id, mdio, consumer, tx, timer)?;
//! eth.init()?;
//! eth.run(&mut stack);
//!
//! #[interrupt]
//! fn PIO0_IRQ_0() {
//!     PRODUCER.with(|producer| producer.on_interrupt());
//! }
//! ```
//!
//! # Memory Requirements
//!
//! Each receive slot is 1524 bytes; the default 4-slot ring plus the
//! dummy capture buffer and the 1518-byte transmit buffer come to about
//! 9 KB of SRAM.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// Internal implementation details (pub(crate) only); first so the logging
// macros are visible everywhere below
#[macro_use]
mod internal;

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod frame;
pub mod hal;
pub mod phy;
pub mod sync;

#[cfg(feature = "smoltcp")]
#[cfg_attr(docsrs, doc(cfg(feature = "smoltcp")))]
pub mod integration;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{CaptureMode, Pio, RmiiConfig};
pub use driver::error::{ConfigError, ConfigResult, Error, IoError, IoResult, Result};
pub use driver::ethernet::RmiiEthernet;
pub use driver::link::LinkEvent;
pub use driver::netif::{NetStack, Netif, NetifFlags};
pub use driver::stats::{Counters, Instrumentation, NoStats};
pub use frame::rx::{Capture, RxConsumer, RxOutcome, RxProducer, RxRing};
pub use frame::tx::{Transmitter, TxBuffer};

// Re-export PHY types
pub use phy::Lan8720a;

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    pub use crate::internal::constants::{
        // Ring sizing
        DEFAULT_RX_SLOTS,
        // Frame sizes
        ETH_HEADER_SIZE,
        FCS_SIZE,
        MAC_ADDR_LEN,
        MAX_FRAME_SIZE,
        MAX_PAYLOAD_SIZE,
        MIN_FRAME_SIZE,
        MTU,
        RESERVED_SLOTS,
        SLOT_SIZE,
        TX_BUFFER_SIZE,
    };
}
