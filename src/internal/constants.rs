//! Centralized Constants
//!
//! This module provides a single source of truth for the magic numbers used
//! throughout the driver.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Frame/Buffer sizes**: Ethernet frame dimensions and slot capacity
//! - **Ring**: receive ring sizing and the producer's reservation
//! - **Timing**: MDIO bit timing, receive wait, link poll cadence
//! - **Pins**: GPIO bank limits and clock-output-capable pins
//! - **MAC address**: derived address prefix

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Standard Ethernet MTU (Maximum Transmission Unit)
pub const MTU: usize = 1500;

/// Ethernet header size (dst MAC + src MAC + EtherType)
pub const ETH_HEADER_SIZE: usize = 14;

/// Frame check sequence size at end of frame
pub const FCS_SIZE: usize = 4;

/// Minimum Ethernet frame size before the FCS (64 on the wire)
pub const MIN_FRAME_SIZE: usize = 60;

/// Largest frame handed to or accepted from the host stack (header + MTU)
pub const MAX_PAYLOAD_SIZE: usize = ETH_HEADER_SIZE + MTU;

/// Maximum Ethernet frame size on the wire, FCS included (no VLAN tag)
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + FCS_SIZE;

/// Capacity of one receive slot
///
/// A few bytes of slack above [`MAX_FRAME_SIZE`] absorb trailing bits the
/// capture program shifts in after CRS_DV drops.
pub const SLOT_SIZE: usize = 1524;

/// Size of the transmit scratch buffer
pub const TX_BUFFER_SIZE: usize = MAX_FRAME_SIZE;

// =============================================================================
// Receive Ring
// =============================================================================

/// Default number of receive slots
pub const DEFAULT_RX_SLOTS: usize = 4;

/// Slots the producer keeps out of reach when deciding whether the ring is full
///
/// Covers the slot the consumer may still be reading plus one frame of
/// interrupt latency on back-to-back traffic.
pub const RESERVED_SLOTS: usize = 2;

// =============================================================================
// Timing Constants
// =============================================================================

/// MDC half-period in microseconds (setup and hold on each clock phase)
pub const MDIO_HALF_PERIOD_US: u32 = 1;

/// Default bounded wait for a received frame, in microseconds (100 ms)
pub const DEFAULT_RX_WAIT_TIMEOUT_US: u32 = 100_000;

/// Default link poll and statistics report interval, in microseconds (1 s)
pub const DEFAULT_LINK_POLL_INTERVAL_US: u32 = 1_000_000;

// =============================================================================
// Pins and Sequencers
// =============================================================================

/// Number of user GPIOs in the bank
pub const GPIO_COUNT: u8 = 30;

/// GPIOs able to drive the 50 MHz reference clock output
pub const REF_CLOCK_PINS: [u8; 4] = [21, 23, 24, 25];

/// State machines per PIO block
pub const SM_PER_PIO: u8 = 4;

// =============================================================================
// MAC Address
// =============================================================================

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

/// OUI prefix used when deriving an address from the board unique id
pub const DERIVED_MAC_PREFIX: [u8; 3] = [0xB8, 0x27, 0xEB];

/// Offset of the three unique-id bytes copied into a derived address
pub const DERIVED_MAC_ID_OFFSET: usize = 5;
