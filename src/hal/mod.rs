//! Hardware Abstraction Layer
//!
//! Traits at the boundary between the frame pipelines and the RP2040
//! peripherals, plus the MDIO bit-bang controller built on plain GPIO.
//!
//! # Modules
//!
//! - [`clock`]: Free-running microsecond counter
//! - [`mdio`]: MDIO bus for PHY communication
//! - [`sequencer`]: PIO state machine + DMA channel pairs
//!
//! # Delay Integration
//!
//! MDIO timing uses `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL (e.g., `rp2040_hal::Timer`).

pub mod clock;
pub mod mdio;
pub mod sequencer;

// Re-export commonly used types
pub use clock::Clock;
pub use mdio::{MdioBus, MdioController, MdioPins};
pub use sequencer::{CaptureChannel, TransmitChannel};
