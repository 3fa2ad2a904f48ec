//! Core driver components for the PIO/RMII Ethernet interface.
//!
//! - [`config`] - Pin, state machine and timing configuration
//! - [`error`] - Error types and result aliases
//! - [`ethernet`] - The poll-side driver tying everything together
//! - [`link`] - PHY link state monitor
//! - [`netif`] - Contract with the host TCP/IP stack
//! - [`stats`] - Counters and timing windows
//!
//! # Example
//!
//! ```ignore
//! use ph_rmii_pio::driver::{CaptureMode, RmiiConfig};
//!
//! let config = RmiiConfig::new()
//!     .with_rx_pin_start(6)
//!     .with_capture_mode(CaptureMode::Dual);
//! config.validate()?;
//! ```

// Submodules
pub mod config;
pub mod error;
pub mod ethernet;
pub mod link;
pub mod netif;
pub mod stats;

// Re-exports for convenience
pub use config::{CaptureMode, Pio, RmiiConfig};
pub use error::{ConfigError, ConfigResult, Error, IoError, IoResult, Result};
pub use ethernet::RmiiEthernet;
pub use link::{LinkEvent, LinkMonitor};
pub use netif::{NetStack, Netif, NetifFlags};
pub use stats::{Counter, Counters, Instrumentation, NoStats, Report, Section, WindowReport};
