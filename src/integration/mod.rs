//! External Stack Integrations
//!
//! - **smoltcp** (`smoltcp`): Integration with the smoltcp TCP/IP network stack
//!   - Implements `smoltcp::phy::Device` for [`RmiiEthernet`](crate::driver::RmiiEthernet)
//!   - RX/TX token support
//!   - Requires `smoltcp` feature
//!
//! Stacks with a callback-style input path (lwIP-like) use the
//! [`NetStack`](crate::driver::NetStack) trait and
//! [`RmiiEthernet::poll`](crate::driver::RmiiEthernet::poll) instead.
//!
//! # Example
//!
//! ```ignore
//! use smoltcp::phy::Device;
//! let caps = eth.capabilities();
//! ```

#[cfg(feature = "smoltcp")]
pub mod smoltcp;

#[cfg(feature = "smoltcp")]
pub use smoltcp::{RmiiRxToken, RmiiTxToken, ethernet_address};
