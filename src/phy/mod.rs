//! Ethernet PHY support
//!
//! The PHY is reached only through the [`MdioBus`](crate::hal::MdioBus)
//! trait, so everything here runs against the bit-banged controller or a
//! mock.
//!
//! # Example
//!
//! ```ignore
//! use ph_rmii_pio::phy::{Lan8720a, generic};
//!
//! let addr = generic::discover_address(&mut mdio).unwrap_or(generic::DEFAULT_PHY_ADDR);
//! Lan8720a::new(addr).init(&mut mdio, false)?;
//! ```

pub mod generic;
pub mod lan8720a;

pub use generic::{DEFAULT_PHY_ADDR, discover_address};
pub use lan8720a::Lan8720a;

// Re-export IEEE 802.3 standard register definitions from mdio
pub use crate::hal::mdio::{anar, bmcr, bmsr, phy_reg};
