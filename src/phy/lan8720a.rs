//! LAN8720A PHY bring-up
//!
//! The Microchip/SMSC LAN8720A is the PHY on the common RMII breakout
//! boards. Bring-up is two register writes: the auto-negotiation
//! advertisement, then BMCR with auto-negotiation enabled.
//!
//! The capture and transmit programs are clocked for 100 Mbps, so 10BASE-T
//! abilities are only advertised when asked for.
//!
//! # PHY Address
//!
//! The address comes from the PHYAD0 strap (0 or 1). Boards differ, which is
//! why the driver discovers it instead of assuming one.

use crate::driver::error::Result;
use crate::hal::mdio::{MdioBus, anar, bmcr, phy_reg};

/// LAN8720A PHY identifier, revision nibble cleared
pub const LAN8720A_PHY_ID: u32 = 0x0007_C0F0;
/// PHY ID mask (ignores revision bits)
pub const LAN8720A_PHY_ID_MASK: u32 = 0xFFFF_FFF0;

/// LAN8720A at a known MDIO address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lan8720a {
    addr: u8,
}

impl Lan8720a {
    /// Create a driver for the PHY at `addr`
    #[must_use]
    pub const fn new(addr: u8) -> Self {
        Self { addr }
    }

    /// MDIO address
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.addr
    }

    /// ANAR value for the given ability set
    #[must_use]
    pub const fn advertisement(advertise_10mbps: bool) -> u16 {
        let base = anar::SELECTOR_IEEE802_3 | anar::TX_HD | anar::TX_FD;
        if advertise_10mbps {
            base | anar::T10_HD | anar::T10_FD
        } else {
            base
        }
    }

    /// Advertise abilities and enable auto-negotiation
    pub fn init<M: MdioBus>(&self, mdio: &mut M, advertise_10mbps: bool) -> Result<()> {
        mdio.write(self.addr, phy_reg::ANAR, Self::advertisement(advertise_10mbps))?;
        mdio.write(self.addr, phy_reg::BMCR, bmcr::AN_ENABLE)
    }

    /// Check whether the PHY identifies as a LAN8720A
    pub fn verify_id<M: MdioBus>(&self, mdio: &mut M) -> Result<bool> {
        let id = super::generic::read_phy_id(mdio, self.addr)?;
        Ok(id & LAN8720A_PHY_ID_MASK == LAN8720A_PHY_ID)
    }
}
