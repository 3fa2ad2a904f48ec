//! Clause-22 PHY helpers
//!
//! Address discovery and the handful of standard-register accesses the
//! driver needs. Everything here works on any IEEE 802.3 clause-22 PHY.

use crate::driver::error::Result;
use crate::hal::mdio::{MAX_PHY_ADDR, MdioBus, bmsr, phy_reg};

/// Value read back when no PHY drives the data line
pub const NO_PHY: u16 = 0xFFFF;

/// Address used when discovery finds nothing
pub const DEFAULT_PHY_ADDR: u8 = 0;

/// Scan addresses 0..=31 and return the first whose BMCR is not all ones
///
/// A failed read at one address does not stop the scan.
pub fn discover_address<M: MdioBus>(mdio: &mut M) -> Option<u8> {
    (0..=MAX_PHY_ADDR).find(|&addr| {
        mdio.read(addr, phy_reg::BMCR)
            .is_ok_and(|value| value != NO_PHY)
    })
}

/// Read BMSR and check the link status bit
pub fn is_link_up<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<bool> {
    let status = mdio.read(phy_addr, phy_reg::BMSR)?;
    Ok(status & bmsr::LINK_STATUS != 0)
}

/// Read BMSR and check the auto-negotiation complete bit
pub fn is_an_complete<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<bool> {
    let status = mdio.read(phy_addr, phy_reg::BMSR)?;
    Ok(status & bmsr::AN_COMPLETE != 0)
}

/// Read the PHY identifier: `(PHYIDR1 << 16) | PHYIDR2`
pub fn read_phy_id<M: MdioBus>(mdio: &mut M, phy_addr: u8) -> Result<u32> {
    let id1 = u32::from(mdio.read(phy_addr, phy_reg::PHYIDR1)?);
    let id2 = u32::from(mdio.read(phy_addr, phy_reg::PHYIDR2)?);
    Ok((id1 << 16) | id2)
}
