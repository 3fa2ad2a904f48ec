//! Link state monitor
//!
//! Polls BMSR on a fixed interval from the poll loop and reports edges of the
//! link-status bit. The cached state starts as down, so the first poll that
//! sees the link up reports exactly one [`LinkEvent::Up`].
//!
//! An all-ones BMSR means nobody answered on the bus; that is reported as
//! [`IoError::PhyError`] and leaves the cached state alone.

use crate::driver::error::{IoError, Result};
use crate::hal::clock::elapsed_us;
use crate::hal::mdio::{MdioBus, bmsr, phy_reg};
use crate::phy::generic::NO_PHY;

/// Link transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Link came up
    Up,
    /// Link went down
    Down,
}

/// Edge-detecting link monitor
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    up: bool,
    last_poll_us: Option<u32>,
    interval_us: u32,
}

impl LinkMonitor {
    /// Create a monitor that polls every `interval_us`
    #[must_use]
    pub const fn new(interval_us: u32) -> Self {
        Self {
            up: false,
            last_poll_us: None,
            interval_us,
        }
    }

    /// Cached link state
    #[must_use]
    pub const fn is_up(&self) -> bool {
        self.up
    }

    /// Whether a poll is due at `now_us`. The first call is always due.
    #[must_use]
    pub fn due(&self, now_us: u32) -> bool {
        match self.last_poll_us {
            None => true,
            Some(last) => elapsed_us(last, now_us) >= self.interval_us,
        }
    }

    /// Compare a sampled status bit against the cached state
    pub fn update(&mut self, link_up: bool) -> Option<LinkEvent> {
        if link_up == self.up {
            return None;
        }
        self.up = link_up;
        Some(if link_up { LinkEvent::Up } else { LinkEvent::Down })
    }

    /// Read BMSR if a poll is due and report any edge
    pub fn poll<M: MdioBus>(&mut self, mdio: &mut M, phy_addr: u8, now_us: u32) -> Result<Option<LinkEvent>> {
        if !self.due(now_us) {
            return Ok(None);
        }
        self.last_poll_us = Some(now_us);
        let status = mdio.read(phy_addr, phy_reg::BMSR)?;
        if status == NO_PHY {
            return Err(IoError::PhyError.into());
        }
        Ok(self.update(status & bmsr::LINK_STATUS != 0))
    }
}
