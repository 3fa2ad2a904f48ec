//! MDIO (Management Data Input/Output) HAL
//!
//! There is no MAC, so there is no SMI block either: the clause-22
//! management frame is bit-banged on two GPIOs.
//!
//! # Frame Format
//!
//! ```text
//! read:  PRE(32x1) ST(01) OP(10) PHYAD(5) REGAD(5) TA(Z0) DATA(16, from PHY)
//! write: PRE(32x1) ST(01) OP(01) PHYAD(5) REGAD(5) TA(10) DATA(16)
//! ```
//!
//! Every bit is one MDC period: clock low, wait, data, clock high, wait.
//! The data line is released to the PHY only for the read turnaround and
//! data phase. There are no retries; a PHY that does not answer leaves the
//! line pulled up and reads as `0xFFFF`.

use embedded_hal::delay::DelayNs;

use crate::driver::error::{ConfigError, Result};
use crate::internal::constants::MDIO_HALF_PERIOD_US;

// =============================================================================
// MDIO Constants
// =============================================================================

/// Maximum valid PHY address (5-bit field)
pub const MAX_PHY_ADDR: u8 = 31;

/// Maximum valid register address (5-bit field)
pub const MAX_REG_ADDR: u8 = 31;

/// Preamble length in bits
const PREAMBLE_BITS: u32 = 32;

const START: u16 = 0b01;
const OP_READ: u16 = 0b10;
const OP_WRITE: u16 = 0b01;
const TA_WRITE: u16 = 0b10;

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for MDIO bus operations
///
/// This trait can be implemented by different backends, allowing
/// the PHY helpers and link monitor to work with various MDIO implementations.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;
}

impl<M: MdioBus + ?Sized> MdioBus for &mut M {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        (**self).read(phy_addr, reg_addr)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        (**self).write(phy_addr, reg_addr, value)
    }
}

// =============================================================================
// MDIO Pins
// =============================================================================

/// The two GPIOs of the management bus
///
/// Implementations drive plain SIO pins; MDIO needs an external or internal
/// pull-up so a released line reads high.
pub trait MdioPins {
    /// Drive MDC
    fn set_mdc(&mut self, high: bool);

    /// Drive MDIO (only effective while it is an output)
    fn set_mdio(&mut self, high: bool);

    /// Switch MDIO to output
    fn mdio_output(&mut self);

    /// Release MDIO to the PHY
    fn mdio_input(&mut self);

    /// Sample MDIO
    fn read_mdio(&mut self) -> bool;
}

// =============================================================================
// MDIO Controller
// =============================================================================

/// Bit-banged clause-22 MDIO controller
///
/// The half-period delay is a literal busy-wait; MDC stays well under the
/// 2.5 MHz limit at the default of 1 µs per phase.
#[derive(Debug)]
pub struct MdioController<P: MdioPins, D: DelayNs> {
    pins: P,
    delay: D,
    half_period_us: u32,
}

impl<P: MdioPins, D: DelayNs> MdioController<P, D> {
    /// Create a controller and park the bus (MDC low, MDIO released)
    pub fn new(mut pins: P, delay: D) -> Self {
        pins.set_mdc(false);
        pins.mdio_input();
        Self {
            pins,
            delay,
            half_period_us: MDIO_HALF_PERIOD_US,
        }
    }

    /// Set the delay applied on each clock phase
    pub fn set_half_period_us(&mut self, half_period_us: u32) {
        self.half_period_us = half_period_us;
    }

    /// Access the pins
    pub fn pins(&self) -> &P {
        &self.pins
    }

    /// Mutable access to the pins
    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    /// Tear down, returning the pins and delay
    pub fn release(self) -> (P, D) {
        (self.pins, self.delay)
    }

    fn clock_out(&mut self, bit: bool) {
        self.pins.set_mdc(false);
        self.delay.delay_us(self.half_period_us);
        self.pins.set_mdio(bit);
        self.pins.set_mdc(true);
        self.delay.delay_us(self.half_period_us);
    }

    fn clock_in(&mut self) -> bool {
        self.pins.set_mdc(false);
        self.delay.delay_us(self.half_period_us);
        self.pins.set_mdc(true);
        let bit = self.pins.read_mdio();
        self.delay.delay_us(self.half_period_us);
        bit
    }

    /// Clock one period without driving the data line
    fn clock_idle(&mut self) {
        self.pins.set_mdc(false);
        self.delay.delay_us(self.half_period_us);
        self.pins.set_mdc(true);
        self.delay.delay_us(self.half_period_us);
    }

    /// Shift out the low `count` bits of `value`, MSB first
    fn shift_out(&mut self, value: u16, count: u32) {
        for i in (0..count).rev() {
            self.clock_out((value >> i) & 1 != 0);
        }
    }

    fn header(&mut self, op: u16, phy_addr: u8, reg_addr: u8) {
        self.pins.mdio_output();
        for _ in 0..PREAMBLE_BITS {
            self.clock_out(true);
        }
        self.shift_out(START, 2);
        self.shift_out(op, 2);
        self.shift_out(u16::from(phy_addr), 5);
        self.shift_out(u16::from(reg_addr), 5);
    }

    fn check_addresses(phy_addr: u8, reg_addr: u8) -> Result<()> {
        if phy_addr > MAX_PHY_ADDR {
            return Err(ConfigError::InvalidPhyAddress.into());
        }
        if reg_addr > MAX_REG_ADDR {
            return Err(ConfigError::InvalidRegister.into());
        }
        Ok(())
    }
}

impl<P: MdioPins, D: DelayNs> MdioBus for MdioController<P, D> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        Self::check_addresses(phy_addr, reg_addr)?;

        self.header(OP_READ, phy_addr, reg_addr);

        // Turnaround: release the line, the PHY drives the second bit low
        self.pins.mdio_input();
        self.clock_idle();
        self.clock_idle();

        let mut value = 0u16;
        for _ in 0..16 {
            value = (value << 1) | u16::from(self.clock_in());
        }
        Ok(value)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        Self::check_addresses(phy_addr, reg_addr)?;

        self.header(OP_WRITE, phy_addr, reg_addr);
        self.shift_out(TA_WRITE, 2);
        self.shift_out(value, 16);
        self.pins.mdio_input();
        Ok(())
    }
}

// =============================================================================
// PHY Register Definitions (IEEE 802.3 standard registers)
// =============================================================================

/// Standard PHY register addresses (IEEE 802.3 Clause 22)
pub mod phy_reg {
    /// Basic Mode Control Register
    pub const BMCR: u8 = 0;
    /// Basic Mode Status Register
    pub const BMSR: u8 = 1;
    /// PHY Identifier 1
    pub const PHYIDR1: u8 = 2;
    /// PHY Identifier 2
    pub const PHYIDR2: u8 = 3;
    /// Auto-Negotiation Advertisement Register
    pub const ANAR: u8 = 4;
    /// Auto-Negotiation Link Partner Ability Register
    pub const ANLPAR: u8 = 5;
}

/// BMCR (Basic Mode Control Register) bits
pub mod bmcr {
    /// Soft reset
    pub const RESET: u16 = 1 << 15;
    /// Speed select (100 Mbps if set)
    pub const SPEED_100: u16 = 1 << 13;
    /// Auto-negotiation enable
    pub const AN_ENABLE: u16 = 1 << 12;
    /// Restart auto-negotiation
    pub const AN_RESTART: u16 = 1 << 9;
    /// Duplex mode (full duplex if set)
    pub const DUPLEX_FULL: u16 = 1 << 8;
}

/// BMSR (Basic Mode Status Register) bits
pub mod bmsr {
    /// 100BASE-TX full duplex capable
    pub const TX_FD_CAPABLE: u16 = 1 << 14;
    /// 100BASE-TX half duplex capable
    pub const TX_HD_CAPABLE: u16 = 1 << 13;
    /// Auto-negotiation complete
    pub const AN_COMPLETE: u16 = 1 << 5;
    /// Auto-negotiation ability
    pub const AN_ABILITY: u16 = 1 << 3;
    /// Link status
    pub const LINK_STATUS: u16 = 1 << 2;
}

/// ANAR (Auto-Negotiation Advertisement Register) bits
pub mod anar {
    /// 100BASE-TX full duplex
    pub const TX_FD: u16 = 1 << 8;
    /// 100BASE-TX half duplex
    pub const TX_HD: u16 = 1 << 7;
    /// 10BASE-T full duplex
    pub const T10_FD: u16 = 1 << 6;
    /// 10BASE-T half duplex
    pub const T10_HD: u16 = 1 << 5;
    /// IEEE 802.3 selector value
    pub const SELECTOR_IEEE802_3: u16 = 0x0001;
}

// =============================================================================
// Unit Tests
// =============================================================================
