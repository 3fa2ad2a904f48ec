//! Configuration types for the RMII driver
//!
//! The configuration surface selects which PIO block and state machines run
//! the RMII programs, where the receive/transmit/MDIO pin groups start, which
//! pin drives the 50 MHz reference clock, and how the poll loop paces itself.

use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    DEFAULT_LINK_POLL_INTERVAL_US, DEFAULT_RX_WAIT_TIMEOUT_US, DERIVED_MAC_ID_OFFSET,
    DERIVED_MAC_PREFIX, GPIO_COUNT, MAC_ADDR_LEN, REF_CLOCK_PINS, SM_PER_PIO,
};

/// PIO block instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pio {
    /// PIO block 0
    #[default]
    Pio0,
    /// PIO block 1
    Pio1,
}

impl Pio {
    /// Block index as used by the hardware
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Pio::Pio0 => 0,
            Pio::Pio1 => 1,
        }
    }
}

/// Number of capture state machines used for receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureMode {
    /// One capture state machine and DMA channel
    #[default]
    Single,
    /// Two capture state machines alternating frames
    Dual,
}

impl CaptureMode {
    /// Capture channels used in this mode
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            CaptureMode::Single => 1,
            CaptureMode::Dual => 2,
        }
    }
}

// =============================================================================
// Default Pin Assignments
// =============================================================================

// | Signal   | GPIO | Direction | Description                    |
// |----------|------|-----------|--------------------------------|
// | RX0      | 6    | Input     | Receive Data 0                 |
// | RX1      | 7    | Input     | Receive Data 1                 |
// | CRS_DV   | 8    | Input     | Carrier Sense / Data Valid     |
// | TX0      | 10   | Output    | Transmit Data 0                |
// | TX1      | 11   | Output    | Transmit Data 1                |
// | TX_EN    | 12   | Output    | Transmit Enable                |
// | MDIO     | 14   | In/Out    | Management Data                |
// | MDC      | 15   | Output    | Management Clock               |
// | RETCLK   | 21   | Output    | 50 MHz Reference Clock         |

const DEFAULT_RX_PIN: u8 = 6;
const DEFAULT_TX_PIN: u8 = 10;
const DEFAULT_MDIO_PIN: u8 = 14;
const DEFAULT_RETCLK_PIN: u8 = 21;

/// Complete RMII interface configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RmiiConfig {
    /// PIO block running the RMII programs
    pub pio: Pio,
    /// First state machine index; RX uses `sm_start`, TX `sm_start + 1`
    pub sm_start: u8,
    /// First pin of the RX0, RX1, CRS_DV triplet
    pub rx_pin_start: u8,
    /// First pin of the TX0, TX1, TX_EN triplet
    pub tx_pin_start: u8,
    /// MDIO data pin; MDC is the next pin
    pub mdio_pin_start: u8,
    /// Reference clock output pin
    pub retclk_pin: u8,
    /// Fixed hardware address, overriding the derived one
    pub mac_address: Option<[u8; MAC_ADDR_LEN]>,
    /// Single or dual capture state machines
    pub capture_mode: CaptureMode,
    /// Advertise 10BASE-T abilities during auto-negotiation
    pub advertise_10mbps: bool,
    /// Bounded wait for a received frame per poll round
    pub rx_wait_timeout_us: u32,
    /// Link status poll interval
    pub link_poll_interval_us: u32,
}

impl Default for RmiiConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RmiiConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pio: Pio::Pio0,
            sm_start: 0,
            rx_pin_start: DEFAULT_RX_PIN,
            tx_pin_start: DEFAULT_TX_PIN,
            mdio_pin_start: DEFAULT_MDIO_PIN,
            retclk_pin: DEFAULT_RETCLK_PIN,
            mac_address: None,
            capture_mode: CaptureMode::Single,
            advertise_10mbps: false,
            rx_wait_timeout_us: DEFAULT_RX_WAIT_TIMEOUT_US,
            link_poll_interval_us: DEFAULT_LINK_POLL_INTERVAL_US,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the PIO block
    #[must_use]
    pub const fn with_pio(mut self, pio: Pio) -> Self {
        self.pio = pio;
        self
    }

    /// Set the first state machine index
    #[must_use]
    pub const fn with_sm_start(mut self, sm: u8) -> Self {
        self.sm_start = sm;
        self
    }

    /// Set the first receive pin
    #[must_use]
    pub const fn with_rx_pin_start(mut self, pin: u8) -> Self {
        self.rx_pin_start = pin;
        self
    }

    /// Set the first transmit pin
    #[must_use]
    pub const fn with_tx_pin_start(mut self, pin: u8) -> Self {
        self.tx_pin_start = pin;
        self
    }

    /// Set the MDIO pin (MDC follows it)
    #[must_use]
    pub const fn with_mdio_pin_start(mut self, pin: u8) -> Self {
        self.mdio_pin_start = pin;
        self
    }

    /// Set the reference clock pin
    #[must_use]
    pub const fn with_retclk_pin(mut self, pin: u8) -> Self {
        self.retclk_pin = pin;
        self
    }

    /// Use a fixed hardware address instead of deriving one
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; MAC_ADDR_LEN]) -> Self {
        self.mac_address = Some(addr);
        self
    }

    /// Set the capture mode
    #[must_use]
    pub const fn with_capture_mode(mut self, mode: CaptureMode) -> Self {
        self.capture_mode = mode;
        self
    }

    /// Advertise 10BASE-T abilities
    #[must_use]
    pub const fn with_advertise_10mbps(mut self, enabled: bool) -> Self {
        self.advertise_10mbps = enabled;
        self
    }

    /// Set the receive wait timeout
    #[must_use]
    pub const fn with_rx_wait_timeout_us(mut self, timeout_us: u32) -> Self {
        self.rx_wait_timeout_us = timeout_us;
        self
    }

    /// Set the link poll interval
    #[must_use]
    pub const fn with_link_poll_interval_us(mut self, interval_us: u32) -> Self {
        self.link_poll_interval_us = interval_us;
        self
    }

    // =========================================================================
    // Derived Assignments
    // =========================================================================

    /// Receive state machine index
    #[must_use]
    pub const fn rx_sm(&self) -> u8 {
        self.sm_start
    }

    /// Transmit state machine index
    #[must_use]
    pub const fn tx_sm(&self) -> u8 {
        self.sm_start + 1
    }

    /// Second receive state machine, used in dual capture mode
    #[must_use]
    pub const fn rx_sm_secondary(&self) -> Option<u8> {
        match self.capture_mode {
            CaptureMode::Single => None,
            CaptureMode::Dual => Some(self.sm_start + 2),
        }
    }

    /// Carrier sense / data valid pin
    #[must_use]
    pub const fn crs_dv_pin(&self) -> u8 {
        self.rx_pin_start + 2
    }

    /// Transmit enable pin
    #[must_use]
    pub const fn tx_en_pin(&self) -> u8 {
        self.tx_pin_start + 2
    }

    /// MDIO data pin
    #[must_use]
    pub const fn mdio_pin(&self) -> u8 {
        self.mdio_pin_start
    }

    /// MDIO clock pin
    #[must_use]
    pub const fn mdc_pin(&self) -> u8 {
        self.mdio_pin_start + 1
    }

    /// State machines claimed from the PIO block
    #[must_use]
    pub const fn sm_count(&self) -> u8 {
        1 + self.capture_mode.channels() as u8
    }

    /// Check that the pins and state machines fit the hardware
    pub fn validate(&self) -> ConfigResult<()> {
        let fits = |start: u8, width: u8| u16::from(start) + u16::from(width) <= u16::from(GPIO_COUNT);

        if !fits(self.rx_pin_start, 3) || !fits(self.tx_pin_start, 3) || !fits(self.mdio_pin_start, 2) {
            return Err(ConfigError::InvalidPin);
        }
        if !REF_CLOCK_PINS.contains(&self.retclk_pin) {
            return Err(ConfigError::InvalidClockPin);
        }
        if u16::from(self.sm_start) + u16::from(self.sm_count()) > u16::from(SM_PER_PIO) {
            return Err(ConfigError::InvalidStateMachine);
        }
        if self.rx_wait_timeout_us == 0 || self.link_poll_interval_us == 0 {
            return Err(ConfigError::InvalidTiming);
        }
        Ok(())
    }

    /// Hardware address for the interface
    ///
    /// Returns the configured override, or the fixed prefix followed by the
    /// low bytes of the board's 8-byte unique identifier.
    #[must_use]
    pub fn hardware_address(&self, unique_id: &[u8; 8]) -> [u8; MAC_ADDR_LEN] {
        if let Some(addr) = self.mac_address {
            return addr;
        }
        let mut addr = [0u8; MAC_ADDR_LEN];
        let prefix = DERIVED_MAC_PREFIX.len();
        addr[..prefix].copy_from_slice(&DERIVED_MAC_PREFIX);
        addr[prefix..].copy_from_slice(&unique_id[DERIVED_MAC_ID_OFFSET..]);
        addr
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
