//! Error types for the RMII driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Configuration and bring-up failures
//! - [`IoError`]: Runtime host-stack and PHY failures
//!
//! The unified [`Error`] enum wraps both domains and is returned by driver
//! methods that can fail. Per-frame receive outcomes (bad CRC, dropped
//! frames) are not errors: they are reported as
//! [`RxOutcome`](crate::frame::rx::RxOutcome) values and counted.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and initialization errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid PHY address (must be 0-31)
    InvalidPhyAddress,
    /// Invalid PHY register address (must be 0-31)
    InvalidRegister,
    /// A pin group does not fit in the GPIO bank
    InvalidPin,
    /// The state machines needed do not fit in one PIO block
    InvalidStateMachine,
    /// Reference clock pin cannot output a clock
    InvalidClockPin,
    /// A timeout or interval is zero
    InvalidTiming,
    /// Capture channels handed to the ring do not match the configured mode
    CaptureModeMismatch,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidPhyAddress => "invalid PHY address",
            ConfigError::InvalidRegister => "invalid PHY register",
            ConfigError::InvalidPin => "pin out of range",
            ConfigError::InvalidStateMachine => "state machine out of range",
            ConfigError::InvalidClockPin => "pin cannot output reference clock",
            ConfigError::InvalidTiming => "zero timeout or interval",
            ConfigError::CaptureModeMismatch => "capture channels do not match capture mode",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Host stack could not allocate a receive buffer
    NoBuffer,
    /// Host stack refused the delivered frame
    Rejected,
    /// PHY communication error
    PhyError,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::NoBuffer => "no host buffer available",
            IoError::Rejected => "frame rejected by host stack",
            IoError::PhyError => "PHY communication error",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::InvalidPhyAddress)) => { /* ... */ }
///     Err(Error::Io(IoError::Rejected)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl Error {
    /// Returns a human-readable description of the wrapped error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Error::Config(e) => e.as_str(),
            Error::Io(e) => e.as_str(),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;
