//! Synchronization Support
//!
//! - **Semaphore** (`semaphore`): the counting semaphore that carries
//!   completed captures from the interrupt to the poll loop
//!   - [`CountingSemaphore`] - lock-free, single-writer tallies
//!
//! - **Primitives** (`primitives`): interrupt hand-off cells
//!   - [`CriticalSectionCell`] - ISR-safe interior mutability
//!   - [`IsrCell`] - parks the receive producer for the interrupt handler
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables the `primitives` module

pub mod semaphore;

pub use semaphore::CountingSemaphore;

// Primitives module (requires critical-section)
#[cfg(any(feature = "critical-section", test))]
mod primitives;

#[cfg(any(feature = "critical-section", test))]
pub use primitives::{CriticalSectionCell, IsrCell};
