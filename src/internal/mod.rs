//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`constants`]: Frame sizes, timing and pin limits
//! - [`logging`]: `defmt`/`log` dispatch macros

pub(crate) mod constants;
#[macro_use]
pub(crate) mod logging;
