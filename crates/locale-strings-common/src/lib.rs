//! # Locale Strings Common
//!
//! Shared helpers for the locale-strings workspace.
//!
//! This crate provides the process-environment locale detection used as the
//! default system locale, plus test fixtures shared by the other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use utils::*;
