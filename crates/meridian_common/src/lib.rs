//! Shared foundational types for the Meridian timing analyzer.
//!
//! This crate provides the core value types every Meridian crate builds on:
//! interned names for pins and clocks, corner-indexed delay triples with
//! min/max analysis-side selection, and the common result type for internal
//! errors.

#![warn(missing_docs)]

pub mod delay;
pub mod name;
pub mod result;

pub use delay::{Corner, Delay, EarlyLate, MinMax};
pub use name::{Name, NameTable};
pub use result::{InternalError, MeridianResult};
