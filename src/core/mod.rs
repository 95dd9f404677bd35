//! Core types, configuration and utilities

pub mod types;
pub mod error;
pub mod logging;
pub mod units;

pub use types::*;
pub use error::Error;
pub use units::{KernelDictContext, LengthUnit, UnitConfig};
