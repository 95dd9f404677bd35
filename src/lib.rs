//! Canopygen - discrete vegetation canopies for radiative transfer scenes

pub mod core;
pub mod math;
pub mod scene;
pub mod biosphere;
