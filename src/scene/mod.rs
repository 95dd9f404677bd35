//! Scene dictionary assembly shared by every canopy entity

pub mod dict;
pub mod spectrum;

pub use dict::SceneDict;
pub use spectrum::Spectrum;
