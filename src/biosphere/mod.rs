//! Discrete canopy generation.
//!
//! Leaf clouds are generated from partially specified parameter sets,
//! optionally composed into abstract trees, instanced, and tiled into
//! discrete canopies. Every entity emits its part of the kernel scene
//! dictionary as BSDFs, shapes and (for instanced entities) instances.

pub mod abstract_tree;
pub mod args;
pub mod discrete;
pub mod element;
pub mod instanced;
pub mod io;
pub mod leaf_cloud;
pub mod params;
pub mod placement;
pub mod sampling;

pub use abstract_tree::AbstractTree;
pub use args::Dict;
pub use discrete::{DiscreteCanopy, LeafCloudFileRecord};
pub use element::CanopyElement;
pub use instanced::InstancedCanopyElement;
pub use leaf_cloud::LeafCloud;
pub use params::{
    ConeLeafCloudParams, ConeLeafCloudSpec, CuboidLeafCloudParams, CuboidLeafCloudSpec,
    CylinderLeafCloudParams, CylinderLeafCloudSpec, SphereLeafCloudParams, SphereLeafCloudSpec,
};
