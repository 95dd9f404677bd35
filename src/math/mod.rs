//! Mathematical utilities and data structures

pub mod aabb;
pub mod aabb_tree;
pub mod transform;

pub use aabb::Aabb;
pub use aabb_tree::AabbTree;
