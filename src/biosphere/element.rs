//! Canopy elements: anything that can be instanced in a discrete canopy

use crate::core::{Error, KernelDictContext, Result, UnitConfig};
use crate::scene::SceneDict;

use super::abstract_tree::AbstractTree;
use super::args::{self, Dict};
use super::leaf_cloud::LeafCloud;

/// A canopy element variant
#[derive(Clone, Debug, PartialEq)]
pub enum CanopyElement {
    LeafCloud(LeafCloud),
    AbstractTree(AbstractTree),
}

impl Default for CanopyElement {
    fn default() -> Self {
        CanopyElement::LeafCloud(LeafCloud::default())
    }
}

impl From<LeafCloud> for CanopyElement {
    fn from(cloud: LeafCloud) -> Self {
        CanopyElement::LeafCloud(cloud)
    }
}

impl From<AbstractTree> for CanopyElement {
    fn from(tree: AbstractTree) -> Self {
        CanopyElement::AbstractTree(tree)
    }
}

impl CanopyElement {
    /// Construct from keyword arguments, dispatching on the `type` key
    /// (`leaf_cloud` or `abstract_tree`).
    pub fn from_dict(mut dict: Dict, units: &UnitConfig) -> Result<Self> {
        let kind = args::take_tag(&mut dict, "type")?;
        match kind.as_deref() {
            Some("leaf_cloud") => LeafCloud::from_dict(dict, units).map(Self::from),
            Some("abstract_tree") => AbstractTree::from_dict(dict, units).map(Self::from),
            Some(other) => Err(Error::UnsupportedValue {
                key: "type",
                value: other.to_string(),
            }),
            None => Err(Error::InvalidParameter(
                "canopy element specification requires a 'type' key".to_string(),
            )),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CanopyElement::LeafCloud(cloud) => cloud.id(),
            CanopyElement::AbstractTree(tree) => tree.id(),
        }
    }

    pub fn bsdfs(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        match self {
            CanopyElement::LeafCloud(cloud) => cloud.bsdfs(ctx),
            CanopyElement::AbstractTree(tree) => tree.bsdfs(ctx),
        }
    }

    pub fn shapes(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        match self {
            CanopyElement::LeafCloud(cloud) => cloud.shapes(ctx),
            CanopyElement::AbstractTree(tree) => tree.shapes(ctx),
        }
    }

    pub fn kernel_dict(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        match self {
            CanopyElement::LeafCloud(cloud) => cloud.kernel_dict(ctx),
            CanopyElement::AbstractTree(tree) => tree.kernel_dict(ctx),
        }
    }
}
