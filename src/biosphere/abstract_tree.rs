//! Abstract trees: a leaf cloud crown on top of a cylindrical trunk

use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::types::DVec3;
use crate::core::{Error, KernelDictContext, Result, UnitConfig};
use crate::math::transform::{mat4_to_value, scale, translate};
use crate::scene::{SceneDict, Spectrum};

use super::args::{self, Dict};
use super::leaf_cloud::LeafCloud;

/// Default abstract tree identifier
pub const DEFAULT_ABSTRACT_TREE_ID: &str = "abstract_tree";

/// A leaf cloud lifted by the trunk height, plus the trunk itself.
///
/// The trunk is a cylinder of radius `trunk_radius` running from just below
/// the ground to `trunk_height`, closed by a disk. Both trunk primitives
/// share one diffuse BSDF; the leaves keep their own.
#[derive(Clone, Debug, PartialEq)]
pub struct AbstractTree {
    id: String,
    leaf_cloud: LeafCloud,
    trunk_height: f64,
    trunk_radius: f64,
    trunk_reflectance: Spectrum,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AbstractTreeArgs {
    id: String,
    leaf_cloud: Option<Dict>,
    trunk_height: f64,
    trunk_radius: f64,
    trunk_reflectance: Spectrum,
}

impl Default for AbstractTreeArgs {
    fn default() -> Self {
        Self {
            id: DEFAULT_ABSTRACT_TREE_ID.to_string(),
            leaf_cloud: None,
            trunk_height: 1.0,
            trunk_radius: 0.1,
            trunk_reflectance: Spectrum::default(),
        }
    }
}

impl AbstractTree {
    /// Tree with the default trunk (1 m high, 0.1 m radius, reflectance 0.5)
    pub fn new(id: impl Into<String>, leaf_cloud: LeafCloud) -> Self {
        Self {
            id: id.into(),
            leaf_cloud,
            trunk_height: 1.0,
            trunk_radius: 0.1,
            trunk_reflectance: Spectrum::default(),
        }
    }

    /// Set trunk dimensions (metres)
    pub fn with_trunk(mut self, height: f64, radius: f64) -> Result<Self> {
        if !(height > 0.0 && radius > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "trunk dimensions must be positive, got height {height} and radius {radius}"
            )));
        }
        self.trunk_height = height;
        self.trunk_radius = radius;
        Ok(self)
    }

    pub fn with_trunk_reflectance(mut self, reflectance: impl Into<Spectrum>) -> Self {
        self.trunk_reflectance = reflectance.into();
        self
    }

    /// Construct from keyword arguments; the nested `leaf_cloud` mapping is
    /// forwarded to [`LeafCloud::from_dict`].
    pub fn from_dict(dict: Dict, units: &UnitConfig) -> Result<Self> {
        let tree_args: AbstractTreeArgs = args::parse_args("abstract_tree", dict)?;
        let leaf_cloud = tree_args.leaf_cloud.ok_or_else(|| {
            Error::InvalidParameter("parameter 'leaf_cloud' is required".to_string())
        })?;

        Self::new(tree_args.id, LeafCloud::from_dict(leaf_cloud, units)?)
            .with_trunk(
                units.length_to_meters(tree_args.trunk_height),
                units.length_to_meters(tree_args.trunk_radius),
            )
            .map(|tree| tree.with_trunk_reflectance(tree_args.trunk_reflectance))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn leaf_cloud(&self) -> &LeafCloud {
        &self.leaf_cloud
    }

    /// Trunk height in metres
    pub fn trunk_height(&self) -> f64 {
        self.trunk_height
    }

    /// Trunk radius in metres
    pub fn trunk_radius(&self) -> f64 {
        self.trunk_radius
    }

    pub fn trunk_reflectance(&self) -> &Spectrum {
        &self.trunk_reflectance
    }

    fn bsdf_id(&self) -> String {
        format!("bsdf_{}", self.id)
    }

    fn trunk_bsdf(&self) -> Value {
        json!({
            "type": "diffuse",
            "reflectance": self.trunk_reflectance.kernel_dict(),
        })
    }

    /// Leaf cloud BSDF followed by the trunk BSDF
    pub fn bsdfs(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        let mut dict = self.leaf_cloud.bsdfs(ctx)?;
        dict.insert(self.bsdf_id(), self.trunk_bsdf())?;
        Ok(dict)
    }

    /// Lifted leaves, trunk cylinder and trunk cap
    pub fn shapes(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        let height = ctx.kernel_length(self.trunk_height);
        let radius = ctx.kernel_length(self.trunk_radius);
        let bsdf = if ctx.ref_bsdfs {
            json!({"type": "ref", "id": self.bsdf_id()})
        } else {
            self.trunk_bsdf()
        };

        let mut dict = self
            .leaf_cloud
            .translated(DVec3::new(0.0, 0.0, self.trunk_height))
            .shapes(ctx)?;

        dict.insert(
            format!("trunk_cyl_{}", self.id),
            json!({
                "type": "cylinder",
                "bsdf": bsdf.clone(),
                "radius": radius,
                "p0": [0.0, 0.0, -0.1],
                "p1": [0.0, 0.0, height],
            }),
        )?;

        let cap = scale(radius) * translate(DVec3::new(0.0, 0.0, height / 2.0));
        dict.insert(
            format!("trunk_cap_{}", self.id),
            json!({
                "type": "disk",
                "bsdf": bsdf,
                "to_world": mat4_to_value(&cap),
            }),
        )?;

        Ok(dict)
    }

    pub fn kernel_dict(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        let mut dict = if ctx.ref_bsdfs {
            self.bsdfs(ctx)?
        } else {
            SceneDict::new()
        };
        dict.merge(self.shapes(ctx)?)?;
        Ok(dict)
    }
}
