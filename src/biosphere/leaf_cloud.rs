//! Leaf clouds: collections of disk-shaped leaves sharing one material.
//!
//! A leaf cloud is created by one of the shape generators (cuboid, sphere,
//! cylinder, cone), loaded from a text file, or built directly from arrays.
//! Its content never changes after construction; translation returns a new
//! cloud.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::types::DVec3;
use crate::core::{Error, KernelDictContext, Result, UnitConfig};
use crate::math::transform::{disk_to_world, mat4_to_value};
use crate::scene::{SceneDict, Spectrum};

use super::args::{self, Dict};
use super::io;
use super::params::{
    AxialLeafCloudParams, ConeLeafCloudSpec, CuboidLeafCloudParams, CuboidLeafCloudSpec,
    CylinderLeafCloudSpec, LeafCloudParams, SphereLeafCloudParams, SphereLeafCloudSpec,
    DEFAULT_LEAF_CLOUD_ID,
};
use super::placement::positions_cuboid_avoid_overlap;
use super::sampling;

/// A cloud of disk-shaped leaves
#[derive(Clone, Debug, PartialEq)]
pub struct LeafCloud {
    id: String,
    leaf_positions: Vec<DVec3>,
    leaf_orientations: Vec<DVec3>,
    leaf_radii: Vec<f64>,
    leaf_reflectance: Spectrum,
    leaf_transmittance: Spectrum,
}

impl Default for LeafCloud {
    fn default() -> Self {
        Self {
            id: DEFAULT_LEAF_CLOUD_ID.to_string(),
            leaf_positions: Vec::new(),
            leaf_orientations: Vec::new(),
            leaf_radii: Vec::new(),
            leaf_reflectance: Spectrum::default(),
            leaf_transmittance: Spectrum::default(),
        }
    }
}

/// Keyword arguments of the direct constructor (lengths in config units)
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LeafCloudArgs {
    id: String,
    leaf_positions: Vec<Vec<f64>>,
    leaf_orientations: Vec<Vec<f64>>,
    leaf_radii: Vec<f64>,
    leaf_reflectance: Spectrum,
    leaf_transmittance: Spectrum,
}

impl Default for LeafCloudArgs {
    fn default() -> Self {
        Self {
            id: DEFAULT_LEAF_CLOUD_ID.to_string(),
            leaf_positions: Vec::new(),
            leaf_orientations: Vec::new(),
            leaf_radii: Vec::new(),
            leaf_reflectance: Spectrum::default(),
            leaf_transmittance: Spectrum::default(),
        }
    }
}

/// Keyword arguments of the file loader
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LeafCloudFileArgs {
    id: String,
    filename: Option<PathBuf>,
    leaf_reflectance: Spectrum,
    leaf_transmittance: Spectrum,
}

impl Default for LeafCloudFileArgs {
    fn default() -> Self {
        Self {
            id: DEFAULT_LEAF_CLOUD_ID.to_string(),
            filename: None,
            leaf_reflectance: Spectrum::default(),
            leaf_transmittance: Spectrum::default(),
        }
    }
}

impl LeafCloud {
    /// Build a leaf cloud from per-leaf arrays (metres).
    ///
    /// The three arrays must have the same length and every radius must be
    /// positive.
    pub fn new(
        id: impl Into<String>,
        leaf_positions: Vec<DVec3>,
        leaf_orientations: Vec<DVec3>,
        leaf_radii: Vec<f64>,
    ) -> Result<Self> {
        if leaf_positions.len() != leaf_orientations.len()
            || leaf_positions.len() != leaf_radii.len()
        {
            return Err(Error::Shape(format!(
                "leaf_positions, leaf_orientations and leaf_radii must have the same length, \
                 got {}, {} and {}",
                leaf_positions.len(),
                leaf_orientations.len(),
                leaf_radii.len()
            )));
        }
        if let Some(r) = leaf_radii.iter().find(|r| !(**r > 0.0)) {
            return Err(Error::InvalidParameter(format!(
                "leaf radii must be positive, got {r}"
            )));
        }

        Ok(Self {
            id: id.into(),
            leaf_positions,
            leaf_orientations,
            leaf_radii,
            ..Self::default()
        })
    }

    /// Build a leaf cloud from nested `(N, 3)` arrays
    pub fn from_arrays(
        id: impl Into<String>,
        leaf_positions: &[Vec<f64>],
        leaf_orientations: &[Vec<f64>],
        leaf_radii: Vec<f64>,
    ) -> Result<Self> {
        Self::new(
            id,
            args::vec3_rows("leaf_positions", leaf_positions)?,
            args::vec3_rows("leaf_orientations", leaf_orientations)?,
            leaf_radii,
        )
    }

    pub fn with_reflectance(mut self, reflectance: impl Into<Spectrum>) -> Self {
        self.leaf_reflectance = reflectance.into();
        self
    }

    pub fn with_transmittance(mut self, transmittance: impl Into<Spectrum>) -> Self {
        self.leaf_transmittance = transmittance.into();
        self
    }

    fn with_common(self, common: &LeafCloudParams) -> Self {
        Self {
            id: common.id.clone(),
            leaf_reflectance: common.leaf_reflectance.clone(),
            leaf_transmittance: common.leaf_transmittance.clone(),
            ..self
        }
    }

    // -----------------------------------------------------------------------
    // Generators
    // -----------------------------------------------------------------------

    /// Leaves uniformly distributed in a square-footprint cuboid
    /// `[-L_h/2, L_h/2]² × [0, L_v]`.
    ///
    /// With `avoid_overlap`, leaf bounding boxes are kept disjoint; this can
    /// fail with [`Error::CanopyTooDense`].
    pub fn cuboid(spec: &CuboidLeafCloudSpec, units: &UnitConfig) -> Result<Self> {
        let params = CuboidLeafCloudParams::new(&spec.in_meters(units))?;
        let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);

        let n_leaves = params.n_leaves()?;
        let leaf_radius = params.leaf_radius()?;
        let l_horizontal = params.l_horizontal()?;
        let l_vertical = params.l_vertical()?;

        let positions = if spec.avoid_overlap {
            positions_cuboid_avoid_overlap(
                n_leaves,
                l_horizontal,
                l_vertical,
                leaf_radius,
                spec.n_attempts,
                &mut rng,
            )?
        } else {
            sampling::positions_cuboid(n_leaves, l_horizontal, l_vertical, &mut rng)
        };
        let common = params.common();
        let orientations = sampling::orientations(n_leaves, common.mu, common.nu, &mut rng);
        let radii = sampling::radii(n_leaves, leaf_radius);

        log::debug!("Generated cuboid leaf cloud: {params}");
        Ok(Self::new(&common.id, positions, orientations, radii)?.with_common(common))
    }

    /// Leaves distributed in a sphere centered on the origin
    pub fn sphere(spec: &SphereLeafCloudSpec, units: &UnitConfig) -> Result<Self> {
        let params = SphereLeafCloudParams::new(&spec.in_meters(units))?;
        let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);

        let positions = sampling::positions_sphere(params.n_leaves, params.radius, &mut rng);
        let common = &params.common;
        let orientations = sampling::orientations(params.n_leaves, common.mu, common.nu, &mut rng);
        let radii = sampling::radii(params.n_leaves, params.leaf_radius);

        log::debug!(
            "Generated sphere leaf cloud '{}': {} leaves, radius {} m",
            common.id, params.n_leaves, params.radius
        );
        Ok(Self::new(&common.id, positions, orientations, radii)?.with_common(common))
    }

    /// Leaves distributed in a vertical cylinder standing on the origin
    pub fn cylinder(spec: &CylinderLeafCloudSpec, units: &UnitConfig) -> Result<Self> {
        let params = AxialLeafCloudParams::new(&spec.in_meters(units))?;
        let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);

        let positions = sampling::positions_cylinder(
            params.n_leaves,
            params.radius,
            params.l_vertical,
            &mut rng,
        );
        Self::from_axial(params, positions, &mut rng, "cylinder")
    }

    /// Leaves distributed in an upright cone with its base on the origin
    pub fn cone(spec: &ConeLeafCloudSpec, units: &UnitConfig) -> Result<Self> {
        let params = AxialLeafCloudParams::new(&spec.in_meters(units))?;
        let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);

        let positions =
            sampling::positions_cone(params.n_leaves, params.radius, params.l_vertical, &mut rng);
        Self::from_axial(params, positions, &mut rng, "cone")
    }

    fn from_axial(
        params: AxialLeafCloudParams,
        positions: Vec<DVec3>,
        rng: &mut ChaCha8Rng,
        shape: &str,
    ) -> Result<Self> {
        let common = &params.common;
        let orientations = sampling::orientations(params.n_leaves, common.mu, common.nu, rng);
        let radii = sampling::radii(params.n_leaves, params.leaf_radius);

        log::debug!(
            "Generated {shape} leaf cloud '{}': {} leaves, radius {} m, height {} m",
            common.id, params.n_leaves, params.radius, params.l_vertical
        );
        Ok(Self::new(&common.id, positions, orientations, radii)?.with_common(common))
    }

    /// Load leaves from a seven-column text file (metres)
    pub fn from_file(
        id: impl Into<String>,
        path: &Path,
        leaf_reflectance: impl Into<Spectrum>,
        leaf_transmittance: impl Into<Spectrum>,
    ) -> Result<Self> {
        let arrays = io::read_leaf_cloud(path)?;
        Ok(Self::new(id, arrays.positions, arrays.orientations, arrays.radii)?
            .with_reflectance(leaf_reflectance)
            .with_transmittance(leaf_transmittance))
    }

    /// Construct from keyword arguments.
    ///
    /// The optional `construct` key selects the constructor (`cuboid`,
    /// `sphere`, `cylinder`, `cone`, `from_file`); without it the remaining
    /// keys are forwarded to the direct constructor. Lengths are interpreted
    /// in `units`.
    pub fn from_dict(mut dict: Dict, units: &UnitConfig) -> Result<Self> {
        let construct = args::take_tag(&mut dict, "construct")?;

        match construct.as_deref() {
            Some("cuboid") => Self::cuboid(&args::parse_args("cuboid", dict)?, units),
            Some("sphere") => Self::sphere(&args::parse_args("sphere", dict)?, units),
            Some("cylinder") => Self::cylinder(&args::parse_args("cylinder", dict)?, units),
            Some("cone") => Self::cone(&args::parse_args("cone", dict)?, units),
            Some("from_file") => {
                let file_args: LeafCloudFileArgs = args::parse_args("from_file", dict)?;
                let path = file_args.filename.ok_or_else(|| {
                    Error::InvalidParameter("parameter 'filename' is required".to_string())
                })?;
                Self::from_file(
                    file_args.id,
                    &path,
                    file_args.leaf_reflectance,
                    file_args.leaf_transmittance,
                )
            }
            None => {
                let direct: LeafCloudArgs = args::parse_args("leaf_cloud", dict)?;
                let to_m = |p: DVec3| p * units.length_to_meters(1.0);
                let positions = args::vec3_rows("leaf_positions", &direct.leaf_positions)?
                    .into_iter()
                    .map(to_m)
                    .collect();
                let radii = direct
                    .leaf_radii
                    .iter()
                    .map(|r| units.length_to_meters(*r))
                    .collect();
                Ok(Self::new(
                    direct.id,
                    positions,
                    args::vec3_rows("leaf_orientations", &direct.leaf_orientations)?,
                    radii,
                )?
                .with_reflectance(direct.leaf_reflectance)
                .with_transmittance(direct.leaf_transmittance))
            }
            Some(other) => Err(Error::UnsupportedValue {
                key: "construct",
                value: other.to_string(),
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors and transformations
    // -----------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn n_leaves(&self) -> usize {
        self.leaf_positions.len()
    }

    /// Leaf centers in metres
    pub fn leaf_positions(&self) -> &[DVec3] {
        &self.leaf_positions
    }

    /// Leaf normals (not necessarily normalized)
    pub fn leaf_orientations(&self) -> &[DVec3] {
        &self.leaf_orientations
    }

    /// Leaf radii in metres
    pub fn leaf_radii(&self) -> &[f64] {
        &self.leaf_radii
    }

    pub fn leaf_reflectance(&self) -> &Spectrum {
        &self.leaf_reflectance
    }

    pub fn leaf_transmittance(&self) -> &Spectrum {
        &self.leaf_transmittance
    }

    /// Copy of self with every leaf moved by `offset` (metres)
    pub fn translated(&self, offset: DVec3) -> Self {
        Self {
            leaf_positions: self.leaf_positions.iter().map(|p| *p + offset).collect(),
            ..self.clone()
        }
    }

    /// Copy of self with leaf `i` moved by `offsets[i]`
    pub fn translated_each(&self, offsets: &[DVec3]) -> Result<Self> {
        if offsets.len() != self.leaf_positions.len() {
            return Err(Error::Shape(format!(
                "shapes of offsets ({}, 3) and leaf_positions ({}, 3) do not match",
                offsets.len(),
                self.leaf_positions.len()
            )));
        }
        Ok(Self {
            leaf_positions: self
                .leaf_positions
                .iter()
                .zip(offsets)
                .map(|(p, o)| *p + *o)
                .collect(),
            ..self.clone()
        })
    }

    /// Write the leaves to a seven-column text file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        io::write_leaf_cloud(
            path,
            &self.leaf_radii,
            &self.leaf_positions,
            &self.leaf_orientations,
        )
    }

    // -----------------------------------------------------------------------
    // Kernel dictionary emission
    // -----------------------------------------------------------------------

    fn bsdf_id(&self) -> String {
        format!("bsdf_{}", self.id)
    }

    fn bsdf(&self) -> Value {
        json!({
            "type": "bilambertian",
            "reflectance": self.leaf_reflectance.kernel_dict(),
            "transmittance": self.leaf_transmittance.kernel_dict(),
        })
    }

    /// BSDF shared by every leaf
    pub fn bsdfs(&self, _ctx: &KernelDictContext) -> Result<SceneDict> {
        let mut dict = SceneDict::new();
        dict.insert(self.bsdf_id(), self.bsdf())?;
        Ok(dict)
    }

    /// One disk shape per leaf
    pub fn shapes(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        let bsdf = if ctx.ref_bsdfs {
            json!({"type": "ref", "id": self.bsdf_id()})
        } else {
            self.bsdf()
        };
        let k = ctx.kernel_length(1.0);

        let mut dict = SceneDict::new();
        for (i, ((position, normal), radius)) in self
            .leaf_positions
            .iter()
            .zip(&self.leaf_orientations)
            .zip(&self.leaf_radii)
            .enumerate()
        {
            let to_world = disk_to_world(*position * k, *normal, radius * k).ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "leaf {i} of '{}' has a zero-length normal",
                    self.id
                ))
            })?;
            dict.insert(
                format!("{}_leaf_{i}", self.id),
                json!({
                    "type": "disk",
                    "bsdf": bsdf.clone(),
                    "to_world": mat4_to_value(&to_world),
                }),
            )?;
        }
        Ok(dict)
    }

    /// Shapes, preceded by the BSDF when shapes refer to it
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
