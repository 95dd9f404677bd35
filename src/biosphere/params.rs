//! Leaf cloud generator parameters and their dependency graphs.
//!
//! Each generator accepts a partially specified parameter set (a `*Spec`,
//! deserializable from a scene dictionary) and turns it into a resolved
//! parameter object. Missing quantities are derived on first access from
//! whichever related quantities are available and memoized; construction
//! forces every derivable field once so that an under-constrained set fails
//! immediately, naming the field that could not be computed.
//!
//! Over-specified sets are not cross-checked: supplied values always win,
//! even when they contradict the relations below.
//!
//! Cuboid relations (r: leaf radius, L_h / L_v: horizontal / vertical extent):
//!
//! ```text
//! n_leaves     = floor(LAI · (L_h / r)² / π)
//! LAI          = π · (r / L_h)² · n_leaves
//! r            = √(LAI / (n_leaves · π)) · L_h
//! L_h          = r · √(π · n_leaves / LAI)
//! L_v          = LAI · hdo³ / (π · r² · hvr)
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, UnitConfig};
use crate::scene::Spectrum;

use super::placement::DEFAULT_N_ATTEMPTS;

/// Default generator seed
pub const DEFAULT_SEED: u64 = 12345;
/// Default first inverse beta parameter
pub const DEFAULT_MU: f64 = 1.066;
/// Default second inverse beta parameter
pub const DEFAULT_NU: f64 = 1.853;
/// Default leaf cloud identifier
pub const DEFAULT_LEAF_CLOUD_ID: &str = "leaf_cloud";
/// Largest leaf count a generator accepts
pub const MAX_N_LEAVES: usize = 100_000_000;

/// A quantity of a parameter dependency graph
pub trait ParamField: Copy + Eq + Hash + fmt::Debug {
    fn name(self) -> &'static str;
}

/// Memo table for lazily derived parameters.
///
/// Tracks fields under evaluation so that a cyclic request (a quantity that
/// ultimately depends on itself because its true inputs are missing) fails
/// instead of recursing forever.
#[derive(Clone, Debug)]
struct ParamCache<F> {
    resolved: RefCell<HashMap<F, f64>>,
    in_progress: RefCell<Vec<F>>,
}

impl<F: ParamField> ParamCache<F> {
    fn with_inputs(inputs: impl IntoIterator<Item = (F, Option<f64>)>) -> Self {
        let resolved = inputs
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect();
        Self {
            resolved: RefCell::new(resolved),
            in_progress: RefCell::new(Vec::new()),
        }
    }

    fn get_or_resolve(&self, field: F, derive: impl FnOnce() -> Result<f64>) -> Result<f64> {
        let cached = self.resolved.borrow().get(&field).copied();
        if let Some(value) = cached {
            return Ok(value);
        }

        if self.in_progress.borrow().contains(&field) {
            return Err(Error::UnderConstrained { field: field.name() });
        }

        self.in_progress.borrow_mut().push(field);
        let derived = derive();
        self.in_progress.borrow_mut().retain(|f| *f != field);

        let value = derived?;
        if !value.is_finite() {
            return Err(Error::UnderConstrained { field: field.name() });
        }
        self.resolved.borrow_mut().insert(field, value);
        Ok(value)
    }
}

fn require_positive(name: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !(v > 0.0 && v.is_finite()) => Err(Error::InvalidParameter(format!(
            "'{name}' must be a positive number, got {v}"
        ))),
        _ => Ok(()),
    }
}

fn require_leaf_count(n_leaves: f64) -> Result<()> {
    if n_leaves > MAX_N_LEAVES as f64 {
        return Err(Error::InvalidParameter(format!(
            "'n_leaves' resolves to {n_leaves}, above the limit of {MAX_N_LEAVES}"
        )));
    }
    Ok(())
}

fn require_non_negative(name: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !(v >= 0.0 && v.is_finite()) => Err(Error::InvalidParameter(format!(
            "'{name}' must be a non-negative number, got {v}"
        ))),
        _ => Ok(()),
    }
}

/// Parameters shared by every leaf cloud generator
#[derive(Clone, Debug, PartialEq)]
pub struct LeafCloudParams {
    pub id: String,
    pub leaf_reflectance: Spectrum,
    pub leaf_transmittance: Spectrum,
    /// First parameter of the inverse beta leaf inclination model
    pub mu: f64,
    /// Second parameter of the inverse beta leaf inclination model
    pub nu: f64,
}

impl LeafCloudParams {
    fn new(
        id: &str,
        leaf_reflectance: &Spectrum,
        leaf_transmittance: &Spectrum,
        mu: f64,
        nu: f64,
    ) -> Result<Self> {
        require_positive("mu", Some(mu))?;
        require_positive("nu", Some(nu))?;
        Ok(Self {
            id: id.to_string(),
            leaf_reflectance: leaf_reflectance.clone(),
            leaf_transmittance: leaf_transmittance.clone(),
            mu,
            nu,
        })
    }
}

// ---------------------------------------------------------------------------
// Cuboid
// ---------------------------------------------------------------------------

/// User-facing inputs of the cuboid generator. Lengths are in config units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CuboidLeafCloudSpec {
    pub id: String,
    pub leaf_reflectance: Spectrum,
    pub leaf_transmittance: Spectrum,
    pub mu: f64,
    pub nu: f64,
    pub n_leaves: Option<usize>,
    pub leaf_radius: Option<f64>,
    /// Horizontal extent (side of the square footprint)
    pub l_horizontal: Option<f64>,
    /// Vertical extent
    pub l_vertical: Option<f64>,
    /// Leaf area index
    pub lai: Option<f64>,
    /// Mean horizontal distance between leaves
    pub hdo: Option<f64>,
    /// Ratio of mean horizontal leaf distance to vertical extent
    pub hvr: Option<f64>,
    /// Random generator seed
    pub seed: u64,
    /// Reject placements whose inflated boxes overlap
    pub avoid_overlap: bool,
    /// Candidate draws per leaf when `avoid_overlap` is set
    pub n_attempts: usize,
}

impl Default for CuboidLeafCloudSpec {
    fn default() -> Self {
        Self {
            id: DEFAULT_LEAF_CLOUD_ID.to_string(),
            leaf_reflectance: Spectrum::default(),
            leaf_transmittance: Spectrum::default(),
            mu: DEFAULT_MU,
            nu: DEFAULT_NU,
            n_leaves: None,
            leaf_radius: None,
            l_horizontal: None,
            l_vertical: None,
            lai: None,
            hdo: None,
            hvr: None,
            seed: DEFAULT_SEED,
            avoid_overlap: false,
            n_attempts: DEFAULT_N_ATTEMPTS,
        }
    }
}

impl CuboidLeafCloudSpec {
    /// Copy with every length converted from `units` to metres
    pub fn in_meters(&self, units: &UnitConfig) -> Self {
        let m = |v: Option<f64>| v.map(|v| units.length_to_meters(v));
        Self {
            leaf_radius: m(self.leaf_radius),
            l_horizontal: m(self.l_horizontal),
            l_vertical: m(self.l_vertical),
            hdo: m(self.hdo),
            ..self.clone()
        }
    }
}

/// Quantities of the cuboid dependency graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CuboidField {
    NLeaves,
    Lai,
    LeafRadius,
    LHorizontal,
    LVertical,
}

impl CuboidField {
    /// Fields forced at construction, in evaluation order
    pub const ALL: [CuboidField; 5] = [
        CuboidField::NLeaves,
        CuboidField::LeafRadius,
        CuboidField::LHorizontal,
        CuboidField::LVertical,
        CuboidField::Lai,
    ];
}

impl ParamField for CuboidField {
    fn name(self) -> &'static str {
        match self {
            CuboidField::NLeaves => "n_leaves",
            CuboidField::Lai => "lai",
            CuboidField::LeafRadius => "leaf_radius",
            CuboidField::LHorizontal => "l_horizontal",
            CuboidField::LVertical => "l_vertical",
        }
    }
}

/// Resolved cuboid generator parameters
#[derive(Clone, Debug)]
pub struct CuboidLeafCloudParams {
    common: LeafCloudParams,
    hdo: Option<f64>,
    hvr: Option<f64>,
    cache: ParamCache<CuboidField>,
}

impl CuboidLeafCloudParams {
    /// Validate `spec` and resolve every derivable quantity
    pub fn new(spec: &CuboidLeafCloudSpec) -> Result<Self> {
        require_positive("leaf_radius", spec.leaf_radius)?;
        require_positive("l_horizontal", spec.l_horizontal)?;
        require_positive("l_vertical", spec.l_vertical)?;
        require_non_negative("lai", spec.lai)?;
        require_positive("hdo", spec.hdo)?;
        require_positive("hvr", spec.hvr)?;

        let common = LeafCloudParams::new(
            &spec.id,
            &spec.leaf_reflectance,
            &spec.leaf_transmittance,
            spec.mu,
            spec.nu,
        )?;

        let params = Self {
            common,
            hdo: spec.hdo,
            hvr: spec.hvr,
            cache: ParamCache::with_inputs([
                (CuboidField::NLeaves, spec.n_leaves.map(|n| n as f64)),
                (CuboidField::Lai, spec.lai),
                (CuboidField::LeafRadius, spec.leaf_radius),
                (CuboidField::LHorizontal, spec.l_horizontal),
                (CuboidField::LVertical, spec.l_vertical),
            ]),
        };
        params.update()?;
        require_leaf_count(params.get(CuboidField::NLeaves)?)?;
        Ok(params)
    }

    /// Force resolution of every field once
    fn update(&self) -> Result<()> {
        for field in CuboidField::ALL {
            self.get(field)
                .map_err(|_| Error::UnderConstrained { field: field.name() })?;
        }
        Ok(())
    }

    fn get(&self, field: CuboidField) -> Result<f64> {
        match field {
            CuboidField::NLeaves => self.cache.get_or_resolve(field, || {
                let ratio = self.l_horizontal()? / self.leaf_radius()?;
                Ok((self.lai()? * ratio * ratio / PI).trunc())
            }),
            CuboidField::Lai => self.cache.get_or_resolve(field, || {
                let ratio = self.leaf_radius()? / self.l_horizontal()?;
                Ok(PI * ratio * ratio * self.n_leaves()? as f64)
            }),
            CuboidField::LeafRadius => self.cache.get_or_resolve(field, || {
                Ok((self.lai()? / (self.n_leaves()? as f64 * PI)).sqrt() * self.l_horizontal()?)
            }),
            CuboidField::LHorizontal => self.cache.get_or_resolve(field, || {
                Ok(self.leaf_radius()? * (PI * self.n_leaves()? as f64 / self.lai()?).sqrt())
            }),
            CuboidField::LVertical => self.cache.get_or_resolve(field, || {
                let hdo = self.hdo.ok_or(Error::UnderConstrained { field: "hdo" })?;
                let hvr = self.hvr.ok_or(Error::UnderConstrained { field: "hvr" })?;
                let r = self.leaf_radius()?;
                Ok(self.lai()? * hdo.powi(3) / (PI * r * r * hvr))
            }),
        }
    }

    pub fn common(&self) -> &LeafCloudParams {
        &self.common
    }

    pub fn id(&self) -> &str {
        &self.common.id
    }

    pub fn n_leaves(&self) -> Result<usize> {
        self.get(CuboidField::NLeaves).map(|n| n as usize)
    }

    pub fn lai(&self) -> Result<f64> {
        self.get(CuboidField::Lai)
    }

    pub fn leaf_radius(&self) -> Result<f64> {
        self.get(CuboidField::LeafRadius)
    }

    pub fn l_horizontal(&self) -> Result<f64> {
        self.get(CuboidField::LHorizontal)
    }

    pub fn l_vertical(&self) -> Result<f64> {
        self.get(CuboidField::LVertical)
    }

    pub fn hdo(&self) -> Option<f64> {
        self.hdo
    }

    pub fn hvr(&self) -> Option<f64> {
        self.hvr
    }
}

impl fmt::Display for CuboidLeafCloudParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |r: Result<f64>| r.map_or_else(|_| "?".to_string(), |v| v.to_string());
        write!(
            f,
            "CuboidLeafCloudParams(id={:?}, lai={}, leaf_radius={}, l_horizontal={}, \
             l_vertical={}, n_leaves={}, leaf_reflectance={:?}, leaf_transmittance={:?})",
            self.common.id,
            show(self.lai()),
            show(self.leaf_radius()),
            show(self.l_horizontal()),
            show(self.l_vertical()),
            show(self.n_leaves().map(|n| n as f64)),
            self.common.leaf_reflectance,
            self.common.leaf_transmittance,
        )
    }
}

// ---------------------------------------------------------------------------
// Sphere, cylinder, cone
// ---------------------------------------------------------------------------

fn required<T: Copy>(field: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or(Error::UnderConstrained { field })
}

/// User-facing inputs of the sphere generator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SphereLeafCloudSpec {
    pub id: String,
    pub leaf_reflectance: Spectrum,
    pub leaf_transmittance: Spectrum,
    pub mu: f64,
    pub nu: f64,
    pub n_leaves: Option<usize>,
    pub leaf_radius: Option<f64>,
    /// Leaf cloud radius
    pub radius: f64,
    pub seed: u64,
}

impl Default for SphereLeafCloudSpec {
    fn default() -> Self {
        Self {
            id: DEFAULT_LEAF_CLOUD_ID.to_string(),
            leaf_reflectance: Spectrum::default(),
            leaf_transmittance: Spectrum::default(),
            mu: DEFAULT_MU,
            nu: DEFAULT_NU,
            n_leaves: None,
            leaf_radius: None,
            radius: 1.0,
            seed: DEFAULT_SEED,
        }
    }
}

impl SphereLeafCloudSpec {
    /// Copy with every length converted from `units` to metres
    pub fn in_meters(&self, units: &UnitConfig) -> Self {
        Self {
            leaf_radius: self.leaf_radius.map(|v| units.length_to_meters(v)),
            radius: units.length_to_meters(self.radius),
            ..self.clone()
        }
    }
}

/// Resolved sphere generator parameters
#[derive(Clone, Debug, PartialEq)]
pub struct SphereLeafCloudParams {
    pub common: LeafCloudParams,
    pub n_leaves: usize,
    pub leaf_radius: f64,
    pub radius: f64,
}

impl SphereLeafCloudParams {
    pub fn new(spec: &SphereLeafCloudSpec) -> Result<Self> {
        require_positive("leaf_radius", spec.leaf_radius)?;
        require_positive("radius", Some(spec.radius))?;
        let n_leaves = required("n_leaves", spec.n_leaves)?;
        require_leaf_count(n_leaves as f64)?;
        Ok(Self {
            common: LeafCloudParams::new(
                &spec.id,
                &spec.leaf_reflectance,
                &spec.leaf_transmittance,
                spec.mu,
                spec.nu,
            )?,
            n_leaves,
            leaf_radius: required("leaf_radius", spec.leaf_radius)?,
            radius: spec.radius,
        })
    }
}

/// User-facing inputs of the cylinder and cone generators
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxialLeafCloudSpec {
    pub id: String,
    pub leaf_reflectance: Spectrum,
    pub leaf_transmittance: Spectrum,
    pub mu: f64,
    pub nu: f64,
    pub n_leaves: Option<usize>,
    pub leaf_radius: Option<f64>,
    /// Leaf cloud radius (base radius for a cone)
    pub radius: f64,
    /// Leaf cloud vertical extent
    pub l_vertical: f64,
    pub seed: u64,
}

impl Default for AxialLeafCloudSpec {
    fn default() -> Self {
        Self {
            id: DEFAULT_LEAF_CLOUD_ID.to_string(),
            leaf_reflectance: Spectrum::default(),
            leaf_transmittance: Spectrum::default(),
            mu: DEFAULT_MU,
            nu: DEFAULT_NU,
            n_leaves: None,
            leaf_radius: None,
            radius: 1.0,
            l_vertical: 1.0,
            seed: DEFAULT_SEED,
        }
    }
}

impl AxialLeafCloudSpec {
    /// Copy with every length converted from `units` to metres
    pub fn in_meters(&self, units: &UnitConfig) -> Self {
        Self {
            leaf_radius: self.leaf_radius.map(|v| units.length_to_meters(v)),
            radius: units.length_to_meters(self.radius),
            l_vertical: units.length_to_meters(self.l_vertical),
            ..self.clone()
        }
    }
}

pub type CylinderLeafCloudSpec = AxialLeafCloudSpec;
pub type ConeLeafCloudSpec = AxialLeafCloudSpec;

/// Resolved cylinder or cone generator parameters
#[derive(Clone, Debug, PartialEq)]
pub struct AxialLeafCloudParams {
    pub common: LeafCloudParams,
    pub n_leaves: usize,
    pub leaf_radius: f64,
    pub radius: f64,
    pub l_vertical: f64,
}

impl AxialLeafCloudParams {
    pub fn new(spec: &AxialLeafCloudSpec) -> Result<Self> {
        require_positive("leaf_radius", spec.leaf_radius)?;
        require_positive("radius", Some(spec.radius))?;
        require_positive("l_vertical", Some(spec.l_vertical))?;
        let n_leaves = required("n_leaves", spec.n_leaves)?;
        require_leaf_count(n_leaves as f64)?;
        Ok(Self {
            common: LeafCloudParams::new(
                &spec.id,
                &spec.leaf_reflectance,
                &spec.leaf_transmittance,
                spec.mu,
                spec.nu,
            )?,
            n_leaves,
            leaf_radius: required("leaf_radius", spec.leaf_radius)?,
            radius: spec.radius,
            l_vertical: spec.l_vertical,
        })
    }
}

pub type CylinderLeafCloudParams = AxialLeafCloudParams;
pub type ConeLeafCloudParams = AxialLeafCloudParams;

#[cfg(test)]
mod tests {
    use super::*;

    fn cuboid(f: impl FnOnce(&mut CuboidLeafCloudSpec)) -> Result<CuboidLeafCloudParams> {
        let mut spec = CuboidLeafCloudSpec::default();
        f(&mut spec);
        CuboidLeafCloudParams::new(&spec)
    }

    #[test]
    fn test_n_leaves_from_lai() {
        let params = cuboid(|s| {
            s.lai = Some(3.0);
            s.leaf_radius = Some(0.1);
            s.l_horizontal = Some(10.0);
            s.l_vertical = Some(1.0);
        })
        .unwrap();
        // floor(3 · 100² / π)
        assert_eq!(params.n_leaves().unwrap(), 9549);
        assert_eq!(params.lai().unwrap(), 3.0);
    }

    #[test]
    fn test_lai_round_trip() {
        let n_leaves = 1000;
        let leaf_radius = 0.1;
        let l_horizontal = 10.0;

        let derived = cuboid(|s| {
            s.n_leaves = Some(n_leaves);
            s.leaf_radius = Some(leaf_radius);
            s.l_horizontal = Some(l_horizontal);
            s.l_vertical = Some(1.0);
        })
        .unwrap();
        let lai = derived.lai().unwrap();

        let full = cuboid(|s| {
            s.n_leaves = Some(n_leaves);
            s.leaf_radius = Some(leaf_radius);
            s.l_horizontal = Some(l_horizontal);
            s.l_vertical = Some(1.0);
            s.lai = Some(lai);
        })
        .unwrap();

        assert!((full.lai().unwrap() - lai).abs() < 1e-12);
        assert!((lai - PI * 1e-4 * 1000.0).abs() < 1e-12);
    }

    #[test]
    fn test_leaf_radius_and_extent_inverses() {
        let r = cuboid(|s| {
            s.n_leaves = Some(1000);
            s.lai = Some(PI * 0.1);
            s.l_horizontal = Some(10.0);
            s.l_vertical = Some(1.0);
        })
        .unwrap();
        assert!((r.leaf_radius().unwrap() - 0.1).abs() < 1e-12);

        let lh = cuboid(|s| {
            s.n_leaves = Some(1000);
            s.lai = Some(PI * 0.1);
            s.leaf_radius = Some(0.1);
            s.l_vertical = Some(1.0);
        })
        .unwrap();
        assert!((lh.l_horizontal().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_l_vertical_from_hdo_hvr() {
        let params = cuboid(|s| {
            s.lai = Some(3.0);
            s.leaf_radius = Some(0.1);
            s.l_horizontal = Some(30.0);
            s.hdo = Some(0.5);
            s.hvr = Some(0.1);
        })
        .unwrap();
        let expected = 3.0 * 0.125 / (PI * 0.01 * 0.1);
        assert!((params.l_vertical().unwrap() - expected).abs() < 1e-9);
        assert_eq!(params.hdo(), Some(0.5));
    }

    #[test]
    fn test_under_constrained_names_field() {
        // No vertical information at all
        let err = cuboid(|s| {
            s.n_leaves = Some(100);
            s.leaf_radius = Some(0.1);
            s.l_horizontal = Some(10.0);
        })
        .unwrap_err();
        assert!(matches!(err, Error::UnderConstrained { field: "l_vertical" }));
        assert!(err.to_string().contains("likely under-constrained"));

        // Only the radius: n_leaves depends on itself through lai
        let err = cuboid(|s| {
            s.leaf_radius = Some(0.1);
            s.l_vertical = Some(1.0);
        })
        .unwrap_err();
        assert!(matches!(err, Error::UnderConstrained { field: "n_leaves" }));
    }

    #[test]
    fn test_division_artifacts_fail() {
        let err = cuboid(|s| {
            s.n_leaves = Some(0);
            s.lai = Some(1.0);
            s.l_horizontal = Some(10.0);
            s.l_vertical = Some(1.0);
        })
        .unwrap_err();
        assert!(matches!(err, Error::UnderConstrained { field: "leaf_radius" }));
    }

    #[test]
    fn test_over_specification_is_not_checked() {
        let params = cuboid(|s| {
            s.n_leaves = Some(10);
            s.lai = Some(5.0);
            s.leaf_radius = Some(0.1);
            s.l_horizontal = Some(10.0);
            s.l_vertical = Some(1.0);
        })
        .unwrap();
        assert_eq!(params.n_leaves().unwrap(), 10);
        assert_eq!(params.lai().unwrap(), 5.0);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let err = cuboid(|s| {
            s.n_leaves = Some(10);
            s.leaf_radius = Some(-0.1);
            s.l_horizontal = Some(10.0);
            s.l_vertical = Some(1.0);
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_spec_from_json() {
        let spec: CuboidLeafCloudSpec = serde_json::from_value(serde_json::json!({
            "lai": 3.0,
            "leaf_radius": 0.1,
            "l_horizontal": 10.0,
            "l_vertical": 1.0,
            "seed": 42,
        }))
        .unwrap();
        assert_eq!(spec.seed, 42);
        assert_eq!(spec.mu, DEFAULT_MU);
        assert_eq!(spec.id, "leaf_cloud");

        let bad: std::result::Result<CuboidLeafCloudSpec, _> =
            serde_json::from_value(serde_json::json!({"leaf_radiuss": 0.1}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_display_lists_resolved_values() {
        let params = cuboid(|s| {
            s.n_leaves = Some(100);
            s.leaf_radius = Some(0.1);
            s.l_horizontal = Some(10.0);
            s.l_vertical = Some(1.0);
        })
        .unwrap();
        let text = params.to_string();
        assert!(text.starts_with("CuboidLeafCloudParams(id=\"leaf_cloud\""));
        assert!(text.contains("n_leaves=100"));
    }

    #[test]
    fn test_spec_unit_conversion() {
        let spec = CuboidLeafCloudSpec {
            leaf_radius: Some(10.0),
            l_horizontal: Some(1000.0),
            lai: Some(3.0),
            hdo: Some(50.0),
            hvr: Some(0.1),
            ..Default::default()
        };
        let meters = spec.in_meters(&UnitConfig::new(crate::core::LengthUnit::Centimeter));
        assert!((meters.leaf_radius.unwrap() - 0.1).abs() < 1e-12);
        assert!((meters.l_horizontal.unwrap() - 10.0).abs() < 1e-12);
        assert!((meters.hdo.unwrap() - 0.5).abs() < 1e-12);
        // Dimensionless quantities are untouched
        assert_eq!((meters.lai, meters.hvr), (Some(3.0), Some(0.1)));
        assert_eq!(meters.l_vertical, None);
    }

    #[test]
    fn test_sphere_requires_leaf_count_and_radius() {
        let err = SphereLeafCloudParams::new(&SphereLeafCloudSpec {
            leaf_radius: Some(0.1),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::UnderConstrained { field: "n_leaves" }));

        let params = SphereLeafCloudParams::new(&SphereLeafCloudSpec {
            n_leaves: Some(10),
            leaf_radius: Some(0.1),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(params.radius, 1.0);
    }

    #[test]
    fn test_axial_defaults() {
        let err = AxialLeafCloudParams::new(&AxialLeafCloudSpec {
            n_leaves: Some(10),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::UnderConstrained { field: "leaf_radius" }));

        let params = AxialLeafCloudParams::new(&AxialLeafCloudSpec {
            n_leaves: Some(10),
            leaf_radius: Some(0.05),
            ..Default::default()
        })
        .unwrap();
        assert_eq!((params.radius, params.l_vertical), (1.0, 1.0));
    }

    #[test]
    fn test_leaf_count_limit() {
        // Tiny leaves over a wide footprint resolve to ~1e24 leaves
        let err = cuboid(|s| {
            s.lai = Some(3.0);
            s.leaf_radius = Some(1e-9);
            s.l_horizontal = Some(1e3);
            s.l_vertical = Some(1.0);
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        let err = cuboid(|s| {
            s.n_leaves = Some(usize::MAX);
            s.leaf_radius = Some(0.1);
            s.l_horizontal = Some(10.0);
            s.l_vertical = Some(1.0);
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        let err = SphereLeafCloudParams::new(&SphereLeafCloudSpec {
            n_leaves: Some(MAX_N_LEAVES + 1),
            leaf_radius: Some(0.1),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        let err = AxialLeafCloudParams::new(&AxialLeafCloudSpec {
            n_leaves: Some(usize::MAX),
            leaf_radius: Some(0.1),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        assert!(
            AxialLeafCloudParams::new(&AxialLeafCloudSpec {
                n_leaves: Some(MAX_N_LEAVES),
                leaf_radius: Some(0.1),
                ..Default::default()
            })
            .is_ok()
        );
    }
}
