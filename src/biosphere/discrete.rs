//! Discrete canopies: instanced canopy elements over a rectangular unit cell.
//!
//! A canopy can be padded with copies of itself laid out on a
//! `(2p + 1) × (2p + 1)` lattice centered on the original cell, which
//! reduces edge effects in simulations. Padding only multiplies instance
//! records; the element geometry is emitted once.

use std::borrow::Cow;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::core::types::{DVec2, DVec3};
use crate::core::{Error, KernelDictContext, Result, UnitConfig};
use crate::scene::{SceneDict, Spectrum};

use super::args::{self, Dict};
use super::instanced::InstancedCanopyElement;
use super::leaf_cloud::LeafCloud;
use super::params::{CuboidLeafCloudParams, CuboidLeafCloudSpec};

/// Default id of canopies built by [`DiscreteCanopy::homogeneous`]
pub const DEFAULT_HOMOGENEOUS_ID: &str = "homogeneous_discrete_canopy";
/// Default id of every other canopy
pub const DEFAULT_CANOPY_ID: &str = "discrete_canopy";
/// Largest instance count a padded element may reach
pub const MAX_N_INSTANCES: usize = 100_000_000;

/// One file-defined leaf cloud and its instances
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeafCloudFileRecord {
    /// Part of the leaf cloud id; required when several records are given
    #[serde(default)]
    pub sub_id: Option<String>,
    /// Three-column instance position file
    pub instance_filename: PathBuf,
    /// Seven-column leaf file
    pub leaf_cloud_filename: PathBuf,
    #[serde(default)]
    pub leaf_reflectance: Spectrum,
    #[serde(default)]
    pub leaf_transmittance: Spectrum,
}

impl LeafCloudFileRecord {
    pub fn new(instance_filename: impl Into<PathBuf>, leaf_cloud_filename: impl Into<PathBuf>) -> Self {
        Self {
            sub_id: None,
            instance_filename: instance_filename.into(),
            leaf_cloud_filename: leaf_cloud_filename.into(),
            leaf_reflectance: Spectrum::default(),
            leaf_transmittance: Spectrum::default(),
        }
    }

    pub fn with_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_id = Some(sub_id.into());
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Dict),
    Many(Vec<Dict>),
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CanopyArgs {
    id: String,
    size: Option<[f64; 3]>,
    instanced_canopy_elements: Option<OneOrMany>,
}

impl Default for CanopyArgs {
    fn default() -> Self {
        Self {
            id: DEFAULT_CANOPY_ID.to_string(),
            size: None,
            instanced_canopy_elements: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FromFilesArgs {
    id: String,
    size: Option<[f64; 3]>,
    leaf_cloud_dicts: Option<Vec<LeafCloudFileRecord>>,
}

impl Default for FromFilesArgs {
    fn default() -> Self {
        Self {
            id: DEFAULT_CANOPY_ID.to_string(),
            size: None,
            leaf_cloud_dicts: None,
        }
    }
}

fn required<T>(name: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| Error::InvalidParameter(format!("parameter '{name}' is required")))
}

/// A canopy made of instanced canopy elements
#[derive(Clone, Debug, PartialEq)]
pub struct DiscreteCanopy {
    id: String,
    size: DVec3,
    instanced_canopy_elements: Vec<InstancedCanopyElement>,
}

impl DiscreteCanopy {
    /// `size` is the unit cell extent in metres (x, y) and the canopy
    /// height (z).
    pub fn new(
        id: impl Into<String>,
        size: DVec3,
        instanced_canopy_elements: Vec<InstancedCanopyElement>,
    ) -> Self {
        Self {
            id: id.into(),
            size,
            instanced_canopy_elements,
        }
    }

    /// A single cuboid leaf cloud instanced once at the origin.
    ///
    /// The leaf cloud id is `<id>_leaf_cloud`, whatever `spec.id` says. The
    /// canopy size is `(l_horizontal, l_horizontal, l_vertical)`.
    pub fn homogeneous(
        id: impl Into<String>,
        spec: &CuboidLeafCloudSpec,
        units: &UnitConfig,
    ) -> Result<Self> {
        let id = id.into();
        let spec = CuboidLeafCloudSpec {
            id: format!("{id}_leaf_cloud"),
            ..spec.clone()
        };

        let params = CuboidLeafCloudParams::new(&spec.in_meters(units))?;
        let l_horizontal = params.l_horizontal()?;
        let size = DVec3::new(l_horizontal, l_horizontal, params.l_vertical()?);

        let leaf_cloud = LeafCloud::cuboid(&spec, units)?;
        log::debug!(
            "Built homogeneous canopy '{}' ({} leaves, size {:?} m)",
            id,
            leaf_cloud.n_leaves(),
            size
        );

        Ok(Self::new(
            id,
            size,
            vec![InstancedCanopyElement::new(leaf_cloud, vec![DVec3::ZERO])],
        ))
    }

    /// One instanced leaf cloud per record, leaves and instances read from
    /// text files.
    ///
    /// Leaf cloud ids are `<id>_<sub_id>_leaf_cloud`, or `<id>_leaf_cloud`
    /// for a single record without `sub_id`. `size` is in config units.
    pub fn leaf_cloud_from_files(
        id: impl Into<String>,
        size: DVec3,
        records: &[LeafCloudFileRecord],
        units: &UnitConfig,
    ) -> Result<Self> {
        let id = id.into();
        let mut elements = Vec::with_capacity(records.len());

        for record in records {
            let leaf_cloud_id = match &record.sub_id {
                Some(sub_id) => format!("{id}_{sub_id}_leaf_cloud"),
                // Without sub_ids every record would claim the same id
                None if records.len() > 1 => {
                    return Err(Error::KeyCollision(format!("{id}_leaf_cloud")));
                }
                None => format!("{id}_leaf_cloud"),
            };

            let leaf_cloud = LeafCloud::from_file(
                leaf_cloud_id,
                &record.leaf_cloud_filename,
                record.leaf_reflectance.clone(),
                record.leaf_transmittance.clone(),
            )?;
            elements.push(InstancedCanopyElement::from_file(
                &record.instance_filename,
                leaf_cloud,
            )?);
        }

        Ok(Self::new(id, size * units.length_to_meters(1.0), elements))
    }

    /// Construct from keyword arguments.
    ///
    /// `construct` selects `homogeneous`, `leaf_cloud_from_files` or, when
    /// absent, the direct constructor (`id`, `size`,
    /// `instanced_canopy_elements`). An optional `padding` is applied to the
    /// result; an optional `type` must be `discrete_canopy`.
    pub fn from_dict(mut dict: Dict, units: &UnitConfig) -> Result<Self> {
        let padding = match dict.remove("padding") {
            None | Some(Value::Null) => 0,
            Some(value) => value.as_i64().ok_or_else(|| {
                Error::InvalidParameter(format!("padding must be an integer, got {value}"))
            })?,
        };

        if let Some(kind) = args::take_tag(&mut dict, "type")? {
            if kind != "discrete_canopy" {
                return Err(Error::UnsupportedValue { key: "type", value: kind });
            }
        }

        let construct = args::take_tag(&mut dict, "construct")?;
        let canopy = match construct.as_deref() {
            Some("homogeneous") => {
                let id = match dict.remove("id") {
                    None => DEFAULT_HOMOGENEOUS_ID.to_string(),
                    Some(Value::String(id)) => id,
                    Some(other) => {
                        return Err(Error::InvalidParameter(format!(
                            "id must be a string, got {other}"
                        )));
                    }
                };
                let spec: CuboidLeafCloudSpec = args::parse_args("homogeneous", dict)?;
                Self::homogeneous(id, &spec, units)?
            }
            Some("leaf_cloud_from_files") => {
                let files: FromFilesArgs = args::parse_args("leaf_cloud_from_files", dict)?;
                let size = required("size", files.size)?;
                let records = required("leaf_cloud_dicts", files.leaf_cloud_dicts)?;
                Self::leaf_cloud_from_files(files.id, DVec3::from_array(size), &records, units)?
            }
            None => {
                let direct: CanopyArgs = args::parse_args("discrete_canopy", dict)?;
                let size = required("size", direct.size)?;
                let element_dicts = match direct.instanced_canopy_elements {
                    None => Vec::new(),
                    Some(OneOrMany::One(dict)) => vec![dict],
                    Some(OneOrMany::Many(dicts)) => dicts,
                };
                let elements = element_dicts
                    .into_iter()
                    .map(|d| InstancedCanopyElement::from_dict(d, units))
                    .collect::<Result<Vec<_>>>()?;
                Self::new(
                    direct.id,
                    DVec3::from_array(size) * units.length_to_meters(1.0),
                    elements,
                )
            }
            Some(other) => {
                return Err(Error::UnsupportedValue {
                    key: "construct",
                    value: other.to_string(),
                });
            }
        };

        Ok(canopy.padded(padding)?.into_owned())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Unit cell size in metres
    pub fn size(&self) -> DVec3 {
        self.size
    }

    pub fn instanced_canopy_elements(&self) -> &[InstancedCanopyElement] {
        &self.instanced_canopy_elements
    }

    /// Mutable access to the instanced elements
    pub fn instanced_canopy_elements_mut(&mut self) -> &mut Vec<InstancedCanopyElement> {
        &mut self.instanced_canopy_elements
    }

    /// Ground rectangle `[-x/2, x/2] × [-y/2, y/2]` covered by the unit cell,
    /// as (min, max) corners in metres
    pub fn footprint(&self) -> (DVec2, DVec2) {
        let half = self.size.truncate() * 0.5;
        (-half, half)
    }

    /// Copy of self surrounded by `padding` rings of clones.
    ///
    /// Every instanced element gets `(2p + 1)²` copies of its instance
    /// positions, offset by `(i · size_x, j · size_y, 0)` for `i` then `j`
    /// in `-p..=p`; the horizontal size grows by the same factor. Padding by
    /// zero borrows `self` unchanged.
    pub fn padded(&self, padding: i64) -> Result<Cow<'_, Self>> {
        if padding < 0 {
            return Err(Error::InvalidPadding(padding));
        }
        if padding == 0 {
            return Ok(Cow::Borrowed(self));
        }

        let copies = padding
            .checked_mul(2)
            .and_then(|side| side.checked_add(1))
            .and_then(|side| side.checked_mul(side))
            .and_then(|copies| usize::try_from(copies).ok());
        let too_many = || {
            Error::InvalidParameter(format!(
                "padding {padding} yields more than {MAX_N_INSTANCES} instances"
            ))
        };
        let copies = copies.filter(|c| *c <= MAX_N_INSTANCES).ok_or_else(too_many)?;
        for element in &self.instanced_canopy_elements {
            match copies.checked_mul(element.n_instances()) {
                Some(n) if n <= MAX_N_INSTANCES => {}
                _ => return Err(too_many()),
            }
        }

        let factors: Vec<f64> = (-padding..=padding).map(|f| f as f64).collect();
        let (size_x, size_y) = (self.size.x, self.size.y);
        let offsets: Vec<DVec3> = factors
            .iter()
            .flat_map(|fx| {
                factors
                    .iter()
                    .map(move |fy| DVec3::new(fx * size_x, fy * size_y, 0.0))
            })
            .collect();

        let mut result = self.clone();
        for element in &mut result.instanced_canopy_elements {
            let cell = std::mem::take(&mut element.instance_positions);
            element.instance_positions = offsets
                .iter()
                .flat_map(|offset| cell.iter().map(move |p| *p + *offset))
                .collect();
        }

        let n = factors.len() as f64;
        result.size.x *= n;
        result.size.y *= n;

        log::debug!(
            "Padded canopy '{}' by {} ({} copies per instance)",
            self.id,
            padding,
            offsets.len()
        );
        Ok(Cow::Owned(result))
    }

    pub fn bsdfs(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        let mut dict = SceneDict::new();
        for element in &self.instanced_canopy_elements {
            dict.merge(element.bsdfs(ctx)?)?;
        }
        Ok(dict)
    }

    pub fn shapes(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        let mut dict = SceneDict::new();
        for element in &self.instanced_canopy_elements {
            dict.merge(element.shapes(ctx)?)?;
        }
        Ok(dict)
    }

    pub fn instances(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        let mut dict = SceneDict::new();
        for element in &self.instanced_canopy_elements {
            dict.merge(element.instances(ctx)?)?;
        }
        Ok(dict)
    }

    /// BSDFs, shape groups and instances of every element, element by element.
    ///
    /// Shape groups can only refer to BSDFs by id, so `ctx.ref_bsdfs` must
    /// be set.
    pub fn kernel_dict(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        if !ctx.ref_bsdfs {
            return Err(Error::InvalidParameter(
                "discrete canopies require 'ref' to be enabled in the kernel dict context"
                    .to_string(),
            ));
        }

        let mut dict = SceneDict::new();
        for element in &self.instanced_canopy_elements {
            dict.merge(element.kernel_dict(ctx)?)?;
        }
        Ok(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LengthUnit;
    use serde_json::json;
    use tempfile::TempDir;

    fn dict(value: Value) -> Dict {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn spec() -> CuboidLeafCloudSpec {
        CuboidLeafCloudSpec {
            lai: Some(3.0),
            leaf_radius: Some(0.1),
            l_horizontal: Some(2.0),
            l_vertical: Some(1.0),
            ..Default::default()
        }
    }

    fn write_files(dir: &TempDir, name: &str) -> LeafCloudFileRecord {
        let leaves = dir.path().join(format!("{name}_leaves.txt"));
        let instances = dir.path().join(format!("{name}_instances.txt"));
        std::fs::write(&leaves, "0.1 0 0 0.5 0 0 1\n0.1 0.5 0 0.5 0 1 0\n").unwrap();
        std::fs::write(&instances, "0 0 0\n3 0 0\n0 3 0\n").unwrap();
        LeafCloudFileRecord::new(instances, leaves)
    }

    #[test]
    fn test_homogeneous() {
        let canopy =
            DiscreteCanopy::homogeneous(DEFAULT_HOMOGENEOUS_ID, &spec(), &UnitConfig::default())
                .unwrap();
        assert_eq!(canopy.size(), DVec3::new(2.0, 2.0, 1.0));
        assert_eq!(canopy.instanced_canopy_elements().len(), 1);

        let element = &canopy.instanced_canopy_elements()[0];
        assert_eq!(element.instance_positions, vec![DVec3::ZERO]);
        assert_eq!(
            element.canopy_element.id(),
            "homogeneous_discrete_canopy_leaf_cloud"
        );
    }

    #[test]
    fn test_homogeneous_size_in_meters() {
        let spec = CuboidLeafCloudSpec {
            n_leaves: Some(10),
            leaf_radius: Some(10.0),
            l_horizontal: Some(200.0),
            l_vertical: Some(100.0),
            ..Default::default()
        };
        let canopy =
            DiscreteCanopy::homogeneous("c", &spec, &UnitConfig::new(LengthUnit::Centimeter))
                .unwrap();
        assert!((canopy.size() - DVec3::new(2.0, 2.0, 1.0)).abs().max_element() < 1e-12);
    }

    #[test]
    fn test_padding_counts_and_size() {
        let dir = TempDir::new().unwrap();
        let record = write_files(&dir, "a");
        let canopy = DiscreteCanopy::leaf_cloud_from_files(
            "canopy",
            DVec3::new(10.0, 20.0, 5.0),
            &[record],
            &UnitConfig::default(),
        )
        .unwrap();

        let padded = canopy.padded(1).unwrap();
        assert!(matches!(padded, Cow::Owned(_)));
        assert_eq!(padded.size(), DVec3::new(30.0, 60.0, 5.0));
        assert_eq!(padded.instanced_canopy_elements()[0].n_instances(), 27);

        let padded = canopy.padded(2).unwrap();
        assert_eq!(padded.instanced_canopy_elements()[0].n_instances(), 75);
        assert_eq!(padded.size(), DVec3::new(50.0, 100.0, 5.0));

        // Original untouched
        assert_eq!(canopy.instanced_canopy_elements()[0].n_instances(), 3);
        assert_eq!(canopy.size(), DVec3::new(10.0, 20.0, 5.0));
    }

    #[test]
    fn test_padding_offset_order() {
        let element = InstancedCanopyElement::new(LeafCloud::default(), vec![DVec3::ZERO, DVec3::Z]);
        let canopy = DiscreteCanopy::new("c", DVec3::new(1.0, 2.0, 3.0), vec![element]);

        let padded = canopy.padded(1).unwrap();
        let positions = &padded.instanced_canopy_elements()[0].instance_positions;
        assert_eq!(positions.len(), 18);
        // x outer, y inner; each block holds the full original set
        assert_eq!(positions[0], DVec3::new(-1.0, -2.0, 0.0));
        assert_eq!(positions[1], DVec3::new(-1.0, -2.0, 1.0));
        assert_eq!(positions[2], DVec3::new(-1.0, 0.0, 0.0));
        assert_eq!(positions[8], DVec3::new(0.0, 0.0, 0.0));
        assert_eq!(positions[17], DVec3::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn test_padding_zero_and_negative() {
        let canopy =
            DiscreteCanopy::homogeneous("c", &spec(), &UnitConfig::default()).unwrap();

        let same = canopy.padded(0).unwrap();
        assert!(matches!(same, Cow::Borrowed(_)));
        assert_eq!(*same, canopy);

        let err = canopy.padded(-1).unwrap_err();
        assert!(matches!(err, Error::InvalidPadding(-1)));
    }

    #[test]
    fn test_padding_limit() {
        let element = InstancedCanopyElement::new(LeafCloud::default(), vec![DVec3::ZERO; 1000]);
        let canopy = DiscreteCanopy::new("c", DVec3::ONE, vec![element]);

        for padding in [i64::MAX, i64::MAX / 2, 1 << 32, 1000] {
            let err = canopy.padded(padding).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)), "padding {padding}");
        }

        let padded = canopy.padded(3).unwrap();
        assert_eq!(padded.instanced_canopy_elements()[0].n_instances(), 49 * 1000);
    }

    #[test]
    fn test_leaf_cloud_from_files_ids() {
        let dir = TempDir::new().unwrap();
        let units = UnitConfig::default();
        let size = DVec3::new(3.0, 3.0, 1.0);

        let single =
            DiscreteCanopy::leaf_cloud_from_files("canopy", size, &[write_files(&dir, "a")], &units)
                .unwrap();
        let element = &single.instanced_canopy_elements()[0];
        assert_eq!(element.canopy_element.id(), "canopy_leaf_cloud");
        assert_eq!(element.n_instances(), 3);

        let records = [write_files(&dir, "a"), write_files(&dir, "b")];
        let err = DiscreteCanopy::leaf_cloud_from_files("canopy", size, &records, &units)
            .unwrap_err();
        assert!(matches!(&err, Error::KeyCollision(id) if id == "canopy_leaf_cloud"));

        let records = [
            write_files(&dir, "a").with_sub_id("oak"),
            write_files(&dir, "b").with_sub_id("pine"),
        ];
        let canopy =
            DiscreteCanopy::leaf_cloud_from_files("canopy", size, &records, &units).unwrap();
        let ids: Vec<&str> = canopy
            .instanced_canopy_elements()
            .iter()
            .map(|e| e.canopy_element.id())
            .collect();
        assert_eq!(ids, vec!["canopy_oak_leaf_cloud", "canopy_pine_leaf_cloud"]);
    }

    #[test]
    fn test_missing_files() {
        let dir = TempDir::new().unwrap();
        let record = LeafCloudFileRecord::new(dir.path().join("i.txt"), dir.path().join("l.txt"));
        let err = DiscreteCanopy::leaf_cloud_from_files(
            "c",
            DVec3::ONE,
            &[record],
            &UnitConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_kernel_dict() {
        let canopy =
            DiscreteCanopy::homogeneous("c", &spec(), &UnitConfig::default()).unwrap();
        let padded = canopy.padded(1).unwrap();

        let dict = padded.kernel_dict(&KernelDictContext::default()).unwrap();
        let keys: Vec<&str> = dict.keys().collect();
        assert_eq!(keys[0], "bsdf_c_leaf_cloud");
        assert_eq!(keys[1], "c_leaf_cloud");
        assert_eq!(keys.len(), 2 + 9);
        assert_eq!(dict.get("c_leaf_cloud").unwrap()["type"], "shapegroup");
        assert!(dict.contains_key("c_leaf_cloud_instance_8"));

        assert_eq!(padded.bsdfs(&KernelDictContext::default()).unwrap().len(), 1);
        assert_eq!(padded.shapes(&KernelDictContext::default()).unwrap().len(), 1);
        assert_eq!(padded.instances(&KernelDictContext::default()).unwrap().len(), 9);

        let err = canopy.kernel_dict(&KernelDictContext::inline()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_duplicate_element_ids_collide() {
        let element = InstancedCanopyElement::new(LeafCloud::default(), vec![DVec3::ZERO]);
        let canopy = DiscreteCanopy::new("c", DVec3::ONE, vec![element.clone(), element]);
        let err = canopy.kernel_dict(&KernelDictContext::default()).unwrap_err();
        assert!(matches!(err, Error::KeyCollision(_)));
    }

    #[test]
    fn test_footprint() {
        let canopy = DiscreteCanopy::new("c", DVec3::new(4.0, 6.0, 1.0), Vec::new());
        let (min, max) = canopy.footprint();
        assert_eq!(min, DVec2::new(-2.0, -3.0));
        assert_eq!(max, DVec2::new(2.0, 3.0));
    }

    #[test]
    fn test_from_dict_homogeneous_padded() {
        let canopy = DiscreteCanopy::from_dict(
            dict(json!({
                "type": "discrete_canopy",
                "construct": "homogeneous",
                "lai": 3.0,
                "leaf_radius": 0.1,
                "l_horizontal": 2.0,
                "l_vertical": 1.0,
                "padding": 2,
            })),
            &UnitConfig::default(),
        )
        .unwrap();
        assert_eq!(canopy.id(), DEFAULT_HOMOGENEOUS_ID);
        assert_eq!(canopy.size(), DVec3::new(10.0, 10.0, 1.0));
        assert_eq!(canopy.instanced_canopy_elements()[0].n_instances(), 25);
    }

    #[test]
    fn test_from_dict_leaf_cloud_from_files() {
        let dir = TempDir::new().unwrap();
        let record = write_files(&dir, "a");
        let canopy = DiscreteCanopy::from_dict(
            dict(json!({
                "construct": "leaf_cloud_from_files",
                "id": "files",
                "size": [3.0, 3.0, 1.0],
                "leaf_cloud_dicts": [{
                    "instance_filename": record.instance_filename,
                    "leaf_cloud_filename": record.leaf_cloud_filename,
                    "leaf_reflectance": 0.4,
                }],
            })),
            &UnitConfig::default(),
        )
        .unwrap();
        assert_eq!(canopy.id(), "files");
        assert_eq!(canopy.instanced_canopy_elements()[0].n_instances(), 3);

        let err = DiscreteCanopy::from_dict(
            dict(json!({"construct": "leaf_cloud_from_files", "leaf_cloud_dicts": []})),
            &UnitConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn test_from_dict_direct() {
        let canopy = DiscreteCanopy::from_dict(
            dict(json!({
                "size": [1.0, 1.0, 1.0],
                "instanced_canopy_elements": {
                    "canopy_element": {
                        "type": "abstract_tree",
                        "leaf_cloud": {"construct": "sphere", "n_leaves": 4, "leaf_radius": 0.1},
                    },
                    "instance_positions": [[0, 0, 0]],
                },
            })),
            &UnitConfig::default(),
        )
        .unwrap();
        assert_eq!(canopy.id(), DEFAULT_CANOPY_ID);
        assert_eq!(canopy.instanced_canopy_elements().len(), 1);
    }

    #[test]
    fn test_from_dict_errors() {
        let units = UnitConfig::default();

        let err = DiscreteCanopy::from_dict(dict(json!({"construct": "random"})), &units)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedValue { key: "construct", .. }));

        let err = DiscreteCanopy::from_dict(dict(json!({"type": "homogeneous_canopy"})), &units)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedValue { key: "type", .. }));

        let err = DiscreteCanopy::from_dict(
            dict(json!({"size": [1.0, 1.0, 1.0], "padding": -1})),
            &units,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidPadding(-1)));

        let err = DiscreteCanopy::from_dict(
            dict(json!({
                "construct": "homogeneous",
                "n_leaves": 1000,
                "leaf_radius": 1.0,
                "l_horizontal": 1.0,
                "l_vertical": 1.0,
                "avoid_overlap": true,
                "n_attempts": 100,
            })),
            &units,
        )
        .unwrap_err();
        assert!(matches!(err, Error::CanopyTooDense { .. }));
    }
}
