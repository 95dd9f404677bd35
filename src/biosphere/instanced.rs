//! Canopy elements placed at several locations without duplicating geometry

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::core::types::DVec3;
use crate::core::{Error, KernelDictContext, Result, UnitConfig};
use crate::math::transform::{mat4_to_value, translate};
use crate::scene::SceneDict;

use super::args::{self, Dict};
use super::element::CanopyElement;
use super::io;

/// A canopy element and the positions of its instances.
///
/// The element's shapes are emitted once as a shape group; each instance
/// refers to the group by id and only carries a translation. Both fields are
/// public: callers may adjust `instance_positions` after construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstancedCanopyElement {
    pub canopy_element: CanopyElement,
    /// Instance offsets in metres
    pub instance_positions: Vec<DVec3>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct InstancedArgs {
    canopy_element: Option<Dict>,
    instance_positions: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct InstancedFileArgs {
    filename: Option<PathBuf>,
    canopy_element: Option<Dict>,
}

fn element_from_dict(dict: Option<Dict>, units: &UnitConfig) -> Result<CanopyElement> {
    match dict {
        Some(dict) => CanopyElement::from_dict(dict, units),
        None => Ok(CanopyElement::default()),
    }
}

impl InstancedCanopyElement {
    pub fn new(canopy_element: impl Into<CanopyElement>, instance_positions: Vec<DVec3>) -> Self {
        Self {
            canopy_element: canopy_element.into(),
            instance_positions,
        }
    }

    /// Read instance positions (metres) from a three-column text file
    pub fn from_file(path: &Path, canopy_element: impl Into<CanopyElement>) -> Result<Self> {
        Ok(Self::new(canopy_element, io::read_instance_positions(path)?))
    }

    /// Construct from keyword arguments.
    ///
    /// `construct` may be `from_file` (keys `filename`, `canopy_element`) or
    /// absent (keys `canopy_element`, `instance_positions`). A missing
    /// `canopy_element` yields an empty leaf cloud.
    pub fn from_dict(mut dict: Dict, units: &UnitConfig) -> Result<Self> {
        let construct = args::take_tag(&mut dict, "construct")?;
        match construct.as_deref() {
            Some("from_file") => {
                let file_args: InstancedFileArgs = args::parse_args("from_file", dict)?;
                let path = file_args.filename.ok_or_else(|| {
                    Error::InvalidParameter("parameter 'filename' is required".to_string())
                })?;
                // Check the file before building a possibly expensive element
                if !path.is_file() {
                    return Err(Error::FileNotFound(path));
                }
                Self::from_file(&path, element_from_dict(file_args.canopy_element, units)?)
            }
            None => {
                let direct: InstancedArgs = args::parse_args("instanced_canopy_element", dict)?;
                let positions = args::vec3_rows("instance_positions", &direct.instance_positions)?
                    .into_iter()
                    .map(|p| p * units.length_to_meters(1.0))
                    .collect();
                Ok(Self::new(
                    element_from_dict(direct.canopy_element, units)?,
                    positions,
                ))
            }
            Some(other) => Err(Error::UnsupportedValue {
                key: "construct",
                value: other.to_string(),
            }),
        }
    }

    pub fn n_instances(&self) -> usize {
        self.instance_positions.len()
    }

    pub fn bsdfs(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        self.canopy_element.bsdfs(ctx)
    }

    /// The element's shapes wrapped in a single shape group named after it
    pub fn shapes(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        let mut group = Map::new();
        group.insert("type".to_string(), json!("shapegroup"));
        group.extend(self.canopy_element.shapes(ctx)?.into_map());

        let mut dict = SceneDict::new();
        dict.insert(self.canopy_element.id(), Value::Object(group))?;
        Ok(dict)
    }

    /// One instance record per position, referring to the shape group
    pub fn instances(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        let id = self.canopy_element.id();
        let k = ctx.kernel_length(1.0);

        let mut dict = SceneDict::new();
        for (i, position) in self.instance_positions.iter().enumerate() {
            dict.insert(
                format!("{id}_instance_{i}"),
                json!({
                    "type": "instance",
                    "group": {"type": "ref", "id": id},
                    "to_world": mat4_to_value(&translate(*position * k)),
                }),
            )?;
        }
        Ok(dict)
    }

    pub fn kernel_dict(&self, ctx: &KernelDictContext) -> Result<SceneDict> {
        self.bsdfs(ctx)?
            .merged(self.shapes(ctx)?)?
            .merged(self.instances(ctx)?)
    }
}
