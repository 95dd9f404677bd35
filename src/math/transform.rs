//! Affine transforms emitted into kernel scene dictionaries

use serde_json::{json, Value};

use crate::core::types::{DMat4, DVec3};

/// Orthonormal tangent pair for a unit normal.
///
/// Branchless construction (Duff et al. 2017). The input must be normalized.
pub fn coordinate_system(n: DVec3) -> (DVec3, DVec3) {
    let sign = 1.0_f64.copysign(n.z);
    let a = -1.0 / (sign + n.z);
    let b = n.x * n.y * a;

    let s = DVec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
    let t = DVec3::new(b, sign + n.y * n.y * a, -n.y);
    (s, t)
}

/// Frame placed at `origin` whose local +Z axis points towards `target`
pub fn look_at(origin: DVec3, target: DVec3, up: DVec3) -> DMat4 {
    let dir = (target - origin).normalize();
    let left = up.cross(dir).normalize();
    let new_up = dir.cross(left);

    DMat4::from_cols(
        left.extend(0.0),
        new_up.extend(0.0),
        dir.extend(0.0),
        origin.extend(1.0),
    )
}

/// Transform mapping the unit disk onto a leaf of given center, normal and radius
///
/// Returns `None` if `normal` has zero length.
pub fn disk_to_world(position: DVec3, normal: DVec3, radius: f64) -> Option<DMat4> {
    let normal = normal.try_normalize()?;
    let (_, up) = coordinate_system(normal);
    Some(look_at(position, position + normal, up) * scale(radius))
}

/// Uniform scale
pub fn scale(factor: f64) -> DMat4 {
    DMat4::from_scale(DVec3::splat(factor))
}

/// Translation
pub fn translate(offset: DVec3) -> DMat4 {
    DMat4::from_translation(offset)
}

/// Row-major nested arrays, the layout expected by the kernel
pub fn mat4_to_value(m: &DMat4) -> Value {
    json!([
        m.row(0).to_array(),
        m.row(1).to_array(),
        m.row(2).to_array(),
        m.row(3).to_array(),
    ])
}
