//! Random leaf placement and orientation samplers.
//!
//! Every sampler draws from the caller's generator in a fixed order (three
//! uniform draws per leaf, leaf by leaf) so that a seed fully determines the
//! output. Lengths are in whatever unit the caller uses; generators pass
//! metres.
//!
//! The sphere and cylinder samplers draw the radius uniformly, which is not
//! uniform in volume (sphere) or area (cylinder cross-section). This is the
//! reference distribution and is kept as-is.

use std::f64::consts::PI;

use rand::Rng;

use crate::core::types::DVec3;

/// Uniform draws over `[-l_h/2, l_h/2]² × [0, l_v]`
pub fn positions_cuboid<R: Rng + ?Sized>(
    n_leaves: usize,
    l_horizontal: f64,
    l_vertical: f64,
    rng: &mut R,
) -> Vec<DVec3> {
    (0..n_leaves)
        .map(|_| cuboid_candidate(l_horizontal, l_vertical, rng))
        .collect()
}

/// One uniform point in the cuboid footprint (three draws: x, y, z)
pub(crate) fn cuboid_candidate<R: Rng + ?Sized>(
    l_horizontal: f64,
    l_vertical: f64,
    rng: &mut R,
) -> DVec3 {
    let u: [f64; 3] = [rng.random(), rng.random(), rng.random()];
    DVec3::new(
        u[0] * l_horizontal - 0.5 * l_horizontal,
        u[1] * l_horizontal - 0.5 * l_horizontal,
        u[2] * l_vertical,
    )
}

/// Points inside a sphere of given radius centered on the origin.
///
/// θ, φ and r are drawn uniformly (r = u·R, not R·u^(1/3)).
pub fn positions_sphere<R: Rng + ?Sized>(n_leaves: usize, radius: f64, rng: &mut R) -> Vec<DVec3> {
    (0..n_leaves)
        .map(|_| {
            let u: [f64; 3] = [rng.random(), rng.random(), rng.random()];
            let theta = u[0] * PI;
            let phi = u[1] * 2.0 * PI;
            let r = u[2] * radius;
            DVec3::new(
                r * theta.sin() * phi.cos(),
                r * theta.sin() * phi.sin(),
                r * theta.cos(),
            )
        })
        .collect()
}

/// Points inside a vertical cylinder standing on the origin
pub fn positions_cylinder<R: Rng + ?Sized>(
    n_leaves: usize,
    radius: f64,
    l_vertical: f64,
    rng: &mut R,
) -> Vec<DVec3> {
    (0..n_leaves)
        .map(|_| {
            let u: [f64; 3] = [rng.random(), rng.random(), rng.random()];
            let phi = u[0] * 2.0 * PI;
            let r = u[1] * radius;
            let z = u[2] * l_vertical;
            DVec3::new(r * phi.cos(), r * phi.sin(), z)
        })
        .collect()
}

/// Points uniformly distributed in a right cone: base of given radius at
/// z = 0, tip at z = l_vertical.
pub fn positions_cone<R: Rng + ?Sized>(
    n_leaves: usize,
    radius: f64,
    l_vertical: f64,
    rng: &mut R,
) -> Vec<DVec3> {
    (0..n_leaves)
        .map(|_| {
            let u: [f64; 3] = [rng.random(), rng.random(), rng.random()];
            // h is the distance from the tip
            let h = l_vertical * u[0].cbrt();
            let r = radius / l_vertical * h * u[1].sqrt();
            let phi = u[2] * 2.0 * PI;
            DVec3::new(r * phi.cos(), r * phi.sin(), l_vertical - h)
        })
        .collect()
}

/// Approximate inverse beta distribution draw (Ross, Monte Carlo Methods,
/// appendix 1).
///
/// Rejection loop: terminates with probability 1, but the number of trials
/// is unbounded in the worst case.
pub fn inverse_beta<R: Rng + ?Sized>(mu: f64, nu: f64, rng: &mut R) -> f64 {
    loop {
        let s1 = rng.random::<f64>().powf(1.0 / mu);
        let s2 = rng.random::<f64>().powf(1.0 / nu);
        let s = s1 + s2;
        if s <= 1.0 {
            return s1 / s;
        }
    }
}

/// Leaf normals from the inverse beta inclination model.
///
/// The inclination is the inverse beta value converted to degrees and the
/// azimuth a uniform draw in [0, 360); both are then passed straight to the
/// trigonometric functions, exactly as the reference datasets were produced.
/// Every output vector has unit length.
pub fn orientations<R: Rng + ?Sized>(n_leaves: usize, mu: f64, nu: f64, rng: &mut R) -> Vec<DVec3> {
    (0..n_leaves)
        .map(|_| {
            let theta = inverse_beta(mu, nu, rng).to_degrees();
            let phi = rng.random::<f64>() * 360.0;
            DVec3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            )
        })
        .collect()
}

/// Uniform leaf radii
pub fn radii(n_leaves: usize, leaf_radius: f64) -> Vec<f64> {
    vec![leaf_radius; n_leaves]
}
