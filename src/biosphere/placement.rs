//! Collision-avoiding leaf placement in a cuboid footprint.
//!
//! Candidates are drawn exactly like `sampling::positions_cuboid`; a
//! candidate is accepted when its radius-inflated box does not overlap any
//! previously placed leaf box. Dense configurations can take a very long
//! time; the per-leaf attempt budget bounds the work for one leaf, not the
//! total.

use rand::Rng;

use crate::core::types::DVec3;
use crate::core::{Error, Result};
use crate::math::{Aabb, AabbTree};

use super::sampling::cuboid_candidate;

/// Default number of candidate draws per leaf
pub const DEFAULT_N_ATTEMPTS: usize = 100_000;

/// Place `n_leaves` leaves whose inflated bounding boxes do not overlap.
///
/// Fails with [`Error::CanopyTooDense`] as soon as one leaf exhausts its
/// `n_attempts` budget. No retry is made at a relaxed density.
pub fn positions_cuboid_avoid_overlap<R: Rng + ?Sized>(
    n_leaves: usize,
    l_horizontal: f64,
    l_vertical: f64,
    leaf_radius: f64,
    n_attempts: usize,
    rng: &mut R,
) -> Result<Vec<DVec3>> {
    let mut positions = Vec::with_capacity(n_leaves);
    let mut tree = AabbTree::with_capacity(n_leaves);
    let mut total_draws = 0usize;

    for leaf in 0..n_leaves {
        let mut placed = false;

        for _ in 0..n_attempts {
            total_draws += 1;
            let candidate = cuboid_candidate(l_horizontal, l_vertical, rng);
            let aabb = Aabb::inflated_point(candidate, leaf_radius);

            if !tree.overlaps_any(&aabb) {
                tree.insert(aabb, leaf);
                positions.push(candidate);
                placed = true;
                break;
            }
        }

        if !placed {
            log::debug!(
                "Collision placement gave up at leaf {}/{} after {} draws",
                leaf, n_leaves, total_draws
            );
            return Err(Error::CanopyTooDense { leaf, attempts: n_attempts });
        }
    }

    log::debug!(
        "Placed {} non-overlapping leaves in {} draws (tree height {})",
        n_leaves, total_draws, tree.height()
    );

    Ok(positions)
}
