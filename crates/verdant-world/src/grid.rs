//! Neighborhood helpers over the lattice.
//!
//! Placement scans deliberately clip to the grid bounds instead of wrapping:
//! seeds and offspring never cross the toroidal seam.

use rand::Rng;
use verdant_core::Coordinate;

/// All lattice points within a square `radius` of `center`, excluding the
/// center itself, clipped to `[0, size]` on both axes.
pub fn neighbors_in_radius(center: Coordinate, radius: i32, size: i32) -> Vec<Coordinate> {
    let mut neighbors = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx == 0 && dy == 0 {
                continue;
            }
            let candidate = center.offset(dx, dy);
            if candidate.in_bounds(size) {
                neighbors.push(candidate);
            }
        }
    }
    neighbors
}

/// Sample up to `count` distinct neighbors of `center` that satisfy
/// `is_free`.
///
/// Retries are bounded: a fully occupied neighborhood yields fewer than
/// `count` results (possibly none) instead of looping forever. Callers treat
/// a shortfall as "no placement this step".
pub fn sample_distinct_neighbors<R: Rng>(
    rng: &mut R,
    center: Coordinate,
    count: usize,
    radius: i32,
    size: i32,
    mut is_free: impl FnMut(Coordinate) -> bool,
) -> Vec<Coordinate> {
    let candidates = neighbors_in_radius(center, radius, size);
    if candidates.is_empty() || count == 0 {
        return Vec::new();
    }

    let max_attempts = candidates.len() * 4;
    let mut picked: Vec<Coordinate> = Vec::with_capacity(count);
    for _ in 0..max_attempts {
        if picked.len() == count {
            break;
        }
        let candidate = candidates[rng.gen_range(0..candidates.len())];
        if picked.contains(&candidate) {
            continue;
        }
        if is_free(candidate) {
            picked.push(candidate);
        }
    }
    picked
}
