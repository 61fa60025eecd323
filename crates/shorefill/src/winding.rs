//! Polygon orientation: winding detection and per-category
//! normalization so water is consistently on one canonical side.
//!
//! Screen space is y-down, so a polygon traversed clockwise *visually*
//! has non-negative shoelace area under the accumulation used here.

use tracing::debug;

use crate::types::{Chain, Point};

/// Shoelace winding test for a closed point sequence.
///
/// Returns `true` when the loop is clockwise in y-down screen space
/// (signed area >= 0). Invalid inputs — fewer than 4 points (first and
/// last repeat) or not actually closed — return `false`.
///
/// The first point is used as an offset origin to keep the accumulated
/// magnitudes small.
#[must_use]
pub fn is_clockwise(points: &[Point]) -> bool {
    if points.len() < 4 {
        return false;
    }
    let Some(&offset) = points.first() else {
        return false;
    };
    if points.last() != Some(&offset) {
        return false;
    }

    let mut area = 0.0;
    let mut prev = Point::new(0.0, 0.0);
    for point in &points[1..] {
        let current = Point::new(point.x - offset.x, point.y - offset.y);
        area += prev.x.mul_add(current.y, -(prev.y * current.x));
        prev = current;
    }
    area *= 0.5;
    area >= 0.0
}

/// Remove closed loops with fewer than 4 points.
///
/// A real loop needs 3 distinct vertices plus the duplicated first/last
/// point; anything shorter cannot enclose area and is a data error.
#[must_use]
pub fn drop_degenerate_loops(chains: Vec<Chain>) -> Vec<Chain> {
    chains
        .into_iter()
        .filter(|c| {
            let degenerate = c.points.len() < 4 && c.is_closed();
            if degenerate {
                debug!(points = c.points.len(), "dropping degenerate closed loop");
            }
            !degenerate
        })
        .collect()
}

/// Orient closed outer chains clockwise (water on the interior side).
///
/// Open chains pass through untouched.
#[must_use]
pub fn orient_outer(chains: Vec<Chain>) -> Vec<Chain> {
    chains
        .into_iter()
        .map(|c| {
            if c.is_closed() && !is_clockwise(&c.points) {
                reversed_with_water_left(c)
            } else {
                c
            }
        })
        .collect()
}

/// Orient closed inner chains counter-clockwise.
///
/// The interior of an inner ring is land (an island), so its boundary
/// winds opposite to outer rings.
#[must_use]
pub fn orient_inner(chains: Vec<Chain>) -> Vec<Chain> {
    chains
        .into_iter()
        .map(|c| {
            if c.is_closed() && is_clockwise(&c.points) {
                reversed_with_water_left(c)
            } else {
                c
            }
        })
        .collect()
}

/// Orient coastline chains so water is on the canonical side.
///
/// By cartographic convention water lies to the right of coastline-way
/// traversal; chains whose accumulated water side is negative are
/// reversed and forced to `+1`.
#[must_use]
pub fn orient_ocean(chains: Vec<Chain>) -> Vec<Chain> {
    chains
        .into_iter()
        .map(|c| {
            if c.water_side < 0 {
                reversed_with_water_left(c)
            } else {
                c
            }
        })
        .collect()
}

fn reversed_with_water_left(mut chain: Chain) -> Chain {
    chain.points.reverse();
    chain.water_side = 1;
    chain
}
