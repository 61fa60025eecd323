//! Viewport clipping: restrict chains to the portion inside an
//! axis-aligned rectangle.
//!
//! Two entry points, per the two chain shapes:
//!
//! - [`visible_segments`] decomposes a chain (open or closed loop) into
//!   the disjoint sub-polylines that lie inside the viewport, with
//!   entry/exit crossing points computed exactly.
//! - [`clip_to_walls`] clips an open chain while tagging each crossing
//!   point with the wall it lies on, for later wall-walk closure.
//!
//! Crossing candidates are computed parametrically against all four
//! wall lines; candidates that land on a wall's extension outside the
//! rectangle's finite span are filtered by the tolerant containment
//! test.

use tracing::debug;

use crate::types::{Point, Rect, Wall, WallPoint};

/// Exact intersections of the segment `p1 → p2` with the four viewport
/// walls, tagged with their wall and ordered by distance from `p1`.
///
/// Only parametric crossings with `t` in `[0, 1]` are considered, and
/// of those only the ones actually inside the rectangle (tolerantly)
/// survive — at most two. Segments with non-finite endpoints produce
/// no crossings.
#[must_use]
pub fn wall_crossings(p1: Point, p2: Point, rect: &Rect) -> Vec<WallPoint> {
    if !p1.is_finite() || !p2.is_finite() {
        return Vec::new();
    }

    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;

    let mut crossings: Vec<(f64, Wall)> = Vec::with_capacity(4);
    if dx != 0.0 {
        let t_left = (rect.left() - p1.x) / dx;
        if (0.0..=1.0).contains(&t_left) {
            crossings.push((t_left, Wall::Left));
        }
        let t_right = (rect.right() - p1.x) / dx;
        if (0.0..=1.0).contains(&t_right) {
            crossings.push((t_right, Wall::Right));
        }
    }
    if dy != 0.0 {
        let t_top = (rect.top() - p1.y) / dy;
        if (0.0..=1.0).contains(&t_top) {
            crossings.push((t_top, Wall::Top));
        }
        let t_bottom = (rect.bottom() - p1.y) / dy;
        if (0.0..=1.0).contains(&t_bottom) {
            crossings.push((t_bottom, Wall::Bottom));
        }
    }

    crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

    crossings
        .into_iter()
        .map(|(t, wall)| {
            WallPoint::on_wall(Point::new(t.mul_add(dx, p1.x), t.mul_add(dy, p1.y)), wall)
        })
        .filter(|wp| rect.contains(wp.point))
        .collect()
}

/// [`wall_crossings`] without the wall tags.
#[must_use]
pub fn crossing_points(p1: Point, p2: Point, rect: &Rect) -> Vec<Point> {
    wall_crossings(p1, p2, rect)
        .into_iter()
        .map(|wp| wp.point)
        .collect()
}

/// Outcome of rotating a closed loop to start outside the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopRotation {
    /// Not a usable loop: fewer than 4 points or first != last.
    Invalid,
    /// Every point lies inside the viewport; the loop is unchanged.
    AllInside,
    /// The loop now starts (and re-closes) at a point outside the
    /// viewport.
    Rotated,
}

/// Rotate a closed point sequence so traversal starts outside the
/// viewport, keeping it closed.
fn rotate_loop(points: &mut Vec<Point>, rect: &Rect) -> LoopRotation {
    if points.len() < 4 {
        return LoopRotation::Invalid;
    }
    if points.first() != points.last() {
        return LoopRotation::Invalid;
    }

    points.pop();
    let outside = points.iter().position(|&p| !rect.contains(p));
    let rotation = match outside {
        None => LoopRotation::AllInside,
        Some(index) => {
            points.rotate_left(index);
            LoopRotation::Rotated
        }
    };
    if let Some(&first) = points.first() {
        points.push(first);
    }
    rotation
}

/// Decompose a chain into the sub-polylines visible inside the viewport.
///
/// Closed loops are first rotated to start outside the viewport; a loop
/// entirely inside is returned unchanged as the single visible piece,
/// and a malformed loop is discarded. Open chains are scanned as-is.
///
/// The walk classifies each consecutive point pair as inside/inside,
/// entry, exit, or outside-with-crossing (a segment can pass through
/// the rectangle without either endpoint inside). Sub-polylines start
/// at an entry crossing and end at an exit crossing; a trailing run
/// that never exits is not a wall-to-wall span and is dropped.
/// Non-finite points terminate the current accumulation.
#[must_use]
pub fn visible_segments(points: &[Point], rect: &Rect) -> Vec<Vec<Point>> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut way = points.to_vec();
    let is_loop = way.first() == way.last();
    if is_loop {
        match rotate_loop(&mut way, rect) {
            LoopRotation::Invalid => {
                debug!(points = way.len(), "discarding malformed loop");
                return Vec::new();
            }
            LoopRotation::AllInside => return vec![way],
            LoopRotation::Rotated => {}
        }
    }

    let mut visible: Vec<Vec<Point>> = Vec::new();
    let mut trimmed: Option<Vec<Point>> = None;
    let mut prev = Point::new(0.0, 0.0);
    let mut prev_inside = false;
    let mut first = true;

    for &pt in &way {
        let inside = rect.contains(pt);
        if first {
            first = false;
        } else {
            let mut is_entry = false;
            let mut is_exit = false;
            if prev_inside {
                if !inside {
                    is_exit = true;
                }
            } else if inside {
                is_entry = true;
            } else if rect.intersects_segment(prev, pt) && pt.is_finite() && prev.is_finite() {
                // both endpoints outside, but the segment passes through
                is_entry = true;
                is_exit = true;
            }

            let crossings = if is_entry || is_exit {
                crossing_points(prev, pt, rect)
            } else {
                Vec::new()
            };
            if is_entry {
                // No computable crossing (the previous point was
                // unprojectable): stay outside rather than start a span
                // off-wall.
                trimmed = crossings.first().map(|&c| vec![c]);
            }
            if is_exit {
                // A way that began inside the viewport has no open
                // segment here; its prefix is ignored.
                if let Some(mut segment) = trimmed.take() {
                    if let Some(&c) = crossings.last() {
                        segment.push(c);
                        if segment.len() >= 2 {
                            visible.push(segment);
                        }
                    }
                    // no crossing: unprojectable geometry ended the span
                }
            } else if inside {
                if let Some(segment) = trimmed.as_mut() {
                    segment.push(pt);
                }
            }
        }
        prev = pt;
        prev_inside = inside;
    }
    visible
}

/// Clip an open chain to the viewport, wall-tagging crossing points.
///
/// Every surviving point is retained: crossing points carry the wall
/// they lie on, interior points carry `None`. Leading points before the
/// first crossing and any trailing run of exterior points are trimmed,
/// so a non-empty result starts on a wall; it ends on a wall unless the
/// chain itself ends inside the viewport.
#[must_use]
pub fn clip_to_walls(points: &[Point], rect: &Rect) -> Vec<WallPoint> {
    let Some(&start) = points.first() else {
        return Vec::new();
    };

    let mut clipped: Vec<WallPoint> = Vec::with_capacity(points.len());
    let mut prev = start;
    let mut prev_inside = rect.contains(prev);

    for &pt in &points[1..] {
        let inside = rect.contains(pt);
        let crossings = if prev_inside && inside {
            Vec::new()
        } else {
            wall_crossings(prev, pt, rect)
        };

        if inside {
            if prev_inside {
                // both inside; skip until the chain first touches a wall
                if !clipped.is_empty() {
                    clipped.push(WallPoint::interior(pt));
                }
            } else {
                // entered the viewport
                if let Some(&c) = crossings.first() {
                    clipped.push(c);
                }
                clipped.push(WallPoint::interior(pt));
            }
        } else if prev_inside {
            // left the viewport
            if let Some(&c) = crossings.last() {
                clipped.push(c);
            }
            clipped.push(WallPoint::interior(pt));
        } else {
            // outside to outside, possibly passing through
            clipped.extend(crossings);
            clipped.push(WallPoint::interior(pt));
        }

        prev = pt;
        prev_inside = inside;
    }

    let lead = clipped
        .iter()
        .position(|wp| wp.wall.is_some())
        .unwrap_or(clipped.len());
    clipped.drain(..lead);
    while clipped
        .last()
        .is_some_and(|wp| wp.wall.is_none() && !rect.contains(wp.point))
    {
        clipped.pop();
    }
    clipped
}
