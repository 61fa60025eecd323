//! Wall-walk reconnection: rebuild closed boundaries from clipped
//! fragments by walking the viewport perimeter clockwise.
//!
//! After clipping, each surviving fragment enters the viewport on one
//! wall and exits on another. The water boundary between an exit point
//! and the next entry point runs along the viewport frame; this module
//! synthesizes those implicit edges by inserting the corners traversed
//! clockwise between the two walls.
//!
//! Segments are tracked by integer identifier (their index in the input
//! set), and the "next entry after this exit" lookup uses a single
//! merged list of all entry events ordered by clockwise position around
//! the perimeter.

use std::collections::HashMap;

use crate::types::{Point, Rect, ReconnectError, Wall, WallPoint};

/// Scalar clockwise position of a wall point around the rectangle
/// perimeter.
///
/// Zero at the bottom-left corner; increases up the LEFT wall, then
/// rightward along TOP, down RIGHT, and leftward along BOTTOM, reaching
/// the full perimeter length back at the bottom-left corner.
#[must_use]
pub fn perimeter_position(pt: Point, wall: Wall, rect: &Rect) -> f64 {
    match wall {
        Wall::Left => rect.bottom() - pt.y,
        Wall::Top => rect.height + (pt.x - rect.left()),
        Wall::Right => rect.height + rect.width + (pt.y - rect.top()),
        Wall::Bottom => 2.0_f64.mul_add(rect.height, rect.width) + (rect.right() - pt.x),
    }
}

/// Whether `p1` precedes `p2` (inclusively) in clockwise travel along a
/// single wall.
const fn clockwise_on_wall(wall: Wall, p1: Point, p2: Point) -> bool {
    match wall {
        Wall::Left => p1.y >= p2.y,
        Wall::Top => p1.x <= p2.x,
        Wall::Right => p1.y <= p2.y,
        Wall::Bottom => p1.x >= p2.x,
    }
}

/// Connect two wall points with straight lines through the viewport
/// corners traversed clockwise from `p1`'s wall to `p2`'s wall.
///
/// Returns the full point run including both endpoints. When both
/// points share a wall and are already in clockwise order there, no
/// corner is inserted. Returns `None` if either point lies on no wall.
#[must_use]
pub fn connect_clockwise(p1: Point, p2: Point, rect: &Rect) -> Option<Vec<Point>> {
    let wall1 = rect.wall_for_point(p1)?;
    let wall2 = rect.wall_for_point(p2)?;

    if wall1 == wall2 && clockwise_on_wall(wall1, p1, p2) {
        return Some(vec![p1, p2]);
    }

    let mut points = vec![p1];
    let mut wall = wall1;
    loop {
        points.push(rect.corner_after(wall));
        wall = wall.next_clockwise();
        if wall == wall2 {
            break;
        }
    }
    points.push(p2);
    Some(points)
}

/// Close a single clipped coastline by walking the viewport frame from
/// its entry point clockwise to its exit point.
///
/// The result is the clipped run followed by the corner frame; rendered
/// as a filled subpath it encloses the water side of the coastline.
/// Returns `None` for runs too short to close or whose endpoints lie on
/// no wall.
#[must_use]
pub fn self_close(clipped: &[WallPoint], rect: &Rect) -> Option<Vec<Point>> {
    if clipped.len() < 2 {
        return None;
    }
    let first = clipped.first()?;
    let last = clipped.last()?;
    let frame = connect_clockwise(first.point, last.point, rect)?;

    let mut looped: Vec<Point> = clipped.iter().map(|wp| wp.point).collect();
    looped.extend(frame);
    Some(looped)
}

/// Reconstruct closed loops from clipped wall-to-wall segments.
///
/// Pops a segment to start a loop, then repeatedly walks from the
/// current exit point to the next entry point: an exact entry match
/// jumps directly, otherwise the next entry in clockwise perimeter
/// order is taken and the gap is bridged with [`connect_clockwise`]
/// corners. The loop closes when the walk returns to its starting
/// segment. Every segment is consumed exactly once; a walk that needs
/// an already-consumed segment, or finds no next entry, fails — the
/// caller should then render nothing rather than a wrong shape.
///
/// Segments with fewer than two points are ignored.
///
/// # Errors
///
/// [`ReconnectError::WallNotFound`] if a segment endpoint lies on no
/// wall, [`ReconnectError::NoNextSegment`] if the walk cannot continue,
/// [`ReconnectError::SegmentRevisited`] on corrupted topology that
/// revisits a consumed segment.
pub fn reconnect(
    segments: &[Vec<Point>],
    rect: &Rect,
) -> Result<Vec<Vec<Point>>, ReconnectError> {
    let segments: Vec<&Vec<Point>> = segments.iter().filter(|s| s.len() >= 2).collect();

    // Entry lookup: exact point match, plus the merged clockwise-sorted
    // list of all entry events for positional fallback.
    let mut entry_map: HashMap<Point, usize> = HashMap::with_capacity(segments.len());
    let mut entries: Vec<(f64, usize)> = Vec::with_capacity(segments.len());
    for (id, segment) in segments.iter().enumerate() {
        let Some(&entry) = segment.first() else {
            continue;
        };
        let wall = rect
            .wall_for_point(entry)
            .ok_or(ReconnectError::WallNotFound)?;
        entry_map.insert(entry, id);
        entries.push((perimeter_position(entry, wall, rect), id));
    }
    entries.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut consumed = vec![false; segments.len()];
    let mut loops = Vec::new();

    for start in 0..segments.len() {
        if consumed[start] {
            continue;
        }
        consumed[start] = true;
        let mut looped: Vec<Point> = segments[start].clone();

        // Bounded by the number of segments: each iteration either
        // closes the loop or consumes a fresh segment.
        let mut remaining = segments.len();
        loop {
            if remaining == 0 {
                return Err(ReconnectError::NoNextSegment);
            }
            remaining -= 1;

            let exit = *looped.last().ok_or(ReconnectError::NoNextSegment)?;
            let next = match entry_map.get(&exit) {
                Some(&id) => id,
                None => next_entry_after(&entries, exit, rect)?,
            };
            let entry = *segments[next]
                .first()
                .ok_or(ReconnectError::NoNextSegment)?;

            if entry != exit {
                let bridge =
                    connect_clockwise(exit, entry, rect).ok_or(ReconnectError::WallNotFound)?;
                looped.extend(bridge.into_iter().skip(1));
            }

            if next == start {
                break; // loop closed
            }
            if consumed[next] {
                return Err(ReconnectError::SegmentRevisited);
            }
            consumed[next] = true;
            looped.extend(segments[next].iter().skip(1).copied());
        }
        loops.push(looped);
    }
    Ok(loops)
}

/// The entry event strictly after `exit` in clockwise perimeter order,
/// wrapping around the perimeter.
fn next_entry_after(
    entries: &[(f64, usize)],
    exit: Point,
    rect: &Rect,
) -> Result<usize, ReconnectError> {
    let wall = rect
        .wall_for_point(exit)
        .ok_or(ReconnectError::WallNotFound)?;
    let exit_pos = perimeter_position(exit, wall, rect);

    entries
        .iter()
        .find(|(pos, _)| *pos > exit_pos)
        .or_else(|| entries.first())
        .map(|&(_, id)| id)
        .ok_or(ReconnectError::NoNextSegment)
}
