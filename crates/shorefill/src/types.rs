//! Shared types for the shoreline reconstruction pipeline.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Absolute tolerance for point-in-rectangle containment tests.
///
/// Absorbs floating round-off introduced by projecting geographic
/// coordinates into screen space.
pub const CONTAINMENT_TOLERANCE: f64 = 1e-4;

/// Absolute tolerance for identifying which viewport wall a point lies on.
///
/// Looser than [`CONTAINMENT_TOLERANCE`] because wall points are produced
/// by parametric intersection, which accumulates more error.
pub const WALL_TOLERANCE: f64 = 1e-2;

/// A 2D point in projected (screen) coordinates, y-down.
///
/// Equality is exact: chain joining matches fragment endpoints by `==`,
/// which requires the upstream projection to be deterministic for shared
/// geographic nodes. Hashing is bitwise-consistent with equality
/// (`-0.0` hashes like `0.0`). Coordinates used as map keys must not be
/// NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (increases rightward).
    pub x: f64,
    /// Vertical position (increases downward).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both coordinates are finite.
    ///
    /// Projection can produce infinite coordinates at extreme latitudes;
    /// such points terminate polyline accumulation.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// Coordinates are never NaN in practice (projection yields finite or
// infinite values), so `==` is reflexive for all points we store.
impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(coord_bits(self.x));
        state.write_u64(coord_bits(self.y));
    }
}

/// Bit pattern of a coordinate with `-0.0` normalized to `0.0`, so the
/// hash agrees with `==`.
fn coord_bits(v: f64) -> u64 {
    (if v == 0.0 { 0.0_f64 } else { v }).to_bits()
}

/// One of the four sides of the clipping rectangle.
///
/// The discriminant order matches the clockwise traversal used when
/// walking the viewport perimeter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Wall {
    /// `x == rect.left()`.
    Left,
    /// `y == rect.top()`.
    Top,
    /// `x == rect.right()`.
    Right,
    /// `y == rect.bottom()`.
    Bottom,
}

impl Wall {
    /// The next wall in clockwise perimeter order:
    /// LEFT → TOP → RIGHT → BOTTOM → LEFT.
    #[must_use]
    pub const fn next_clockwise(self) -> Self {
        match self {
            Self::Left => Self::Top,
            Self::Top => Self::Right,
            Self::Right => Self::Bottom,
            Self::Bottom => Self::Left,
        }
    }
}

/// A point optionally tagged with the viewport wall it lies on.
///
/// `wall == None` denotes an interior point. Wall tags are produced only
/// at clip boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallPoint {
    /// The point itself.
    pub point: Point,
    /// The wall the point lies on, if it is a crossing point.
    pub wall: Option<Wall>,
}

impl WallPoint {
    /// Create an interior (untagged) wall point.
    #[must_use]
    pub const fn interior(point: Point) -> Self {
        Self { point, wall: None }
    }

    /// Create a point tagged with the wall it lies on.
    #[must_use]
    pub const fn on_wall(point: Point, wall: Wall) -> Self {
        Self {
            point,
            wall: Some(wall),
        }
    }
}

/// An axis-aligned viewport rectangle in projected coordinates.
///
/// Width and height are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner (y-down screen space).
    pub origin: Point,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// x coordinate of the left wall.
    #[must_use]
    pub const fn left(&self) -> f64 {
        self.origin.x
    }

    /// y coordinate of the top wall.
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.origin.y
    }

    /// x coordinate of the right wall.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.origin.x + self.width
    }

    /// y coordinate of the bottom wall.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.origin.y + self.height
    }

    /// Tolerant containment test ([`CONTAINMENT_TOLERANCE`]).
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.left() - CONTAINMENT_TOLERANCE
            && pt.x <= self.right() + CONTAINMENT_TOLERANCE
            && pt.y >= self.top() - CONTAINMENT_TOLERANCE
            && pt.y <= self.bottom() + CONTAINMENT_TOLERANCE
    }

    /// Identify which wall a point lies on, within [`WALL_TOLERANCE`].
    ///
    /// Returns `None` for points not near any wall. Checked in clockwise
    /// precedence order, so a corner point reports the wall that
    /// *precedes* its corner in the clockwise walk.
    #[must_use]
    pub fn wall_for_point(&self, pt: Point) -> Option<Wall> {
        if (pt.x - self.left()).abs() < WALL_TOLERANCE {
            Some(Wall::Left)
        } else if (pt.y - self.top()).abs() < WALL_TOLERANCE {
            Some(Wall::Top)
        } else if (pt.x - self.right()).abs() < WALL_TOLERANCE {
            Some(Wall::Right)
        } else if (pt.y - self.bottom()).abs() < WALL_TOLERANCE {
            Some(Wall::Bottom)
        } else {
            None
        }
    }

    /// The corner reached by walking clockwise to the end of `wall`.
    ///
    /// LEFT ends at the top-left corner, TOP at the top-right, RIGHT at
    /// the bottom-right, BOTTOM at the bottom-left.
    #[must_use]
    pub fn corner_after(&self, wall: Wall) -> Point {
        match wall {
            Wall::Left => Point::new(self.left(), self.top()),
            Wall::Top => Point::new(self.right(), self.top()),
            Wall::Right => Point::new(self.right(), self.bottom()),
            Wall::Bottom => Point::new(self.left(), self.bottom()),
        }
    }

    /// Exact test for whether the segment `p1 → p2` intersects this
    /// rectangle, even when neither endpoint is inside.
    ///
    /// Used by the clipper's decomposition walk to detect segments that
    /// pass straight through the viewport.
    #[must_use]
    pub fn intersects_segment(&self, p1: Point, p2: Point) -> bool {
        use geo::Intersects;

        if !p1.is_finite() || !p2.is_finite() {
            return false;
        }
        let rect = geo::Rect::new(
            geo::Coord {
                x: self.left(),
                y: self.top(),
            },
            geo::Coord {
                x: self.right(),
                y: self.bottom(),
            },
        );
        let line = geo::Line::new(
            geo::Coord { x: p1.x, y: p1.y },
            geo::Coord { x: p2.x, y: p2.y },
        );
        rect.intersects(&line)
    }
}

/// A run of connected points with an aggregated water-side sign.
///
/// Before joining, a `Chain` is a single fragment (one source way).
/// After joining, it is a maximal polyline or closed loop.
///
/// `water_side` is a signed accumulator: positive means water lies to
/// the left of the traversal direction, negative to the right, zero
/// unknown. Coastline-tagged fragments start at `-1` (water on the
/// right by cartographic convention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    /// Ordered points of the chain.
    pub points: Vec<Point>,
    /// Signed water-side accumulator.
    pub water_side: i32,
}

impl Chain {
    /// Create a new chain.
    #[must_use]
    pub const fn new(points: Vec<Point>, water_side: i32) -> Self {
        Self { points, water_side }
    }

    /// Returns `true` if the chain is a closed loop
    /// (at least two points and first == last).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.points.len() >= 2 && self.points.first() == self.points.last()
    }
}

/// A single move-to/line-to operation in the output path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathOp {
    /// Begin a new subpath at the given point.
    MoveTo(Point),
    /// Draw a straight line to the given point.
    LineTo(Point),
    /// Close the current subpath back to its `MoveTo` point.
    Close,
}

/// The renderable closed-path description produced by the assembler.
///
/// A sequence of subpaths, each opened with [`PathOp::MoveTo`] and
/// terminated with [`PathOp::Close`], suitable for filled rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OceanPath(Vec<PathOp>);

impl OceanPath {
    /// Create an empty path.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns `true` if the path contains no operations.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the path operations in order.
    #[must_use]
    pub fn ops(&self) -> &[PathOp] {
        &self.0
    }

    /// Append a closed subpath from a point list.
    ///
    /// Accumulation stops at the first non-finite point (unprojectable
    /// geometry); the subpath emitted so far is still closed. Lists with
    /// fewer than two usable points are ignored.
    pub fn add_loop(&mut self, points: &[Point]) {
        let start = self.0.len();
        let mut first = true;
        for &p in points {
            if !p.is_finite() {
                break;
            }
            if first {
                first = false;
                self.0.push(PathOp::MoveTo(p));
            } else {
                self.0.push(PathOp::LineTo(p));
            }
        }
        if self.0.len() - start < 2 {
            self.0.truncate(start);
        } else {
            self.0.push(PathOp::Close);
        }
    }
}

/// Failures of the wall-walk reconnection stage.
///
/// All variants are recovered inside the assembler: an unreconstructable
/// topology yields no path rather than a partially-correct shape.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReconnectError {
    /// No segment owns the next entry point after an exit point.
    #[error("no segment found to continue from an exit point")]
    NoNextSegment,

    /// The walk reached a segment that was already consumed.
    #[error("reconnection walk revisited an already-consumed segment")]
    SegmentRevisited,

    /// A clipped endpoint does not lie on any viewport wall.
    #[error("clipped endpoint lies on no viewport wall")]
    WallNotFound,
}
