//! Input partitioning: sort tagged map features into the three fragment
//! categories the assembler works on.
//!
//! Features are a thin interface onto the caller's map data model: a
//! tag set, an ordered node list for ways, and role-tagged members for
//! relations. Projection to screen coordinates is supplied by the
//! caller and must be deterministic — two fragments sharing a
//! geographic node must project it to the identical [`Point`], because
//! chain joining matches endpoints exactly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Chain, Point};

/// A geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A relation member: a way's nodes plus its role within the relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Role string, `"outer"` or `"inner"`; anything else is skipped.
    pub role: String,
    /// Ordered nodes of the member way.
    pub nodes: Vec<LatLon>,
}

/// A tagged map feature: a way (non-empty `nodes`) or a relation
/// (non-empty `members`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// OSM-style key/value tags.
    pub tags: BTreeMap<String, String>,
    /// Ordered nodes, for way features.
    pub nodes: Vec<LatLon>,
    /// Role-tagged members, for relation features.
    pub members: Vec<Member>,
}

impl Feature {
    /// Look up a tag value.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Whether the way's node list forms a closed ring.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.nodes.len() >= 2 && self.nodes.first() == self.nodes.last()
    }

    /// Whether this feature represents water or its boundary.
    #[must_use]
    pub fn is_water(&self) -> bool {
        matches!(self.tag("natural"), Some("coastline" | "water"))
            || self.tag("waterway") == Some("riverbank")
            || matches!(self.tag("landuse"), Some("reservoir" | "basin"))
    }
}

/// The three fragment categories consumed by the assembler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentSets {
    /// Open water-body boundary pieces and relation outer members.
    pub outer: Vec<Chain>,
    /// Relation inner members (islands, land within water).
    pub inner: Vec<Chain>,
    /// Coastline-tagged ways; water on the right of traversal.
    pub ocean: Vec<Chain>,
}

impl FragmentSets {
    /// Returns `true` if no category holds any fragment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty() && self.inner.is_empty() && self.ocean.is_empty()
    }
}

/// Water on the right of coastline traversal.
const COASTLINE_WATER_SIDE: i32 = -1;

/// Partition water features into outer/inner/ocean fragments, projecting
/// their nodes to screen space.
///
/// - Coastline-tagged ways become *ocean* fragments.
/// - Closed standalone water ways are skipped: a complete ring needs no
///   reconstruction and is rendered as an ordinary polygon elsewhere.
/// - Other open water ways become *outer* fragments.
/// - Relation members land in *outer*/*inner* by role; other roles and
///   ways with fewer than two nodes are skipped.
pub fn partition_features<P>(features: &[Feature], project: P) -> FragmentSets
where
    P: Fn(LatLon) -> Point,
{
    let mut sets = FragmentSets::default();

    for feature in features.iter().filter(|f| f.is_water()) {
        if !feature.nodes.is_empty() {
            if feature.nodes.len() < 2 {
                continue;
            }
            if feature.tag("natural") == Some("coastline") {
                sets.ocean.push(Chain::new(
                    project_nodes(&feature.nodes, &project),
                    COASTLINE_WATER_SIDE,
                ));
            } else if feature.is_closed() {
                // complete ring, rendered as an ordinary polygon
            } else {
                sets.outer
                    .push(Chain::new(project_nodes(&feature.nodes, &project), 0));
            }
        } else {
            for member in &feature.members {
                if member.nodes.len() < 2 {
                    continue;
                }
                match member.role.as_str() {
                    "outer" => sets
                        .outer
                        .push(Chain::new(project_nodes(&member.nodes, &project), 0)),
                    "inner" => sets
                        .inner
                        .push(Chain::new(project_nodes(&member.nodes, &project), 0)),
                    _ => {}
                }
            }
        }
    }
    sets
}

fn project_nodes<P>(nodes: &[LatLon], project: &P) -> Vec<Point>
where
    P: Fn(LatLon) -> Point,
{
    nodes.iter().map(|&n| project(n)).collect()
}
