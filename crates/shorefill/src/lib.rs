//! shorefill: shoreline/ocean polygon reconstruction (sans-IO).
//!
//! Turns a sparse, fragmented set of tagged line-segment chains —
//! coastline pieces, water-body outlines, multipolygon relation
//! members — into a single renderable filled region representing
//! water, clipped to a rectangular viewport:
//!
//! partition -> join -> orient -> clip -> wall-walk reconnect.
//!
//! This crate has **no I/O dependencies** — it consumes projected
//! points and a viewport rectangle and returns a closed-path
//! description. Data download, projection math, and drawing live with
//! the caller.
//!
//! The pipeline is rebuilt from scratch on every call and never fails
//! loudly: malformed input degrades to "no water rendered", not a
//! crash or a visibly wrong fill.

pub mod clip;
pub mod connect;
pub mod feature;
pub mod join;
pub mod types;
pub mod winding;

use tracing::warn;

pub use feature::{Feature, FragmentSets, LatLon, Member, partition_features};
pub use types::{
    Chain, OceanPath, PathOp, Point, Rect, ReconnectError, Wall, WallPoint,
};

/// Reconstruct the water region visible in `view` from tagged map
/// features.
///
/// `project` maps geographic coordinates into the same projected space
/// as `view` and must be deterministic for shared nodes.
///
/// Returns `None` when there is no water geometry in view or the
/// visible topology cannot be reconstructed.
pub fn ocean_path_from_features<P>(
    features: &[Feature],
    project: P,
    view: &Rect,
) -> Option<OceanPath>
where
    P: Fn(LatLon) -> Point,
{
    ocean_path(partition_features(features, project), view)
}

/// Reconstruct the water region visible in `view` from pre-partitioned
/// projected fragments.
///
/// # Pipeline steps
///
/// 1. Join fragments sharing endpoints into maximal chains
/// 2. Drop degenerate closed loops (data errors)
/// 3. Normalize orientation so water is on the canonical side
/// 4. Clip every chain to the viewport
/// 5. Emit chains that are still complete loops after clipping
/// 6. Self-close coastline runs along the viewport frame
/// 7. Wall-walk reconnect the remaining open spans
///
/// A reconnection failure discards the entire result: nothing drawn is
/// better than a wrong fill.
#[must_use]
pub fn ocean_path(fragments: FragmentSets, view: &Rect) -> Option<OceanPath> {
    if fragments.is_empty() {
        return None;
    }

    // 1. Join fragments into maximal chains per category.
    let outer = join::join_fragments(fragments.outer);
    let inner = join::join_fragments(fragments.inner);
    let ocean = join::join_fragments(fragments.ocean);

    // 2. Degenerate closed loops cannot enclose area.
    let outer = winding::drop_degenerate_loops(outer);
    let inner = winding::drop_degenerate_loops(inner);
    let ocean = winding::drop_degenerate_loops(ocean);

    // 3. Water on the canonical side of each chain.
    let outer = winding::orient_outer(outer);
    let inner = winding::orient_inner(inner);
    let ocean = winding::orient_ocean(ocean);

    let mut path = OceanPath::new();

    // 4 + 5. Clip to the viewport; chains surviving as complete loops
    // are emitted directly with the final per-category winding.
    let outer = emit_closed_loops(clip_chains(outer, view), Category::Outer, &mut path);
    let inner = emit_closed_loops(clip_chains(inner, view), Category::Inner, &mut path);

    // Open coastlines self-close along the frame before clipping into
    // spans; rings go through the regular clip first.
    let (ocean_closed, ocean_open): (Vec<Chain>, Vec<Chain>) =
        ocean.into_iter().partition(Chain::is_closed);
    let ocean_spans = emit_closed_loops(clip_chains(ocean_closed, view), Category::Ocean, &mut path);

    // 6. Self-closure: a coastline has no reconnection partner (its
    // endpoints are not shared with relation members), so each visible
    // run closes through the clockwise corner path on its own.
    for chain in ocean_open {
        let clipped = clip::clip_to_walls(&chain.points, view);
        if let Some(looped) = connect::self_close(&clipped, view) {
            path.add_loop(&looped);
        }
    }
    for span in ocean_spans {
        if let Some(looped) = connect::self_close(&tag_span_endpoints(&span.points, view), view) {
            path.add_loop(&looped);
        }
    }

    // 7. Everything left is an open wall-to-wall span with no water
    // side of its own; reconnect them into loops along the walls.
    let mut spans: Vec<Vec<Point>> = Vec::new();
    spans.extend(outer.into_iter().map(|c| c.points));
    spans.extend(inner.into_iter().map(|c| c.points));
    if !spans.is_empty() {
        match connect::reconnect(&spans, view) {
            Ok(loops) => {
                for looped in loops {
                    path.add_loop(&looped);
                }
            }
            Err(error) => {
                warn!(%error, "unreconstructable shoreline topology; dropping water fill");
                return None;
            }
        }
    }

    if path.is_empty() { None } else { Some(path) }
}

/// Per-category winding applied to loops emitted without reconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Outer,
    Inner,
    Ocean,
}

/// Clip chains to the viewport, keeping each visible piece's water side.
fn clip_chains(chains: Vec<Chain>, view: &Rect) -> Vec<Chain> {
    chains
        .into_iter()
        .flat_map(|chain| {
            let water_side = chain.water_side;
            clip::visible_segments(&chain.points, view)
                .into_iter()
                .map(move |points| Chain::new(points, water_side))
        })
        .collect()
}

/// Emit chains that survived clipping as complete loops; return the
/// open remainder.
///
/// Outer loops fill clockwise, inner loops counter-clockwise (holes),
/// ocean loops clockwise exactly when their water side is positive.
fn emit_closed_loops(chains: Vec<Chain>, category: Category, path: &mut OceanPath) -> Vec<Chain> {
    let mut open = Vec::new();
    for chain in chains {
        if chain.is_closed() {
            let clockwise = winding::is_clockwise(&chain.points);
            let forward = match category {
                Category::Outer => clockwise,
                Category::Inner => !clockwise,
                Category::Ocean => clockwise == (chain.water_side > 0),
            };
            if forward {
                path.add_loop(&chain.points);
            } else {
                let mut points = chain.points;
                points.reverse();
                path.add_loop(&points);
            }
        } else {
            open.push(chain);
        }
    }
    open
}

/// Wrap a clipped span's points for self-closure, wall-tagging the two
/// endpoints.
fn tag_span_endpoints(points: &[Point], view: &Rect) -> Vec<WallPoint> {
    let last = points.len().wrapping_sub(1);
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if i == 0 || i == last {
                view.wall_for_point(p)
                    .map_or_else(|| WallPoint::interior(p), |wall| WallPoint::on_wall(p, wall))
            } else {
                WallPoint::interior(p)
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn view() -> Rect {
        Rect::new(Point::new(0.0, 0.0), 100.0, 100.0)
    }

    fn outer_only(chains: Vec<Chain>) -> FragmentSets {
        FragmentSets {
            outer: chains,
            ..FragmentSets::default()
        }
    }

    /// Split a path back into its subpath point lists.
    fn subpaths(path: &OceanPath) -> Vec<Vec<Point>> {
        let mut loops = Vec::new();
        let mut current = Vec::new();
        for op in path.ops() {
            match *op {
                PathOp::MoveTo(p) => {
                    current = vec![p];
                }
                PathOp::LineTo(p) => current.push(p),
                PathOp::Close => loops.push(std::mem::take(&mut current)),
            }
        }
        loops
    }

    #[test]
    fn square_outer_way_inside_view_is_emitted_verbatim() {
        // A clockwise square fully inside the viewport comes out as one
        // closed path equal to the input polygon.
        let square = pts(&[
            (10.0, 10.0),
            (20.0, 10.0),
            (20.0, 20.0),
            (10.0, 20.0),
            (10.0, 10.0),
        ]);
        let path = ocean_path(outer_only(vec![Chain::new(square.clone(), 0)]), &view()).unwrap();
        assert_eq!(subpaths(&path), vec![square]);
    }

    #[test]
    fn counter_clockwise_outer_way_is_emitted_clockwise() {
        let mut square = pts(&[
            (10.0, 10.0),
            (20.0, 10.0),
            (20.0, 20.0),
            (10.0, 20.0),
            (10.0, 10.0),
        ]);
        square.reverse();
        let path = ocean_path(outer_only(vec![Chain::new(square, 0)]), &view()).unwrap();
        let loops = subpaths(&path);
        assert_eq!(loops.len(), 1);
        assert!(winding::is_clockwise(&loops[0]));
    }

    #[test]
    fn outer_fragments_are_joined_before_orientation() {
        // The square arrives as two open halves; joining must close it.
        let path = ocean_path(
            outer_only(vec![
                Chain::new(pts(&[(10.0, 10.0), (20.0, 10.0), (20.0, 20.0)]), 0),
                Chain::new(pts(&[(20.0, 20.0), (10.0, 20.0), (10.0, 10.0)]), 0),
            ]),
            &view(),
        )
        .unwrap();
        let loops = subpaths(&path);
        assert_eq!(loops.len(), 1);
        assert!(winding::is_clockwise(&loops[0]));
        assert_eq!(loops[0].len(), 5);
    }

    #[test]
    fn relation_with_island_emits_hole_with_opposite_winding() {
        let sets = FragmentSets {
            outer: vec![Chain::new(
                pts(&[
                    (10.0, 10.0),
                    (90.0, 10.0),
                    (90.0, 90.0),
                    (10.0, 90.0),
                    (10.0, 10.0),
                ]),
                0,
            )],
            inner: vec![Chain::new(
                pts(&[
                    (40.0, 40.0),
                    (60.0, 40.0),
                    (60.0, 60.0),
                    (40.0, 60.0),
                    (40.0, 40.0),
                ]),
                0,
            )],
            ocean: vec![],
        };
        let path = ocean_path(sets, &view()).unwrap();
        let loops = subpaths(&path);
        assert_eq!(loops.len(), 2);
        assert!(winding::is_clockwise(&loops[0]), "water ring clockwise");
        assert!(!winding::is_clockwise(&loops[1]), "island ring opposite");
    }

    #[test]
    fn loop_crossing_view_is_reconnected_along_walls() {
        // A water band wider than the viewport: its two visible spans
        // must be stitched back into one loop along the side walls.
        let band = Chain::new(
            pts(&[
                (-50.0, 20.0),
                (150.0, 20.0),
                (150.0, 80.0),
                (-50.0, 80.0),
                (-50.0, 20.0),
            ]),
            0,
        );
        let path = ocean_path(outer_only(vec![band]), &view()).unwrap();
        let loops = subpaths(&path);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].first(), loops[0].last());
        for corner in pts(&[(0.0, 20.0), (100.0, 20.0), (100.0, 80.0), (0.0, 80.0)]) {
            assert!(loops[0].contains(&corner), "missing {corner:?}");
        }
    }

    #[test]
    fn coastline_self_closes_through_clockwise_corner() {
        // Coastline drawn with water on its right; orientation flips it
        // to enter at TOP (30,0) and exit at RIGHT (100,60), so closure
        // inserts the (100,0) corner.
        let coast = Chain::new(
            pts(&[(120.0, 72.0), (80.0, 48.0), (30.0, 30.0), (30.0, -10.0)]),
            -1,
        );
        let sets = FragmentSets {
            ocean: vec![coast],
            ..FragmentSets::default()
        };
        let path = ocean_path(sets, &view()).unwrap();
        let loops = subpaths(&path);
        assert_eq!(loops.len(), 1);
        assert!(loops[0].contains(&Point::new(30.0, 0.0)));
        assert!(loops[0].contains(&Point::new(100.0, 0.0)), "corner missing");
        assert!(loops[0].contains(&Point::new(100.0, 60.0)));
    }

    #[test]
    fn coastline_approaching_from_outside_still_fills() {
        // Same coastline, but with an extra run of points outside the
        // viewport before it enters; the exterior prefix must not
        // prevent self-closure.
        let coast = Chain::new(
            pts(&[
                (120.0, 72.0),
                (80.0, 48.0),
                (30.0, 30.0),
                (30.0, -10.0),
                (30.0, -20.0),
            ]),
            -1,
        );
        let sets = FragmentSets {
            ocean: vec![coast],
            ..FragmentSets::default()
        };
        let path = ocean_path(sets, &view()).unwrap();
        let loops = subpaths(&path);
        assert_eq!(loops.len(), 1);
        assert!(loops[0].contains(&Point::new(30.0, 0.0)));
        assert!(loops[0].contains(&Point::new(100.0, 0.0)));
        assert!(loops[0].contains(&Point::new(100.0, 60.0)));
    }

    #[test]
    fn unprojectable_fragment_does_not_abort_other_water() {
        // One fragment with an infinite coordinate alongside a
        // perfectly renderable band: the band must still fill.
        let band = Chain::new(
            pts(&[
                (-50.0, 20.0),
                (150.0, 20.0),
                (150.0, 80.0),
                (-50.0, 80.0),
                (-50.0, 20.0),
            ]),
            0,
        );
        let broken = Chain::new(
            vec![
                Point::new(f64::INFINITY, f64::INFINITY),
                Point::new(50.0, 50.0),
                Point::new(50.0, 110.0),
            ],
            0,
        );
        let path = ocean_path(outer_only(vec![band, broken]), &view()).unwrap();
        let loops = subpaths(&path);
        assert_eq!(loops.len(), 1);
        assert!(loops[0].contains(&Point::new(100.0, 20.0)));
    }

    #[test]
    fn no_water_geometry_returns_none() {
        assert!(ocean_path(FragmentSets::default(), &view()).is_none());
    }

    #[test]
    fn geometry_outside_view_returns_none() {
        let far = Chain::new(
            pts(&[
                (500.0, 500.0),
                (600.0, 500.0),
                (600.0, 600.0),
                (500.0, 600.0),
                (500.0, 500.0),
            ]),
            0,
        );
        assert!(ocean_path(outer_only(vec![far]), &view()).is_none());
    }

    #[test]
    fn open_chain_fully_inside_view_returns_none() {
        // An open fragment that never touches a wall cannot bound water.
        let dangling = Chain::new(pts(&[(10.0, 10.0), (50.0, 50.0)]), 0);
        assert!(ocean_path(outer_only(vec![dangling]), &view()).is_none());
    }

    #[test]
    fn unreconstructable_topology_returns_none() {
        // Two spans whose entry/exit pairing interleaves on the left
        // wall: the wall walk cannot pair them, so the whole result is
        // refused.
        let a = Chain::new(
            pts(&[(-10.0, 90.0), (10.0, 90.0), (10.0, 80.0), (-10.0, 80.0)]),
            0,
        );
        let b = Chain::new(
            pts(&[(-10.0, 70.0), (10.0, 70.0), (10.0, 75.0), (-10.0, 75.0)]),
            0,
        );
        assert!(ocean_path(outer_only(vec![a, b]), &view()).is_none());
    }

    #[test]
    fn degenerate_closed_loop_is_ignored() {
        let spike = Chain::new(pts(&[(10.0, 10.0), (20.0, 20.0), (10.0, 10.0)]), 0);
        assert!(ocean_path(outer_only(vec![spike]), &view()).is_none());
    }

    #[test]
    fn features_end_to_end() {
        use std::collections::BTreeMap;

        let mut tags = BTreeMap::new();
        tags.insert("natural".to_owned(), "coastline".to_owned());
        let coast = Feature {
            tags,
            nodes: vec![
                LatLon::new(72.0, 120.0),
                LatLon::new(48.0, 80.0),
                LatLon::new(30.0, 30.0),
                LatLon::new(-10.0, 30.0),
            ],
            members: Vec::new(),
        };

        let path = ocean_path_from_features(
            &[coast],
            |n| Point::new(n.lon, n.lat),
            &view(),
        )
        .unwrap();
        assert!(!path.is_empty());
    }
}
