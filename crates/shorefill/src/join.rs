//! Chain joining: merge open fragments that share endpoints into
//! maximal contiguous chains.
//!
//! Coastline and water-body outlines arrive as many small ways split at
//! arbitrary nodes. Joining stitches them back into runs that can be
//! oriented and clipped as single polylines. Endpoint matching uses
//! exact point equality, which relies on deterministic upstream
//! projection of shared geographic nodes.

use crate::types::{Chain, Point};

/// Join fragments sharing endpoints into maximal chains.
///
/// Repeatedly seeds a chain from the pool and extends it at either end
/// until it closes into a loop or no fragment matches. The water-side
/// accumulator of each consumed fragment is added to the chain's,
/// negated when the fragment is absorbed in reverse.
///
/// Fragments with fewer than two points are discarded. When several
/// fragments match an endpoint, the first in iteration order wins;
/// callers must not depend on a particular choice among ambiguous
/// topologies.
#[must_use]
pub fn join_fragments(fragments: Vec<Chain>) -> Vec<Chain> {
    let mut pool: Vec<Chain> = fragments
        .into_iter()
        .filter(|f| f.points.len() > 1)
        .collect();
    let mut joined = Vec::new();

    while let Some(seed) = pool.pop() {
        let first = match seed.points.first() {
            Some(&p) => p,
            None => continue,
        };
        let mut chain = Chain::new(vec![first], 0);
        absorb(&mut chain, seed, true, false);

        while !chain.is_closed() {
            let tail = chain.points.last().copied();
            let head = chain.points.first().copied();

            if let Some(idx) = find_match(&pool, tail, |f| f.points.first()) {
                let frag = pool.remove(idx);
                absorb(&mut chain, frag, true, false);
            } else if let Some(idx) = find_match(&pool, tail, |f| f.points.last()) {
                let frag = pool.remove(idx);
                absorb(&mut chain, frag, true, true);
            } else if let Some(idx) = find_match(&pool, head, |f| f.points.last()) {
                let frag = pool.remove(idx);
                absorb(&mut chain, frag, false, false);
            } else if let Some(idx) = find_match(&pool, head, |f| f.points.first()) {
                let frag = pool.remove(idx);
                absorb(&mut chain, frag, false, true);
            } else {
                break; // nothing left to connect to
            }
        }
        joined.push(chain);
    }
    joined
}

/// Index of the first fragment whose selected endpoint equals `target`.
fn find_match(
    pool: &[Chain],
    target: Option<Point>,
    endpoint: impl Fn(&Chain) -> Option<&Point>,
) -> Option<usize> {
    let target = target?;
    pool.iter().position(|f| endpoint(f) == Some(&target))
}

/// Splice a fragment onto a chain.
///
/// `to_back` appends after the chain's tail (dropping the fragment's
/// duplicated first point), otherwise prepends before the head (dropping
/// the duplicated last point). `reversed` flips the fragment's point
/// order and negates its water-side contribution.
fn absorb(chain: &mut Chain, fragment: Chain, to_back: bool, reversed: bool) {
    chain.water_side += if reversed {
        -fragment.water_side
    } else {
        fragment.water_side
    };

    let mut points = fragment.points;
    if reversed {
        points.reverse();
    }
    if to_back {
        chain.points.extend(points.into_iter().skip(1));
    } else {
        points.pop();
        chain.points.splice(0..0, points);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn chain(coords: &[(f64, f64)]) -> Chain {
        Chain::new(pts(coords), 0)
    }

    #[test]
    fn joins_two_fragments_sharing_an_endpoint() {
        // Scenario: [(0,0),(10,0)] + [(10,0),(10,10)]
        // must merge into [(0,0),(10,0),(10,10)].
        let joined = join_fragments(vec![
            chain(&[(0.0, 0.0), (10.0, 0.0)]),
            chain(&[(10.0, 0.0), (10.0, 10.0)]),
        ]);
        assert_eq!(joined.len(), 1);
        assert_eq!(
            joined[0].points,
            pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
        );
    }

    #[test]
    fn joins_reversed_fragment_at_tail() {
        // Second fragment runs away from the shared endpoint and must be
        // reversed before appending.
        let joined = join_fragments(vec![
            chain(&[(0.0, 0.0), (10.0, 0.0)]),
            chain(&[(10.0, 10.0), (10.0, 0.0)]),
        ]);
        assert_eq!(joined.len(), 1);
        assert_eq!(
            joined[0].points,
            pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
        );
    }

    #[test]
    fn prepends_fragment_matching_head() {
        let joined = join_fragments(vec![
            chain(&[(-5.0, 0.0), (0.0, 0.0)]),
            chain(&[(0.0, 0.0), (10.0, 0.0)]),
        ]);
        assert_eq!(joined.len(), 1);
        assert_eq!(
            joined[0].points,
            pts(&[(-5.0, 0.0), (0.0, 0.0), (10.0, 0.0)]),
        );
    }

    #[test]
    fn four_fragments_close_into_a_loop() {
        let joined = join_fragments(vec![
            chain(&[(0.0, 0.0), (10.0, 0.0)]),
            chain(&[(10.0, 0.0), (10.0, 10.0)]),
            chain(&[(10.0, 10.0), (0.0, 10.0)]),
            chain(&[(0.0, 10.0), (0.0, 0.0)]),
        ]);
        assert_eq!(joined.len(), 1);
        assert!(joined[0].is_closed());
        assert_eq!(joined[0].points.len(), 5);
    }

    #[test]
    fn closed_chain_stops_absorbing() {
        // A square that closes, plus an unrelated spur touching the
        // closure point. The spur must come out as its own chain.
        let joined = join_fragments(vec![
            chain(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
            chain(&[(10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            chain(&[(0.0, 0.0), (-10.0, -10.0)]),
        ]);
        assert_eq!(joined.len(), 2);
        let closed = joined.iter().filter(|c| c.is_closed()).count();
        assert_eq!(closed, 1);
    }

    #[test]
    fn disconnected_fragments_stay_separate() {
        let joined = join_fragments(vec![
            chain(&[(0.0, 0.0), (1.0, 0.0)]),
            chain(&[(5.0, 5.0), (6.0, 5.0)]),
        ]);
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn discards_fragments_with_fewer_than_two_points() {
        let joined = join_fragments(vec![
            Chain::new(pts(&[(0.0, 0.0)]), 0),
            Chain::new(vec![], 0),
            chain(&[(0.0, 0.0), (1.0, 0.0)]),
        ]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].points.len(), 2);
    }

    #[test]
    fn water_side_accumulates_with_reversal_flip() {
        // Two coastline fragments, water on the right (-1) each. The
        // second must be reversed to connect, flipping its contribution.
        let joined = join_fragments(vec![
            Chain::new(pts(&[(0.0, 0.0), (10.0, 0.0)]), -1),
            Chain::new(pts(&[(20.0, 0.0), (10.0, 0.0)]), -1),
        ]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].water_side, -1 + 1);
    }

    #[test]
    fn water_side_accumulates_without_reversal() {
        let joined = join_fragments(vec![
            Chain::new(pts(&[(0.0, 0.0), (10.0, 0.0)]), -1),
            Chain::new(pts(&[(10.0, 0.0), (20.0, 0.0)]), -1),
        ]);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].water_side, -2);
    }

    #[test]
    fn joining_is_idempotent_on_maximal_chains() {
        let first = join_fragments(vec![
            chain(&[(0.0, 0.0), (10.0, 0.0)]),
            chain(&[(10.0, 0.0), (10.0, 10.0)]),
            chain(&[(50.0, 50.0), (60.0, 50.0)]),
        ]);
        let mut again = join_fragments(first.clone());
        let mut first = first;

        // Order is unspecified; compare as sets of point sequences.
        let key = |c: &Chain| format!("{:?}", c.points);
        first.sort_by_key(&key);
        again.sort_by_key(&key);
        assert_eq!(first, again);
    }
}
