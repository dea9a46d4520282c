//! Helpers shared by the test suites.


use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distance::DistanceMetric;
use crate::kdtree::{KdTree, Node, DIMENSIONS};
use crate::point::Point;
use crate::r#type::IndexableNum;

/// `n` seeded random points, uniformly drawn from `xs` × `ys`.
pub(crate) fn random_points(n: usize, seed: u64, xs: Range<f64>, ys: Range<f64>) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point::new(rng.gen_range(xs.clone()), rng.gen_range(ys.clone())))
        .collect()
}

/// Pair every point with its position in `points`.
pub(crate) fn enumerated<N: IndexableNum>(points: &[Point<N>]) -> Vec<(Point<N>, usize)> {
    points.iter().copied().zip(0..).collect()
}

/// The smallest distance from `pivot` to any of `points`, by linear scan.
pub(crate) fn brute_force_min_distance<N: IndexableNum>(
    points: &[Point<N>],
    pivot: &Point<N>,
    metric: &impl DistanceMetric<N>,
) -> Option<f64> {
    points
        .iter()
        .map(|point| metric.distance(pivot, point))
        .min_by(f64::total_cmp)
}

/// Assert the axis-alternating partition invariant over the whole tree and return the number
/// of reachable nodes.
pub(crate) fn assert_partitioned<T, N: IndexableNum, M: DistanceMetric<N>>(
    tree: &KdTree<T, N, M>,
) -> usize {
    fn check<T, N: IndexableNum>(
        node: Option<&Node<T, N>>,
        axis: usize,
        lower: [Option<N>; DIMENSIONS],
        upper: [Option<N>; DIMENSIONS],
    ) -> usize {
        let Some(node) = node else {
            return 0;
        };
        let point = node.point();
        for a in 0..DIMENSIONS {
            let value = point.coord(a);
            if let Some(lower) = lower[a] {
                assert!(value >= lower, "{point} below ancestor split {lower} on axis {a}");
            }
            if let Some(upper) = upper[a] {
                assert!(value <= upper, "{point} above ancestor split {upper} on axis {a}");
            }
        }

        let split = point.coord(axis);
        let mut left_upper = upper;
        left_upper[axis] = Some(split);
        let mut right_lower = lower;
        right_lower[axis] = Some(split);

        let next = (axis + 1) % DIMENSIONS;
        1 + check(node.left(), next, lower, left_upper) + check(node.right(), next, right_lower, upper)
    }

    let count = check(tree.root(), 0, [None; DIMENSIONS], [None; DIMENSIONS]);
    assert_eq!(count, tree.len(), "reachable nodes must match len()");
    count
}

/// Payloads of `nodes`, sorted.
pub(crate) fn sorted_payloads<N: IndexableNum>(nodes: &[&Node<usize, N>]) -> Vec<usize> {
    let mut ids: Vec<usize> = nodes.iter().map(|node| *node.payload()).collect();
    ids.sort_unstable();
    ids
}
