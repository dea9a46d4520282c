use geo_traits::{CoordTrait, RectTrait};

use crate::distance::DistanceMetric;
use crate::error::{KdTreeError, Result};
use crate::kdtree::next_axis;
use crate::kdtree::traversal::Node;
use crate::kdtree::KdTree;
use crate::point::Point;
use crate::r#type::IndexableNum;

impl<T, N: IndexableNum, M: DistanceMetric<N>> KdTree<T, N, M> {
    /// The node nearest to `pivot` under this tree's metric, or `None` for an empty tree.
    ///
    /// This is an exact search, not an approximation.
    pub fn closest(&self, pivot: &Point<N>) -> Option<&Node<T, N>> {
        self.closest_with_distance(pivot).map(|(node, _)| node)
    }

    /// The node nearest to `pivot` together with its distance.
    pub fn closest_with_distance(&self, pivot: &Point<N>) -> Option<(&Node<T, N>, f64)> {
        closest(self.root(), pivot, 0, &self.metric)
    }

    /// The node nearest to `coord` under this tree's metric.
    pub fn closest_coord(&self, coord: &impl CoordTrait<T = N>) -> Option<&Node<T, N>> {
        self.closest(&Point::from_coord(coord))
    }

    /// Search the index for nodes within the rectangle spanned by `lo` and `hi`, bounds
    /// included.
    ///
    /// Fails with [`KdTreeError::InvalidRange`] if `lo` exceeds `hi` on either axis. Results
    /// come in traversal order.
    pub fn range(&self, lo: &Point<N>, hi: &Point<N>) -> Result<Vec<&Node<T, N>>> {
        if lo.x() > hi.x() {
            return Err(KdTreeError::InvalidRange { axis: 0 });
        }
        if lo.y() > hi.y() {
            return Err(KdTreeError::InvalidRange { axis: 1 });
        }

        let mut result = vec![];
        range(self.root(), lo, hi, 0, &mut result);
        Ok(result)
    }

    /// Search the index for nodes within a given bounding box.
    pub fn range_rect(&self, rect: &impl RectTrait<T = N>) -> Result<Vec<&Node<T, N>>> {
        self.range(
            &Point::new(rect.min().x(), rect.min().y()),
            &Point::new(rect.max().x(), rect.max().y()),
        )
    }

    /// Search the index for nodes within `radius` of `pivot` under this tree's metric.
    ///
    /// Results come in traversal order.
    pub fn within(&self, pivot: &Point<N>, radius: f64) -> Vec<&Node<T, N>> {
        let mut result = vec![];
        within(self.root(), pivot, radius, 0, &self.metric, &mut result);
        result
    }

    /// Search the index for nodes within `radius` of `coord`.
    pub fn within_coord(&self, coord: &impl CoordTrait<T = N>, radius: f64) -> Vec<&Node<T, N>> {
        self.within(&Point::from_coord(coord), radius)
    }
}

/// The side of `node`'s split that `pivot` falls on, followed by the other side.
#[inline]
fn branches<'a, T, N: IndexableNum>(
    node: &'a Node<T, N>,
    pivot: &Point<N>,
    axis: usize,
) -> (Option<&'a Node<T, N>>, Option<&'a Node<T, N>>) {
    if pivot.coord(axis) < node.point.coord(axis) {
        (node.left(), node.right())
    } else {
        (node.right(), node.left())
    }
}

fn closest<'a, T, N: IndexableNum, M: DistanceMetric<N>>(
    node: Option<&'a Node<T, N>>,
    pivot: &Point<N>,
    axis: usize,
    metric: &M,
) -> Option<(&'a Node<T, N>, f64)> {
    let node = node?;
    let (next, opposite) = branches(node, pivot, axis);

    // On a tie the candidate from the pivot's own side wins over this node
    let here = (node, metric.distance(pivot, &node.point));
    let mut best = match closest(next, pivot, next_axis(axis), metric) {
        Some(candidate) if candidate.1 <= here.1 => candidate,
        _ => here,
    };

    // Only cross the split if something over there could still be closer
    if best.1 > metric.split_distance(pivot, axis, node.point.coord(axis)) {
        if let Some(candidate) = closest(opposite, pivot, next_axis(axis), metric) {
            if candidate.1 < best.1 {
                best = candidate;
            }
        }
    }

    Some(best)
}

fn range<'a, T, N: IndexableNum>(
    node: Option<&'a Node<T, N>>,
    lo: &Point<N>,
    hi: &Point<N>,
    axis: usize,
    result: &mut Vec<&'a Node<T, N>>,
) {
    let Some(node) = node else {
        return;
    };
    let split = node.point.coord(axis);

    if split > lo.coord(axis) && split > hi.coord(axis) {
        // query lies entirely below the split
        range(node.left(), lo, hi, next_axis(axis), result);
    } else if split < lo.coord(axis) && split < hi.coord(axis) {
        // query lies entirely above the split
        range(node.right(), lo, hi, next_axis(axis), result);
    } else {
        let (x, y) = node.point.x_y();
        if x >= lo.x() && x <= hi.x() && y >= lo.y() && y <= hi.y() {
            result.push(node);
        }
        range(node.left(), lo, hi, next_axis(axis), result);
        range(node.right(), lo, hi, next_axis(axis), result);
    }
}

fn within<'a, T, N: IndexableNum, M: DistanceMetric<N>>(
    node: Option<&'a Node<T, N>>,
    pivot: &Point<N>,
    radius: f64,
    axis: usize,
    metric: &M,
    result: &mut Vec<&'a Node<T, N>>,
) {
    let Some(node) = node else {
        return;
    };
    let (next, opposite) = branches(node, pivot, axis);

    if metric.distance(pivot, &node.point) <= radius {
        result.push(node);
    }
    within(next, pivot, radius, next_axis(axis), metric, result);
    if metric.split_distance(pivot, axis, node.point.coord(axis)) <= radius {
        within(opposite, pivot, radius, next_axis(axis), metric, result);
    }
}
