use tracing::debug;

use crate::distance::{DistanceMetric, Metric};
use crate::kdtree::traversal::Node;
use crate::kdtree::{next_axis, KdTree};
use crate::point::Point;
use crate::r#type::IndexableNum;

/// A builder to create a balanced [`KdTree`].
///
/// ```
/// use geo_kdtree::{KdTreeBuilder, Metric, Point};
///
/// let mut builder = KdTreeBuilder::new().metric(Metric::great_circle());
/// builder.add(Point::new(55.75, 37.62), "Moscow");
/// builder.add(Point::new(59.94, 30.31), "Saint Petersburg");
/// let tree = builder.finish();
///
/// let nearest = tree.closest(&Point::new(56.0, 37.0)).unwrap();
/// assert_eq!(*nearest.payload(), "Moscow");
/// ```
#[derive(Debug, Clone)]
pub struct KdTreeBuilder<T, N: IndexableNum = f64, M: DistanceMetric<N> = Metric> {
    items: Vec<(Point<N>, T)>,
    metric: M,
}

impl<T, N: IndexableNum> KdTreeBuilder<T, N, Metric> {
    /// Create a new builder using the planar metric.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a new builder with room for `num_items` points.
    pub fn with_capacity(num_items: usize) -> Self {
        Self {
            items: Vec::with_capacity(num_items),
            metric: Metric::Planar,
        }
    }
}

impl<T, N: IndexableNum> Default for KdTreeBuilder<T, N, Metric> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, N: IndexableNum, M: DistanceMetric<N>> KdTreeBuilder<T, N, M> {
    /// Use `metric` for the finished tree's distance queries.
    pub fn metric<M2: DistanceMetric<N>>(self, metric: M2) -> KdTreeBuilder<T, N, M2> {
        KdTreeBuilder {
            items: self.items,
            metric,
        }
    }

    /// Add a point to the index, returning its insertion index.
    pub fn add(&mut self, point: Point<N>, payload: T) -> usize {
        self.items.push((point, payload));
        self.items.len() - 1
    }

    /// The number of points added so far.
    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Consume this builder, performing the k-d sort and generating a KdTree ready for queries.
    pub fn finish(self) -> KdTree<T, N, M> {
        let mut tree = KdTree::with_metric(self.metric);
        tree.rebuild(self.items);
        tree
    }
}

impl<T, N: IndexableNum, M: DistanceMetric<N>> Extend<(Point<N>, T)> for KdTreeBuilder<T, N, M> {
    fn extend<I: IntoIterator<Item = (Point<N>, T)>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T, N: IndexableNum, M: DistanceMetric<N>> KdTree<T, N, M> {
    /// Replace every node of this tree with a balanced tree built from `items`.
    ///
    /// The metric is kept. An empty `items` leaves an empty tree.
    pub fn rebuild<I: IntoIterator<Item = (Point<N>, T)>>(&mut self, items: I) {
        let items: Vec<_> = items.into_iter().collect();
        self.num_items = items.len();
        self.root = build(items, 0);
        debug!(num_items = self.num_items, height = self.height(), "rebuilt k-d tree");
    }
}

/// Recursively build a subtree whose root splits on `axis`.
///
/// The items are stably sorted on `axis` and the floor-middle item becomes the root, so points
/// with equal coordinates keep their relative input order.
pub(crate) fn build<T, N: IndexableNum>(
    mut items: Vec<(Point<N>, T)>,
    axis: usize,
) -> Option<Box<Node<T, N>>> {
    if items.is_empty() {
        return None;
    }

    // `total_cmp` keeps the sort well defined when NaN coordinates are present
    items.sort_by(|a, b| {
        a.0.coord(axis)
            .as_f64()
            .total_cmp(&b.0.coord(axis).as_f64())
    });

    let m = items.len() / 2;
    let upper = items.split_off(m + 1);
    let (point, payload) = items.pop()?;

    let mut node = Node::new(point, payload);
    node.left = build(items, next_axis(axis));
    node.right = build(upper, next_axis(axis));
    Some(Box::new(node))
}
