use std::mem;

use tracing::{debug, trace};

use crate::distance::{DistanceMetric, Metric};
use crate::error::Result;
use crate::kdtree::next_axis;
use crate::kdtree::traversal::{node_at, Iter, Node, Path, Side};
use crate::point::{check_axis, Point};
use crate::r#type::IndexableNum;

/// A mutable two-dimensional k-d tree of points carrying an opaque payload `T`.
///
/// A node at depth `d` splits on axis `d % 2`: every point in its left subtree is not greater
/// than it on that axis, and every point in its right subtree is not less. Bulk construction
/// through [`KdTree::build`] or [`KdTree::rebuild`] produces a balanced tree; [`KdTree::insert`]
/// never rebalances, so rebuild after large batches of insertions.
///
/// The distance metric `M` is fixed when the tree is created.
#[derive(Debug, Clone)]
pub struct KdTree<T, N: IndexableNum = f64, M: DistanceMetric<N> = Metric> {
    pub(crate) root: Option<Box<Node<T, N>>>,
    pub(crate) metric: M,
    pub(crate) num_items: usize,
}

impl<T, N: IndexableNum> KdTree<T, N, Metric> {
    /// Create an empty tree using the planar metric.
    pub fn new() -> Self {
        Self::with_metric(Metric::Planar)
    }

    /// Build a balanced tree using the planar metric.
    pub fn build<I: IntoIterator<Item = (Point<N>, T)>>(items: I) -> Self {
        Self::build_with_metric(items, Metric::Planar)
    }
}

impl<T, N: IndexableNum> Default for KdTree<T, N, Metric> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, N: IndexableNum, M: DistanceMetric<N>> KdTree<T, N, M> {
    /// Create an empty tree using `metric` for distance queries.
    pub fn with_metric(metric: M) -> Self {
        Self {
            root: None,
            metric,
            num_items: 0,
        }
    }

    /// Build a balanced tree using `metric` for distance queries.
    pub fn build_with_metric<I: IntoIterator<Item = (Point<N>, T)>>(items: I, metric: M) -> Self {
        let mut tree = Self::with_metric(metric);
        tree.rebuild(items);
        tree
    }

    /// The root node, or `None` for an empty tree.
    pub fn root(&self) -> Option<&Node<T, N>> {
        self.root.as_deref()
    }

    /// The distance metric of this tree.
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// The number of points in this tree.
    pub fn len(&self) -> usize {
        self.num_items
    }

    /// Returns `true` if the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The number of levels of the tree. Zero when empty.
    pub fn height(&self) -> usize {
        fn height<T, N: IndexableNum>(node: Option<&Node<T, N>>) -> usize {
            node.map_or(0, |node| 1 + height(node.left()).max(height(node.right())))
        }
        height(self.root())
    }

    /// Iterate over all nodes in pre-order.
    pub fn iter(&self) -> Iter<'_, T, N> {
        Iter::new(self.root())
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        self.root = None;
        self.num_items = 0;
    }

    /// Insert a point as a new leaf.
    ///
    /// Duplicate points are kept as distinct nodes. The tree is not rebalanced.
    pub fn insert(&mut self, point: Point<N>, payload: T) {
        let mut slot = &mut self.root;
        let mut axis = 0;
        while let Some(node) = slot {
            slot = if point.coord(axis) < node.point.coord(axis) {
                &mut node.left
            } else {
                &mut node.right
            };
            axis = next_axis(axis);
        }
        *slot = Some(Box::new(Node::new(point, payload)));
        self.num_items += 1;
    }

    /// Remove one node whose point equals `point`, returning its point and payload.
    ///
    /// Returns `None` and leaves the tree untouched if no such node exists. When several nodes
    /// share the point, which one is removed depends on the shape of the tree.
    pub fn delete(&mut self, point: &Point<N>) -> Option<(Point<N>, T)> {
        let Some(path) = locate(self.root(), point) else {
            trace!(%point, "delete: point not in tree");
            return None;
        };
        let removed = remove_at(&mut self.root, &path, 0)?;
        self.num_items -= 1;
        debug!(%point, depth = path.len(), num_items = self.num_items, "deleted node");
        Some(removed)
    }

    /// The first node found whose point equals `point`.
    pub fn get(&self, point: &Point<N>) -> Option<&Node<T, N>> {
        let path = locate(self.root(), point)?;
        node_at(self.root()?, &path)
    }

    /// Returns `true` if some node's point equals `point`.
    pub fn contains(&self, point: &Point<N>) -> bool {
        locate(self.root(), point).is_some()
    }

    /// The node with the smallest coordinate on `axis`.
    ///
    /// Fails with [`InvalidAxis`][crate::KdTreeError::InvalidAxis] unless `axis` is 0 or 1.
    /// Among nodes sharing the minimum coordinate, which one is returned is unspecified.
    pub fn minimum_on_axis(&self, axis: usize) -> Result<Option<&Node<T, N>>> {
        check_axis(axis)?;
        let Some(root) = self.root() else {
            return Ok(None);
        };
        Ok(node_at(root, &minimum_path(root, axis, 0)))
    }
}

/// Find the path to a node whose point equals `target`, descending the way insertion does.
///
/// A point whose coordinate ties the split value may sit in either subtree, so both are
/// searched in that case, right first.
fn locate<T, N: IndexableNum>(root: Option<&Node<T, N>>, target: &Point<N>) -> Option<Path> {
    fn descend<T, N: IndexableNum>(
        node: Option<&Node<T, N>>,
        target: &Point<N>,
        axis: usize,
        path: &mut Path,
    ) -> bool {
        let Some(node) = node else {
            return false;
        };
        if node.point == *target {
            return true;
        }

        let value = target.coord(axis);
        let split = node.point.coord(axis);
        let sides: &[Side] = if value < split {
            &[Side::Left]
        } else if value == split {
            &[Side::Right, Side::Left]
        } else {
            &[Side::Right]
        };

        for side in sides {
            path.push(*side);
            if descend(node.child(*side), target, next_axis(axis), path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Path::new();
    descend(root, target, 0, &mut path).then_some(path)
}

/// Path to the node with the smallest coordinate on `target_axis` below `node`, which splits
/// on `axis`.
///
/// On its own split axis only the left subtree can hold a smaller value; on the other axis both
/// subtrees are searched. Ties keep the first candidate in the order current, right, left.
fn minimum_path<T, N: IndexableNum>(node: &Node<T, N>, target_axis: usize, axis: usize) -> Path {
    fn reversed<T, N: IndexableNum>(
        node: &Node<T, N>,
        target_axis: usize,
        axis: usize,
    ) -> (N, Path) {
        let next = next_axis(axis);
        if axis == target_axis {
            return match node.left() {
                Some(left) => {
                    let (value, mut path) = reversed(left, target_axis, next);
                    path.push(Side::Left);
                    (value, path)
                }
                None => (node.point.coord(target_axis), Path::new()),
            };
        }

        let mut best = (node.point.coord(target_axis), Path::new());
        for side in [Side::Right, Side::Left] {
            if let Some(child) = node.child(side) {
                let (value, mut path) = reversed(child, target_axis, next);
                if value < best.0 {
                    path.push(side);
                    best = (value, path);
                }
            }
        }
        best
    }

    let (_, mut path) = reversed(node, target_axis, axis);
    path.reverse();
    path
}

/// Walk `path` down from `slot`, whose node splits on `axis`, and remove the node found there.
fn remove_at<T, N: IndexableNum>(
    mut slot: &mut Option<Box<Node<T, N>>>,
    path: &[Side],
    mut axis: usize,
) -> Option<(Point<N>, T)> {
    for side in path {
        slot = slot.as_mut()?.child_mut(*side);
        axis = next_axis(axis);
    }
    remove_node(slot, axis)
}

/// Remove the node in `slot`, which splits on `axis`, with Bentley's algorithm.
///
/// The node is replaced by the minimum on `axis` of its right subtree. Without a right subtree
/// the minimum of the left subtree is used instead, and the left subtree then moves to the right
/// slot so that every remaining descendant is again not less than the replacement.
fn remove_node<T, N: IndexableNum>(
    slot: &mut Option<Box<Node<T, N>>>,
    axis: usize,
) -> Option<(Point<N>, T)> {
    if slot.as_ref()?.is_leaf() {
        return slot.take().map(|node| node.into_parts());
    }

    let node = slot.as_mut()?;
    let (point, payload) = if node.right.is_some() {
        take_minimum(&mut node.right, axis, next_axis(axis))?
    } else {
        let replacement = take_minimum(&mut node.left, axis, next_axis(axis))?;
        node.right = node.left.take();
        replacement
    };

    let point = mem::replace(&mut node.point, point);
    let payload = mem::replace(&mut node.payload, payload);
    Some((point, payload))
}

/// Remove and return the minimum on `target_axis` of the subtree in `slot`, which splits on
/// `axis`.
fn take_minimum<T, N: IndexableNum>(
    slot: &mut Option<Box<Node<T, N>>>,
    target_axis: usize,
    axis: usize,
) -> Option<(Point<N>, T)> {
    let path = minimum_path(slot.as_deref()?, target_axis, axis);
    remove_at(slot, &path, axis)
}
