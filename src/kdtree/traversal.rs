//! Utilities to traverse the KdTree structure.

use std::fmt;

use tinyvec::TinyVec;

use crate::distance::DistanceMetric;
use crate::kdtree::KdTree;
use crate::point::Point;
use crate::r#type::IndexableNum;

/// A node in the KdTree.
///
/// Nodes are only ever handed out by shared reference, so the partition invariant cannot be
/// broken from outside the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T, N: IndexableNum = f64> {
    pub(crate) point: Point<N>,
    pub(crate) payload: T,
    pub(crate) left: Option<Box<Node<T, N>>>,
    pub(crate) right: Option<Box<Node<T, N>>>,
}

impl<T, N: IndexableNum> Node<T, N> {
    pub(crate) fn new(point: Point<N>, payload: T) -> Self {
        Self {
            point,
            payload,
            left: None,
            right: None,
        }
    }

    /// The point stored at this node.
    #[inline]
    pub fn point(&self) -> &Point<N> {
        &self.point
    }

    /// The opaque data associated with this node's point.
    #[inline]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// The child holding points that are not greater than this one on the split axis.
    pub fn left(&self) -> Option<&Node<T, N>> {
        self.left.as_deref()
    }

    /// The child holding points that are not less than this one on the split axis.
    pub fn right(&self) -> Option<&Node<T, N>> {
        self.right.as_deref()
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    pub(crate) fn child(&self, side: Side) -> Option<&Node<T, N>> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    pub(crate) fn child_mut(&mut self, side: Side) -> &mut Option<Box<Node<T, N>>> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub(crate) fn into_parts(self) -> (Point<N>, T) {
        (self.point, self.payload)
    }
}

/// Which child slot of a node to descend into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Side {
    #[default]
    Left,
    Right,
}

/// A sequence of child steps from some subtree root down to a node.
pub(crate) type Path = TinyVec<[Side; 32]>;

/// Follow `path` from `node`.
pub(crate) fn node_at<'a, T, N: IndexableNum>(
    mut node: &'a Node<T, N>,
    path: &[Side],
) -> Option<&'a Node<T, N>> {
    for side in path {
        node = node.child(*side)?;
    }
    Some(node)
}

/// Pre-order iterator over the nodes of a [`KdTree`].
pub struct Iter<'a, T, N: IndexableNum = f64> {
    // Use TinyVec to avoid heap allocations
    stack: TinyVec<[Option<&'a Node<T, N>>; 32]>,
}

impl<'a, T, N: IndexableNum> Iter<'a, T, N> {
    pub(crate) fn new(root: Option<&'a Node<T, N>>) -> Self {
        let mut stack = TinyVec::new();
        if root.is_some() {
            stack.push(root);
        }
        Self { stack }
    }
}

impl<'a, T, N: IndexableNum> Iterator for Iter<'a, T, N> {
    type Item = &'a Node<T, N>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()??;
        // Note: pushed in reverse so that the left subtree is visited first
        if let Some(right) = node.right() {
            self.stack.push(Some(right));
        }
        if let Some(left) = node.left() {
            self.stack.push(Some(left));
        }
        Some(node)
    }
}

impl<'a, T, N: IndexableNum, M: DistanceMetric<N>> IntoIterator for &'a KdTree<T, N, M> {
    type Item = &'a Node<T, N>;
    type IntoIter = Iter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders the tree rotated a quarter turn: the right subtree above, the left subtree below,
/// and eight columns of indentation per level.
impl<T, N: IndexableNum, M: DistanceMetric<N>> fmt::Display for KdTree<T, N, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtree(f, self.root(), 0)
    }
}

fn write_subtree<T, N: IndexableNum>(
    f: &mut fmt::Formatter<'_>,
    node: Option<&Node<T, N>>,
    level: usize,
) -> fmt::Result {
    let Some(node) = node else {
        return Ok(());
    };
    write_subtree(f, node.right(), level + 1)?;
    writeln!(f, "{:indent$}->{}", "", node.point, indent = 8 * level)?;
    write_subtree(f, node.left(), level + 1)
}
