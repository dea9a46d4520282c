//! An implementation of a mutable, two-dimensional K-D Tree.

#![warn(missing_docs)]

mod builder;
mod index;
mod search;
mod traversal;

pub use builder::KdTreeBuilder;
pub use index::KdTree;
pub use traversal::{Iter, Node};

/// The number of axes a [`KdTree`] partitions on.
pub const DIMENSIONS: usize = 2;

/// The split axis of the level below one splitting on `axis`.
#[inline]
pub(crate) fn next_axis(axis: usize) -> usize {
    (axis + 1) % DIMENSIONS
}
