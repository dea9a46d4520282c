#![doc = include_str!("../README.md")]

pub mod distance;
mod error;
pub mod kdtree;
mod point;
mod r#type;

pub use distance::{DistanceMetric, GreatCircleDistance, Metric, PlanarDistance};
pub use error::{KdTreeError, Result};
pub use kdtree::{KdTree, KdTreeBuilder, Node};
pub use point::Point;
pub use r#type::IndexableNum;

#[cfg(test)]
pub(crate) mod test;
