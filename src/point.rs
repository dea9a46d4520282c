//! The two-dimensional point stored in, and used to query, a [`KdTree`][crate::KdTree].

use std::fmt;

use geo_traits::CoordTrait;

use crate::error::{KdTreeError, Result};
use crate::kdtree::DIMENSIONS;
use crate::r#type::IndexableNum;

/// An immutable two-dimensional point.
///
/// Axis 0 is `x` and axis 1 is `y`. When used with the great-circle metric, axis 0 is the
/// latitude and axis 1 the longitude, both in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point<N: IndexableNum = f64> {
    x: N,
    y: N,
}

impl<N: IndexableNum> Point<N> {
    /// Create a new point from its two coordinates.
    pub fn new(x: N, y: N) -> Self {
        Self { x, y }
    }

    /// Create a point from any [`CoordTrait`] implementation.
    pub fn from_coord(coord: &impl CoordTrait<T = N>) -> Self {
        Self::new(coord.x(), coord.y())
    }

    /// The coordinate on axis 0.
    #[inline]
    pub fn x(&self) -> N {
        self.x
    }

    /// The coordinate on axis 1.
    #[inline]
    pub fn y(&self) -> N {
        self.y
    }

    /// The coordinate at axis `axis`.
    ///
    /// Fails with [`KdTreeError::InvalidAxis`] for anything other than 0 or 1.
    pub fn axis(&self, axis: usize) -> Result<N> {
        check_axis(axis)?;
        Ok(self.coord(axis))
    }

    /// Infallible axis access for the tree algorithms, where the axis is always `depth % 2`.
    #[inline]
    pub(crate) fn coord(&self, axis: usize) -> N {
        if axis == 0 {
            self.x
        } else {
            self.y
        }
    }

    /// The point halfway between `self` and `other`.
    ///
    /// Computed in `f64` so that integer coordinates cannot overflow.
    pub fn midpoint(&self, other: &Self) -> Point<f64> {
        Point::new(
            (self.x.as_f64() + other.x.as_f64()) / 2.0,
            (self.y.as_f64() + other.y.as_f64()) / 2.0,
        )
    }

    /// Both coordinates as a tuple.
    pub fn x_y(&self) -> (N, N) {
        (self.x, self.y)
    }
}

/// Fails with [`KdTreeError::InvalidAxis`] unless `axis` is 0 or 1.
pub(crate) fn check_axis(axis: usize) -> Result<()> {
    if axis < DIMENSIONS {
        Ok(())
    } else {
        Err(KdTreeError::InvalidAxis(axis))
    }
}

impl<N: IndexableNum> From<(N, N)> for Point<N> {
    fn from((x, y): (N, N)) -> Self {
        Self::new(x, y)
    }
}

impl<N: IndexableNum> From<[N; 2]> for Point<N> {
    fn from([x, y]: [N; 2]) -> Self {
        Self::new(x, y)
    }
}

impl<N: IndexableNum> CoordTrait for Point<N> {
    type T = N;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

impl<N: IndexableNum> fmt::Display for Point<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_access() {
        let point = Point::new(1, 2);
        assert_eq!(point.axis(0), Ok(1));
        assert_eq!(point.axis(1), Ok(2));
        assert_eq!(point.axis(2), Err(KdTreeError::InvalidAxis(2)));
        assert_eq!(point.axis(usize::MAX), Err(KdTreeError::InvalidAxis(usize::MAX)));
    }

    #[test]
    fn structural_equality() {
        assert_eq!(Point::new(3.0, 4.0), Point::from((3.0, 4.0)));
        assert_eq!(Point::new(3.0, 4.0), Point::from([3.0, 4.0]));
        assert_ne!(Point::new(3.0, 4.0), Point::new(4.0, 3.0));
    }

    #[test]
    fn midpoint_does_not_overflow() {
        let a = Point::<u8>::new(250, 10);
        let b = Point::<u8>::new(254, 20);
        assert_eq!(a.midpoint(&b), Point::new(252.0, 15.0));
    }

    #[test]
    fn display() {
        assert_eq!(Point::new(8, 7).to_string(), "(8, 7)");
        assert_eq!(Point::new(0.5, -1.25).to_string(), "(0.5, -1.25)");
    }
}
