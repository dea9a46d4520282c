//! Distance metrics for nearest-neighbor and radius queries.
//!
//! This module provides planar Euclidean distance and great-circle distance over
//! `(latitude, longitude)` pairs in degrees. A [`KdTree`][crate::KdTree] carries exactly one
//! metric, chosen when the tree is created.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::point::Point;
use crate::r#type::IndexableNum;

/// Mean Earth radius in meters, used by [`GreatCircleDistance::default`].
pub const EARTH_RADIUS: f64 = 6_372_795.0;

/// A trait for calculating distances between points.
pub trait DistanceMetric<N: IndexableNum> {
    /// The distance between two points. Must be non-negative and symmetric.
    fn distance(&self, a: &Point<N>, b: &Point<N>) -> f64;

    /// A lower bound on the distance from `pivot` to any point lying on the other side of the
    /// splitting line `point[axis] == split`.
    ///
    /// Nearest-neighbor and radius queries skip a subtree when this bound already exceeds the
    /// best distance found, so an over-estimate here causes missed results.
    fn split_distance(&self, pivot: &Point<N>, axis: usize, split: N) -> f64;
}

/// Planar Euclidean distance between two points.
pub fn distance_planar<N: IndexableNum>(a: &Point<N>, b: &Point<N>) -> f64 {
    let dx = a.x().as_f64() - b.x().as_f64();
    let dy = a.y().as_f64() - b.y().as_f64();
    (dx * dx + dy * dy).sqrt()
}

/// Great-circle distance between two `(latitude, longitude)` points in degrees, on a sphere of
/// the given `radius`.
///
/// Uses the `atan2` form of the Vincenty special case for a sphere, which stays accurate both
/// for tiny separations and for nearly antipodal points.
pub fn distance_great_circle<N: IndexableNum>(a: &Point<N>, b: &Point<N>, radius: f64) -> f64 {
    let lat1 = a.x().as_f64().to_radians();
    let lat2 = b.x().as_f64().to_radians();
    let delta = (b.y().as_f64() - a.y().as_f64()).to_radians();

    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_lat2, cos_lat2) = lat2.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();

    let y = ((cos_lat2 * sin_delta).powi(2)
        + (cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_delta).powi(2))
    .sqrt();
    let x = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_delta;

    y.atan2(x) * radius
}

/// Euclidean distance metric.
///
/// This is the standard straight-line distance calculation suitable for planar coordinate
/// systems.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlanarDistance;

impl<N: IndexableNum> DistanceMetric<N> for PlanarDistance {
    #[inline]
    fn distance(&self, a: &Point<N>, b: &Point<N>) -> f64 {
        distance_planar(a, b)
    }

    #[inline]
    fn split_distance(&self, pivot: &Point<N>, axis: usize, split: N) -> f64 {
        (pivot.coord(axis).as_f64() - split.as_f64()).abs()
    }
}

/// Great-circle distance metric.
///
/// Point coordinates are `(latitude, longitude)` in degrees and the output distance is in the
/// unit of `radius` (meters by default).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatCircleDistance {
    /// Sphere radius
    pub radius: f64,
}

impl Default for GreatCircleDistance {
    fn default() -> Self {
        Self {
            radius: EARTH_RADIUS,
        }
    }
}

impl GreatCircleDistance {
    /// Create a new great-circle metric with a custom sphere radius.
    pub fn with_radius(radius: f64) -> Self {
        Self { radius }
    }
}

impl<N: IndexableNum> DistanceMetric<N> for GreatCircleDistance {
    #[inline]
    fn distance(&self, a: &Point<N>, b: &Point<N>) -> f64 {
        distance_great_circle(a, b, self.radius)
    }

    fn split_distance(&self, pivot: &Point<N>, axis: usize, split: N) -> f64 {
        let lat = pivot.x().as_f64().to_radians();
        if axis == 0 {
            // Every arc between two latitudes is at least as long as their difference.
            return (lat - split.as_f64().to_radians()).abs() * self.radius;
        }

        // The far side of a longitude split is a lune bounded by the split meridian and the
        // antimeridian; any path into it crosses one of the two.
        let lon = pivot.y().as_f64().to_radians();
        let to_split = half_meridian_angle(lat, lon - split.as_f64().to_radians());
        let to_antimeridian = half_meridian_angle(lat, PI - lon.abs());
        to_split.min(to_antimeridian) * self.radius
    }
}

/// Angular distance from a point at latitude `lat` to the half meridian `delta_lon` radians
/// away from it.
fn half_meridian_angle(lat: f64, delta_lon: f64) -> f64 {
    let delta_lon = (delta_lon + PI).rem_euclid(TAU) - PI;
    if delta_lon.abs() <= FRAC_PI_2 {
        (lat.cos() * delta_lon.sin().abs()).clamp(0.0, 1.0).asin()
    } else {
        // The closest point of the half meridian is the nearer pole.
        (FRAC_PI_2 - lat.abs()).max(0.0)
    }
}

/// The distance strategy carried by a [`KdTree`][crate::KdTree].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Metric {
    /// Planar Euclidean distance.
    #[default]
    Planar,
    /// Great-circle distance over `(latitude, longitude)` in degrees.
    GreatCircle {
        /// Sphere radius
        radius: f64,
    },
}

impl Metric {
    /// Great-circle metric on a sphere of radius [`EARTH_RADIUS`].
    pub fn great_circle() -> Self {
        Self::GreatCircle {
            radius: EARTH_RADIUS,
        }
    }
}

impl From<PlanarDistance> for Metric {
    fn from(_: PlanarDistance) -> Self {
        Self::Planar
    }
}

impl From<GreatCircleDistance> for Metric {
    fn from(value: GreatCircleDistance) -> Self {
        Self::GreatCircle {
            radius: value.radius,
        }
    }
}

impl<N: IndexableNum> DistanceMetric<N> for Metric {
    #[inline]
    fn distance(&self, a: &Point<N>, b: &Point<N>) -> f64 {
        match *self {
            Self::Planar => PlanarDistance.distance(a, b),
            Self::GreatCircle { radius } => GreatCircleDistance::with_radius(radius).distance(a, b),
        }
    }

    #[inline]
    fn split_distance(&self, pivot: &Point<N>, axis: usize, split: N) -> f64 {
        match *self {
            Self::Planar => PlanarDistance.split_distance(pivot, axis, split),
            Self::GreatCircle { radius } => {
                GreatCircleDistance::with_radius(radius).split_distance(pivot, axis, split)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_0_31::algorithm::{Distance, Haversine};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_planar_distance() {
        let distance = distance_planar(&Point::new(0.0, 0.0), &Point::new(3.0, 4.0));
        assert!((distance - 5.0).abs() < 1e-10);

        // Unsigned coordinates must not underflow
        let distance = distance_planar(&Point::<u8>::new(3, 4), &Point::new(0, 0));
        assert!((distance - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_great_circle_distance() {
        // New York to London, (lat, lon)
        let new_york = Point::new(40.7, -74.0);
        let london = Point::new(51.5, -0.1);
        let distance = distance_great_circle(&new_york, &london, EARTH_RADIUS);
        // Should be approximately 5585 km
        assert!((distance - 5_585_000.0).abs() < 50_000.0);
        assert_eq!(distance_great_circle(&london, &london, EARTH_RADIUS), 0.0);
    }

    #[test]
    fn test_great_circle_antipodal() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 180.0);
        let distance = distance_great_circle(&a, &b, 1.0);
        assert!((distance - PI).abs() < 1e-12);

        let north = Point::new(90.0, 0.0);
        let south = Point::new(-90.0, 0.0);
        assert!((distance_great_circle(&north, &south, 1.0) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_great_circle_matches_haversine() {
        let mut rng = StdRng::seed_from_u64(7);
        let radius = 6_371_008.8;
        for _ in 0..500 {
            let a = Point::new(rng.gen_range(-89.0..89.0), rng.gen_range(-180.0..180.0));
            let b = Point::new(rng.gen_range(-89.0..89.0), rng.gen_range(-180.0..180.0));
            let ours = distance_great_circle(&a, &b, radius);
            // geo takes (lon, lat)
            let theirs: f64 = Haversine.distance(
                geo_0_31::Point::new(a.y(), a.x()),
                geo_0_31::Point::new(b.y(), b.x()),
            );
            assert!(
                (ours - theirs).abs() <= theirs * 1e-3 + 1e-3,
                "{a} {b}: {ours} vs {theirs}"
            );
        }
    }

    #[test]
    fn test_metric_dispatch() {
        let a = Point::new(10.0, 20.0);
        let b = Point::new(11.0, 21.5);
        assert_eq!(Metric::Planar.distance(&a, &b), distance_planar(&a, &b));
        assert_eq!(
            Metric::great_circle().distance(&a, &b),
            distance_great_circle(&a, &b, EARTH_RADIUS)
        );
        assert_eq!(Metric::from(GreatCircleDistance::default()), Metric::great_circle());
        assert_eq!(Metric::from(PlanarDistance), Metric::default());
    }

    #[test]
    fn test_planar_split_distance() {
        let pivot = Point::new(9.0, 4.0);
        assert_eq!(PlanarDistance.split_distance(&pivot, 0, 8.0), 1.0);
        assert_eq!(PlanarDistance.split_distance(&pivot, 1, 7.0), 3.0);
    }

    /// The bound must never exceed the true distance to a point across the split.
    #[test]
    fn test_great_circle_split_distance_is_lower_bound() {
        let mut rng = StdRng::seed_from_u64(11);
        let metric = GreatCircleDistance::default();
        for _ in 0..5_000 {
            let axis = rng.gen_range(0..2);
            let pivot = Point::new(rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0));
            let other = Point::new(rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0));
            let (lo, hi) = if axis == 0 { (-90.0, 90.0) } else { (-180.0, 180.0) };
            let split: f64 = rng.gen_range(lo..=hi);

            let pivot_side = pivot.coord(axis) < split;
            let other_side = other.coord(axis) < split;
            if pivot_side == other_side {
                continue;
            }

            let bound = metric.split_distance(&pivot, axis, split);
            let distance = metric.distance(&pivot, &other);
            assert!(
                bound <= distance + 1e-6,
                "axis {axis} split {split}: bound {bound} > distance {distance} ({pivot} -> {other})"
            );
        }
    }
}
