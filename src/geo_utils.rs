//! # Geographic Utilities
//!
//! Point-to-point distance functions for GPS track analysis.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two points |
//! | [`geodesic_distance`] | Ellipsoidal (WGS84) distance between two points |
//! | [`DistanceMetric::distance_2d`] | Planar distance with a selectable metric |
//! | [`DistanceMetric::distance_3d`] | Slant distance accounting for elevation change |
//!
//! ## Example
//!
//! ```rust
//! use track_profile::{TrackPoint, geo_utils, DistanceMetric};
//!
//! let track = vec![
//!     TrackPoint::new(51.5074, -0.1278, Some(11.0)),  // London
//!     TrackPoint::new(51.5080, -0.1290, Some(14.0)),
//!     TrackPoint::new(51.5090, -0.1300, Some(9.0)),
//! ];
//!
//! let slant = DistanceMetric::Haversine.distance_3d(&track[0], &track[1]);
//! assert!(slant >= geo_utils::haversine_distance(&track[0], &track[1]));
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine vs Geodesic
//!
//! Haversine assumes a spherical Earth (radius 6,371 km) and is accurate to
//! within 0.3%. Geodesic uses Karney's algorithm on the WGS84 ellipsoid and
//! is accurate to nanometers, at a higher cost per call. Neither is the
//! "right" answer for every device, so the metric is a parameter.
//!
//! ### Slant Distance
//!
//! The 3D length of a step is `sqrt(d2² + dz²)`. When either endpoint has no
//! elevation the step falls back to its planar distance.

use std::fmt;
use std::str::FromStr;

use geo::{Distance, Geodesic, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::TrackPoint;

// =============================================================================
// Distance Metric
// =============================================================================

/// Planar distance function used for profiles and lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Great-circle distance on a sphere.
    #[default]
    Haversine,
    /// Shortest path on the WGS84 ellipsoid.
    Geodesic,
}

impl DistanceMetric {
    /// Planar distance in meters, ignoring elevation.
    #[inline]
    pub fn distance_2d(&self, p1: &TrackPoint, p2: &TrackPoint) -> f64 {
        match self {
            DistanceMetric::Haversine => haversine_distance(p1, p2),
            DistanceMetric::Geodesic => geodesic_distance(p1, p2),
        }
    }

    /// Slant distance in meters.
    ///
    /// Falls back to [`distance_2d`](Self::distance_2d) when either point
    /// lacks an elevation.
    pub fn distance_3d(&self, p1: &TrackPoint, p2: &TrackPoint) -> f64 {
        let planar = self.distance_2d(p1, p2);
        match (p1.elevation, p2.elevation) {
            (Some(e1), Some(e2)) => planar.hypot(e2 - e1),
            _ => planar,
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Haversine => f.write_str("haversine"),
            DistanceMetric::Geodesic => f.write_str("geodesic"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "haversine" => Ok(DistanceMetric::Haversine),
            "geodesic" => Ok(DistanceMetric::Geodesic),
            other => Err(format!(
                "unknown distance metric '{}' (expected 'haversine' or 'geodesic')",
                other
            )),
        }
    }
}

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two points in meters.
///
/// # Example
///
/// ```rust
/// use track_profile::{TrackPoint, geo_utils};
///
/// let london = TrackPoint::new(51.5074, -0.1278, None);
/// let paris = TrackPoint::new(48.8566, 2.3522, None);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    Haversine::distance(to_geo(p1), to_geo(p2))
}

/// Ellipsoidal distance between two points in meters.
#[inline]
pub fn geodesic_distance(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    Geodesic::distance(to_geo(p1), to_geo(p2))
}

#[inline]
fn to_geo(p: &TrackPoint) -> Point<f64> {
    Point::new(p.longitude, p.latitude)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = TrackPoint::new(51.5074, -0.1278, Some(20.0));
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_known_value() {
        let london = TrackPoint::new(51.5074, -0.1278, None);
        let paris = TrackPoint::new(48.8566, 2.3522, None);
        let dist = haversine_distance(&london, &paris);
        assert!(approx_eq(dist, 343_560.0, 5000.0));
    }

    #[test]
    fn test_geodesic_close_to_haversine() {
        let london = TrackPoint::new(51.5074, -0.1278, None);
        let paris = TrackPoint::new(48.8566, 2.3522, None);
        let h = haversine_distance(&london, &paris);
        let g = geodesic_distance(&london, &paris);
        // Within 0.5% of each other
        assert!((h - g).abs() / g < 0.005);
    }

    #[test]
    fn test_distance_3d_uses_elevation() {
        let a = TrackPoint::new(0.0, 0.0, Some(0.0));
        let b = TrackPoint::new(0.0, 0.001, Some(100.0));
        let planar = DistanceMetric::Haversine.distance_2d(&a, &b);
        let slant = DistanceMetric::Haversine.distance_3d(&a, &b);
        assert!(approx_eq(slant, (planar * planar + 100.0 * 100.0).sqrt(), 1e-9));
        assert!(slant > planar);
    }

    #[test]
    fn test_distance_3d_falls_back_without_elevation() {
        let a = TrackPoint::new(0.0, 0.0, Some(0.0));
        let b = TrackPoint::new(0.0, 0.001, None);
        let metric = DistanceMetric::Geodesic;
        assert_eq!(metric.distance_3d(&a, &b), metric.distance_2d(&a, &b));
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("Geodesic".parse::<DistanceMetric>(), Ok(DistanceMetric::Geodesic));
        assert_eq!("haversine".parse::<DistanceMetric>(), Ok(DistanceMetric::Haversine));
        assert!("manhattan".parse::<DistanceMetric>().is_err());
    }
}
