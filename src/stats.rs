//! Ascent, descent and length statistics.
//!
//! [`measure`] keeps everything in floating point. Flooring to whole meters
//! happens only when the published [`TrackStats`] are built, so the same
//! measurements can be reused without compounding truncation.

use serde::{Deserialize, Serialize};

use crate::geo_utils::DistanceMetric;
use crate::TrackPoint;

/// Raw (unfloored) statistics of a track at one moment in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackMeasurements {
    /// Sum of planar distances between consecutive points (meters)
    pub length_2d: f64,
    /// Sum of slant distances between consecutive points (meters)
    pub length_3d: f64,
    /// Sum of positive elevation deltas (meters)
    pub uphill: f64,
    /// Absolute sum of negative elevation deltas (meters)
    pub downhill: f64,
}

/// Published statistics for one track, in whole meters.
///
/// Lengths come from the as-recorded track. The `orig` pair is measured
/// before terrain correction and the `srtm` pair after it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStats {
    pub length_2d_meters: u64,
    pub length_3d_meters: u64,
    pub uphill_orig_meters: u64,
    pub downhill_orig_meters: u64,
    pub uphill_srtm_meters: u64,
    pub downhill_srtm_meters: u64,
}

impl TrackStats {
    /// Floor the before/after measurements into published statistics.
    pub fn from_measurements(original: &TrackMeasurements, corrected: &TrackMeasurements) -> Self {
        Self {
            length_2d_meters: floor_meters(original.length_2d),
            length_3d_meters: floor_meters(original.length_3d),
            uphill_orig_meters: floor_meters(original.uphill),
            downhill_orig_meters: floor_meters(original.downhill),
            uphill_srtm_meters: floor_meters(corrected.uphill),
            downhill_srtm_meters: floor_meters(corrected.downhill),
        }
    }
}

/// Floor a non-negative meter value to a whole number.
#[inline]
pub fn floor_meters(value: f64) -> u64 {
    value.floor() as u64
}

/// Measure a point sequence in one pass.
///
/// Elevation deltas are taken only between consecutive points that both
/// have an elevation; a point without one breaks the chain on both sides.
///
/// # Example
/// ```
/// use track_profile::{stats, DistanceMetric, TrackPoint};
///
/// let points = vec![
///     TrackPoint::new(0.0, 0.000, Some(100.0)),
///     TrackPoint::new(0.0, 0.001, None),
///     TrackPoint::new(0.0, 0.002, Some(140.0)),
///     TrackPoint::new(0.0, 0.003, Some(130.0)),
/// ];
///
/// let m = stats::measure(&points, DistanceMetric::Haversine);
/// assert_eq!(m.uphill, 0.0); // the 100 -> 140 climb spans a gap
/// assert_eq!(m.downhill, 10.0);
/// assert!(m.length_3d >= m.length_2d);
/// ```
pub fn measure<'a, I>(points: I, metric: DistanceMetric) -> TrackMeasurements
where
    I: IntoIterator<Item = &'a TrackPoint>,
{
    let mut m = TrackMeasurements::default();
    let mut previous: Option<&TrackPoint> = None;

    for point in points {
        if let Some(prev) = previous {
            m.length_2d += metric.distance_2d(prev, point);
            m.length_3d += metric.distance_3d(prev, point);

            if let (Some(e1), Some(e2)) = (prev.elevation, point.elevation) {
                let delta = e2 - e1;
                if delta > 0.0 {
                    m.uphill += delta;
                } else {
                    m.downhill -= delta;
                }
            }
        }
        previous = Some(point);
    }

    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::build_profile;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn three_points() -> Vec<TrackPoint> {
        vec![
            TrackPoint::new(0.0, 0.000, Some(10.0)),
            TrackPoint::new(0.0, 0.001, Some(15.0)),
            TrackPoint::new(0.0, 0.002, Some(12.0)),
        ]
    }

    #[test]
    fn test_three_point_scenario() {
        let m = measure(&three_points(), DistanceMetric::Haversine);
        assert_eq!(floor_meters(m.uphill), 5);
        assert_eq!(floor_meters(m.downhill), 3);
    }

    #[test]
    fn test_single_point_is_all_zero() {
        let points = vec![TrackPoint::new(46.0, 7.0, Some(1200.0))];
        let m = measure(&points, DistanceMetric::Haversine);
        assert_eq!(m, TrackMeasurements::default());

        let stats = TrackStats::from_measurements(&m, &m);
        assert_eq!(stats, TrackStats::default());
    }

    #[test]
    fn test_length_2d_matches_profile_total() {
        let points = three_points();
        let m = measure(&points, DistanceMetric::Haversine);
        let profile = build_profile(&points, DistanceMetric::Haversine);
        assert_eq!(m.length_2d, profile.total_distance());
    }

    #[test]
    fn test_length_3d_at_least_length_2d() {
        for metric in [DistanceMetric::Haversine, DistanceMetric::Geodesic] {
            let m = measure(&three_points(), metric);
            assert!(m.length_3d > m.length_2d);
        }
    }

    #[test]
    fn test_flat_track_3d_equals_2d() {
        let points = vec![
            TrackPoint::new(46.0, 7.000, Some(500.0)),
            TrackPoint::new(46.0, 7.001, Some(500.0)),
            TrackPoint::new(46.0, 7.002, None),
        ];
        let m = measure(&points, DistanceMetric::Haversine);
        assert!(approx_eq(m.length_3d, m.length_2d, 1e-9));
    }

    #[test]
    fn test_telescoping_identity() {
        let elevations = [100.0, 130.0, 95.0, 95.0, 180.0, 150.0];
        let points: Vec<TrackPoint> = elevations
            .iter()
            .enumerate()
            .map(|(i, &e)| TrackPoint::new(46.0, 7.0 + i as f64 * 0.001, Some(e)))
            .collect();

        let m = measure(&points, DistanceMetric::Haversine);
        let net = floor_meters(m.uphill) as i64 - floor_meters(m.downhill) as i64;
        assert_eq!(net, (150.0f64 - 100.0).floor() as i64);
    }

    #[test]
    fn test_absent_elevation_breaks_both_sides() {
        let points = vec![
            TrackPoint::new(46.0, 7.000, Some(10.0)),
            TrackPoint::new(46.0, 7.001, None),
            TrackPoint::new(46.0, 7.002, Some(50.0)),
            TrackPoint::new(46.0, 7.003, Some(40.0)),
        ];
        let m = measure(&points, DistanceMetric::Haversine);
        assert_eq!(m.uphill, 0.0);
        assert_eq!(m.downhill, 10.0);
    }

    #[test]
    fn test_floor_not_round() {
        assert_eq!(floor_meters(5.999), 5);
        assert_eq!(floor_meters(0.4), 0);
        assert_eq!(floor_meters(0.0), 0);
    }

    #[test]
    fn test_measure_is_idempotent() {
        let points = three_points();
        let a = measure(&points, DistanceMetric::Geodesic);
        let b = measure(&points, DistanceMetric::Geodesic);
        assert_eq!(a, b);
    }
}
