//! Distance/elevation profiles.
//!
//! A profile pairs every point of a track with the cumulative planar
//! distance travelled to reach it. It is what the elevation chart plots.

use serde::{Deserialize, Serialize};

use crate::geo_utils::DistanceMetric;
use crate::TrackPoint;

/// Ordered `(cumulative_distance, elevation)` pairs, one per track point.
///
/// Distances start at exactly 0 and never decrease. Serializes as a JSON
/// array of `[distance, elevation]` pairs, with `null` for absent elevations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElevationProfile(pub Vec<(f64, Option<f64>)>);

impl ElevationProfile {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, Option<f64>)> {
        self.0.iter()
    }

    pub fn distances(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|&(d, _)| d)
    }

    pub fn elevations(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.0.iter().map(|&(_, e)| e)
    }

    /// Final cumulative distance (the track's 2D length); 0 when empty.
    pub fn total_distance(&self) -> f64 {
        self.0.last().map_or(0.0, |&(d, _)| d)
    }
}

/// Build the profile of a point sequence.
///
/// Distances accumulate between each point and its predecessor in the given
/// order. Repeated coordinates add 0 but still get their own pair.
///
/// # Example
/// ```
/// use track_profile::{build_profile, DistanceMetric, TrackPoint};
///
/// let points = vec![
///     TrackPoint::new(0.0, 0.0, Some(10.0)),
///     TrackPoint::new(0.0, 0.0, Some(11.0)),
///     TrackPoint::new(0.0, 0.001, None),
/// ];
///
/// let profile = build_profile(&points, DistanceMetric::Haversine);
/// assert_eq!(profile.0[0], (0.0, Some(10.0)));
/// assert_eq!(profile.0[1], (0.0, Some(11.0)));
/// assert!(profile.0[2].0 > 100.0);
/// assert_eq!(profile.0[2].1, None);
/// ```
pub fn build_profile<'a, I>(points: I, metric: DistanceMetric) -> ElevationProfile
where
    I: IntoIterator<Item = &'a TrackPoint>,
{
    let points = points.into_iter();
    let mut pairs = Vec::with_capacity(points.size_hint().0);
    let mut length = 0.0;
    let mut previous: Option<&TrackPoint> = None;

    for point in points {
        if let Some(prev) = previous {
            length += metric.distance_2d(prev, point);
        }
        pairs.push((length, point.elevation));
        previous = Some(point);
    }

    ElevationProfile(pairs)
}
