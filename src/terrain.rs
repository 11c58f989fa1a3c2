//! Terrain elevation correction.
//!
//! Correction overwrites point elevations in place, which destroys the
//! as-recorded series. The pipeline therefore runs in two phases:
//!
//! 1. [`ElevationSnapshot::capture`] measures the untouched track.
//! 2. [`correct`] takes that snapshot by value, mutates the track through an
//!    [`ElevationDataset`], and captures the corrected snapshot.
//!
//! [`correct`] cannot be called without a "before" snapshot in hand, so the
//! original numbers are always taken from the unmodified track.
//!
//! ## Smoothing
//!
//! With smoothing enabled the dataset is queried with interpolation, and
//! only at points spaced at least `sample_interval_meters` apart (plus both
//! ends). Points in between get elevations interpolated linearly by distance
//! from the surrounding samples, which removes the stair-stepping of a
//! coarse terrain grid.
//!
//! This is a single sampling pass over the whole flattened track: segment
//! boundaries are bridged and no multi-pass averaging is done, so values can
//! differ slightly from tools that smooth each segment over several intervals.

use crate::geo_utils::DistanceMetric;
use crate::profile::{build_profile, ElevationProfile};
use crate::stats::{measure, TrackMeasurements};
use crate::track::Track;
use crate::TrackPoint;

/// How a dataset applies itself to a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionOptions {
    /// Sample sparsely and interpolate between samples.
    /// Default: true
    pub smooth: bool,
    /// Minimum planar distance between terrain samples when smoothing.
    /// Default: 100.0 meters
    pub sample_interval_meters: f64,
    /// Distance function used to space samples.
    /// Default: Haversine
    pub distance_metric: DistanceMetric,
}

impl Default for CorrectionOptions {
    fn default() -> Self {
        Self {
            smooth: true,
            sample_interval_meters: 100.0,
            distance_metric: DistanceMetric::Haversine,
        }
    }
}

/// A source of terrain elevations.
///
/// Implementors provide point lookups; [`add_elevations`](Self::add_elevations)
/// applies them to a whole track and may be overridden for datasets that
/// correct tracks in bulk.
pub trait ElevationDataset: Send + Sync {
    /// Terrain elevation at a location, or `None` where there is no coverage.
    ///
    /// `interpolate` asks for a value blended from neighbouring grid cells
    /// rather than the nearest one.
    fn elevation_at(&self, latitude: f64, longitude: f64, interpolate: bool) -> Option<f64>;

    /// Overwrite every point's elevation in place.
    ///
    /// Points without coverage end up unset unless smoothing can interpolate
    /// them from covered neighbours. Never fails.
    fn add_elevations(&self, track: &mut Track, options: &CorrectionOptions) {
        let mut points: Vec<&mut TrackPoint> = track.points_mut().collect();
        if options.smooth {
            add_sampled_elevations(self, &mut points, options);
        } else {
            for point in points {
                point.elevation = self.elevation_at(point.latitude, point.longitude, false);
            }
        }
    }
}

/// Profile and measurements of a track at one moment in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationSnapshot {
    pub profile: ElevationProfile,
    pub measurements: TrackMeasurements,
}

impl ElevationSnapshot {
    /// Measure a track without modifying it.
    pub fn capture(track: &Track, metric: DistanceMetric) -> Self {
        Self {
            profile: build_profile(track.walk(), metric),
            measurements: measure(track.walk(), metric),
        }
    }
}

/// Correct a track whose original state has already been captured.
///
/// Returns `(before, after)`. Both profiles have the same length and
/// distances since only elevations change.
pub fn correct(
    track: &mut Track,
    dataset: &dyn ElevationDataset,
    options: &CorrectionOptions,
    before: ElevationSnapshot,
) -> (ElevationSnapshot, ElevationSnapshot) {
    dataset.add_elevations(track, options);
    let after = ElevationSnapshot::capture(track, options.distance_metric);
    (before, after)
}

// ============================================================================
// Sampling and Interpolation
// ============================================================================

fn add_sampled_elevations<D>(dataset: &D, points: &mut [&mut TrackPoint], options: &CorrectionOptions)
where
    D: ElevationDataset + ?Sized,
{
    let n = points.len();
    if n == 0 {
        return;
    }

    let mut distances = Vec::with_capacity(n);
    let mut length = 0.0;
    for i in 0..n {
        if i > 0 {
            length += options.distance_metric.distance_2d(&*points[i - 1], &*points[i]);
        }
        distances.push(length);
    }

    let mut last_sample = 0.0;
    for i in 0..n {
        let is_sample = i == 0 || i == n - 1 || distances[i] - last_sample >= options.sample_interval_meters;
        points[i].elevation = if is_sample {
            last_sample = distances[i];
            dataset.elevation_at(points[i].latitude, points[i].longitude, true)
        } else {
            None
        };
    }

    interpolate_missing(points, &distances);
}

/// Fill unset elevations that lie between two set ones, linearly by distance.
///
/// Leading and trailing runs without a bounding value stay unset.
fn interpolate_missing(points: &mut [&mut TrackPoint], distances: &[f64]) {
    let mut previous_known: Option<usize> = None;

    for i in 0..points.len() {
        let Some(e1) = points[i].elevation else {
            continue;
        };

        if let Some(k) = previous_known {
            if i > k + 1 {
                let e0 = points[k].elevation.unwrap_or(e1);
                let (d0, d1) = (distances[k], distances[i]);
                for point_index in (k + 1)..i {
                    let ratio = if d1 > d0 {
                        (distances[point_index] - d0) / (d1 - d0)
                    } else {
                        0.0
                    };
                    points[point_index].elevation = Some(e0 + ratio * (e1 - e0));
                }
            }
        }
        previous_known = Some(i);
    }
}
