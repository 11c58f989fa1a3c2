//! # Track Profile
//!
//! Distance/elevation profiles and climb statistics for recorded GPS tracks,
//! captured before and after SRTM terrain correction.
//!
//! This library provides:
//! - Flattened point walking over GPX tracks and segments
//! - Cumulative distance/elevation profiles for charting
//! - Ascent, descent, 2D and 3D length statistics
//! - Terrain elevation correction from SRTM `.hgt` tiles, with smoothing
//! - A batch pipeline producing one immutable [`TrackRecord`] per track
//!
//! ## Features
//!
//! - **`parallel`** - Assemble track records in parallel with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use track_profile::{build_profile, stats, DistanceMetric, Track, TrackPoint};
//!
//! let track = Track::from_points(vec![
//!     TrackPoint::new(0.0, 0.000, Some(10.0)),
//!     TrackPoint::new(0.0, 0.001, Some(15.0)),
//!     TrackPoint::new(0.0, 0.002, Some(12.0)),
//! ]);
//!
//! let profile = build_profile(track.walk(), DistanceMetric::Haversine);
//! assert_eq!(profile.len(), 3);
//!
//! let measurements = stats::measure(track.walk(), DistanceMetric::Haversine);
//! assert_eq!(stats::floor_meters(measurements.uphill), 5);
//! assert_eq!(stats::floor_meters(measurements.downhill), 3);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, Step, TrackError};

// Point distance capabilities
pub mod geo_utils;
pub use geo_utils::DistanceMetric;

// Parsed tracks and the flattened point walk
pub mod track;
pub use track::Track;

// Distance/elevation profiles
pub mod profile;
pub use profile::{build_profile, ElevationProfile};

// Ascent/descent/length statistics
pub mod stats;
pub use stats::{TrackMeasurements, TrackStats};

// Terrain correction protocol
pub mod terrain;
pub use terrain::{CorrectionOptions, ElevationDataset, ElevationSnapshot};

// SRTM .hgt tile dataset
pub mod srtm;
pub use srtm::{SrtmDataset, SrtmTile};

// Per-track record assembly
pub mod record;
pub use record::{assemble_record, ElevationSeries, TrackRecord};

// Discovery and batch runner
pub mod pipeline;
pub use pipeline::{MetadataEntry, PipelineConfig, PipelineContext};

// ============================================================================
// Core Types
// ============================================================================

/// One recorded GPS sample.
///
/// Elevation is optional: recorders may omit it, and terrain correction may
/// leave it unset where the dataset has no coverage.
///
/// # Example
/// ```
/// use track_profile::TrackPoint;
/// let point = TrackPoint::new(46.5581, 7.8353, Some(2061.0)); // Kleine Scheidegg
/// assert_eq!(point.elevation, Some(2061.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
}

impl TrackPoint {
    /// Create a new track point.
    pub fn new(latitude: f64, longitude: f64, elevation: Option<f64>) -> Self {
        Self { latitude, longitude, elevation }
    }
}
