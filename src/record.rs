//! Per-track record assembly.
//!
//! [`assemble_record`] turns one metadata entry into one [`TrackRecord`],
//! in this order:
//!
//! 1. Resolve the route reference against the route directory
//! 2. Parse the GPX file
//! 3. Capture the original profile and measurements
//! 4. Correct elevations against the terrain dataset
//! 5. Capture the corrected profile and measurements
//! 6. Build the immutable record
//!
//! Steps 3 to 5 go through [`terrain::correct`](crate::terrain::correct),
//! which only accepts an already-captured snapshot.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, Step, TrackError};
use crate::pipeline::{MetadataEntry, PipelineContext};
use crate::profile::ElevationProfile;
use crate::stats::TrackStats;
use crate::terrain::{self, CorrectionOptions, ElevationDataset, ElevationSnapshot};
use crate::track::Track;

/// Elevation profiles before and after terrain correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationSeries {
    /// As recorded
    pub orig: ElevationProfile,
    /// After terrain correction
    pub srtm: ElevationProfile,
}

/// Everything the presentation layer needs about one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Input metadata, unmodified
    pub meta: Map<String, Value>,
    /// Path of the route file that was parsed
    pub gpx: String,
    pub stats: TrackStats,
    pub elevation: ElevationSeries,
}

/// Join a metadata entry's route reference onto the route directory.
///
/// The reference is taken as-is; it must be a string field named
/// `route_field`.
pub fn resolve_route(meta: &Map<String, Value>, route_field: &str, route_dir: &Path) -> Result<PathBuf> {
    let reference = meta
        .get(route_field)
        .and_then(Value::as_str)
        .ok_or_else(|| TrackError::MissingRouteReference {
            field: route_field.to_string(),
        })?;

    Ok(route_dir.join(reference))
}

/// Analyze an already-parsed track (steps 3 to 6).
///
/// Consumes the track: once corrected it no longer holds the recorded
/// elevations and must not be measured again.
pub fn analyze_track(
    meta: Map<String, Value>,
    gpx: String,
    mut track: Track,
    dataset: &dyn ElevationDataset,
    options: &CorrectionOptions,
) -> TrackRecord {
    let before = ElevationSnapshot::capture(&track, options.distance_metric);
    let (before, after) = terrain::correct(&mut track, dataset, options, before);

    TrackRecord {
        meta,
        gpx,
        stats: TrackStats::from_measurements(&before.measurements, &after.measurements),
        elevation: ElevationSeries {
            orig: before.profile,
            srtm: after.profile,
        },
    }
}

/// Assemble the record for one metadata entry.
///
/// Errors are tagged with the entry's file name and the failing step.
pub fn assemble_record(entry: &MetadataEntry, context: &PipelineContext) -> Result<TrackRecord> {
    let config = &context.config;

    let path = resolve_route(&entry.meta, &config.route_field, &config.route_dir)
        .map_err(|e| e.in_track(&entry.name, Step::Resolve))?;

    let track = Track::from_file(&path).map_err(|e| {
        let step = if e.is_resolution() { Step::Resolve } else { Step::Parse };
        e.in_track(&entry.name, step)
    })?;

    let record = analyze_track(
        entry.meta.clone(),
        path.to_string_lossy().into_owned(),
        track,
        context.dataset(),
        &config.correction_options(),
    );

    log::info!(
        "[Track] {}: {} points, {}m, uphill {}m recorded / {}m terrain",
        entry.name,
        record.elevation.orig.len(),
        record.stats.length_2d_meters,
        record.stats.uphill_orig_meters,
        record.stats.uphill_srtm_meters
    );

    Ok(record)
}
