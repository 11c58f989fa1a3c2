//! Discovery and the batch runner.
//!
//! A run discovers every metadata file up front, sorts the entries by file
//! name, assembles one record per entry, and stops at the first failure.
//! There is no per-track recovery: partial output is worse than none.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::{Map, Value};

use crate::error::{Result, TrackError};
use crate::geo_utils::DistanceMetric;
use crate::record::{assemble_record, TrackRecord};
use crate::terrain::{CorrectionOptions, ElevationDataset};

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory scanned for `*.json` metadata files.
    /// Default: ./tracks/meta
    pub meta_dir: PathBuf,

    /// Directory route references are resolved against.
    /// Default: ./tracks/route
    pub route_dir: PathBuf,

    /// Metadata field naming the route file.
    /// Default: "gpx"
    pub route_field: String,

    /// Smooth terrain elevations (sparse sampling plus interpolation).
    /// Default: true
    pub smooth: bool,

    /// Spacing of terrain samples when smoothing.
    /// Default: 100.0 meters
    pub sample_interval_meters: f64,

    /// Planar distance function for profiles and lengths.
    /// Default: Haversine
    pub distance_metric: DistanceMetric,

    /// Where the record collection is written.
    /// Default: generated_tracks.json
    pub output_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            meta_dir: PathBuf::from("./tracks/meta"),
            route_dir: PathBuf::from("./tracks/route"),
            route_field: "gpx".to_string(),
            smooth: true,
            sample_interval_meters: 100.0,
            distance_metric: DistanceMetric::Haversine,
            output_path: PathBuf::from("generated_tracks.json"),
        }
    }
}

impl PipelineConfig {
    pub fn correction_options(&self) -> CorrectionOptions {
        CorrectionOptions {
            smooth: self.smooth,
            sample_interval_meters: self.sample_interval_meters,
            distance_metric: self.distance_metric,
        }
    }
}

/// Configuration plus the loaded terrain dataset, passed to every step.
pub struct PipelineContext {
    pub config: PipelineConfig,
    dataset: Box<dyn ElevationDataset>,
}

impl PipelineContext {
    pub fn new(config: PipelineConfig, dataset: impl ElevationDataset + 'static) -> Self {
        Self {
            config,
            dataset: Box::new(dataset),
        }
    }

    pub fn dataset(&self) -> &dyn ElevationDataset {
        self.dataset.as_ref()
    }
}

/// One discovered metadata file.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    /// File name, used for ordering and in error messages
    pub name: String,
    pub path: PathBuf,
    pub meta: Map<String, Value>,
}

impl MetadataEntry {
    /// Read and parse one metadata file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| TrackError::Discovery {
            path: path.to_path_buf(),
            source,
        })?;

        let meta: Map<String, Value> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                TrackError::MalformedMetadata {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            path: path.to_path_buf(),
            meta,
        })
    }
}

/// Load every `*.json` file in `meta_dir`, sorted by file name.
///
/// Any unreadable or malformed file fails discovery as a whole.
pub fn discover(meta_dir: &Path) -> Result<Vec<MetadataEntry>> {
    let entries = fs::read_dir(meta_dir).map_err(|source| TrackError::Discovery {
        path: meta_dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| TrackError::Discovery {
            path: meta_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            paths.push(path);
        }
    }

    let mut discovered = paths
        .iter()
        .map(|p| MetadataEntry::from_file(p))
        .collect::<Result<Vec<_>>>()?;
    discovered.sort_by(|a, b| a.name.cmp(&b.name));

    debug!("[Discover] {} metadata files in {}", discovered.len(), meta_dir.display());
    Ok(discovered)
}

/// Assemble records for already-discovered entries, in entry order.
///
/// Fails with the first error in entry order; no records are returned then.
pub fn run_entries(entries: &[MetadataEntry], context: &PipelineContext) -> Result<Vec<TrackRecord>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        info!("[Pipeline] Assembling {} tracks in parallel", entries.len());
        let results: Vec<Result<TrackRecord>> = entries
            .par_iter()
            .map(|entry| assemble_record(entry, context))
            .collect();
        return results.into_iter().collect();
    }

    #[cfg(not(feature = "parallel"))]
    {
        info!("[Pipeline] Assembling {} tracks", entries.len());
        entries
            .iter()
            .map(|entry| assemble_record(entry, context))
            .collect()
    }
}

/// Discover metadata and assemble every record.
pub fn run(context: &PipelineContext) -> Result<Vec<TrackRecord>> {
    let entries = discover(&context.config.meta_dir)?;
    let records = run_entries(&entries, context)?;
    info!("[Pipeline] Built {} track records", records.len());
    Ok(records)
}

/// Write the record collection as pretty-printed JSON.
pub fn write_records(records: &[TrackRecord], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|source| TrackError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    write_json(records, BufWriter::new(file), path)?;

    info!("[Pipeline] Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// I/O failures are reported against `path`; only encoding failures are
/// [`TrackError::Serialize`].
fn write_json<W: Write>(records: &[TrackRecord], mut writer: W, path: &Path) -> Result<()> {
    let output_err = |source| TrackError::Output {
        path: path.to_path_buf(),
        source,
    };

    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| {
        if e.is_io() {
            output_err(io::Error::from(e))
        } else {
            TrackError::Serialize(e)
        }
    })?;
    writer.write_all(b"\n").map_err(output_err)?;
    writer.flush().map_err(output_err)
}
