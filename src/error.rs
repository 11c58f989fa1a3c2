//! Error types for the track pipeline.
//!
//! Every hard error is fatal to a run. Errors raised while assembling one
//! track are wrapped in [`TrackError::Track`] so the operator sees which
//! metadata file and which step failed.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TrackError>;

/// Per-track step that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Joining the route reference with the route directory.
    Resolve,
    /// Reading and parsing the GPX file.
    Parse,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Resolve => f.write_str("route resolution"),
            Step::Parse => f.write_str("GPX parsing"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("cannot read metadata from {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("metadata file {} is not a JSON object: {source}", .path.display())]
    MalformedMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("metadata has no string field '{field}' naming the route file")]
    MissingRouteReference { field: String },

    #[error("route file {} cannot be opened: {source}", .path.display())]
    RouteNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("route file {} is not valid GPX: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: gpx::errors::GpxError,
    },

    #[error("route file {} contains no track points", .path.display())]
    NoPoints { path: PathBuf },

    #[error("terrain data directory {} is unusable: {reason}", .path.display())]
    Terrain { path: PathBuf, reason: String },

    #[error("cannot write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize track records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("track '{track}' failed during {step}: {source}")]
    Track {
        track: String,
        step: Step,
        #[source]
        source: Box<TrackError>,
    },
}

impl TrackError {
    /// Attach the failing track and step to an error.
    pub fn in_track(self, track: impl Into<String>, step: Step) -> Self {
        TrackError::Track {
            track: track.into(),
            step,
            source: Box::new(self),
        }
    }

    /// The innermost error, with any track context stripped.
    pub fn root(&self) -> &TrackError {
        match self {
            TrackError::Track { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for errors resolving a route reference to a readable file.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self.root(),
            TrackError::MissingRouteReference { .. } | TrackError::RouteNotFound { .. }
        )
    }
}
