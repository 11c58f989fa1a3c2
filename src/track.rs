//! Parsed GPS tracks and the flattened point walk.
//!
//! A GPX file holds tracks, each holding segments of points. Statistics and
//! profiles here ignore segment boundaries, so [`Track::walk`] yields every
//! point of every segment of every track, in file order.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use gpx::Gpx;

use crate::error::{Result, TrackError};
use crate::TrackPoint;

/// An ordered sequence of segments, each an ordered sequence of points.
///
/// Only point elevations are ever mutated; positions are fixed at parse time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    segments: Vec<Vec<TrackPoint>>,
}

impl Track {
    /// Create a track from explicit segments.
    pub fn new(segments: Vec<Vec<TrackPoint>>) -> Self {
        Self { segments }
    }

    /// Create a single-segment track.
    pub fn from_points(points: Vec<TrackPoint>) -> Self {
        Self::new(vec![points])
    }

    /// Convert a parsed GPX document, keeping every track segment.
    pub fn from_gpx(gpx: &Gpx) -> Self {
        let segments = gpx
            .tracks
            .iter()
            .flat_map(|track| track.segments.iter())
            .map(|segment| {
                segment
                    .points
                    .iter()
                    .map(|pt| {
                        let point = pt.point();
                        TrackPoint::new(point.y(), point.x(), pt.elevation)
                    })
                    .collect()
            })
            .collect();

        Self { segments }
    }

    /// Parse GPX from any reader.
    pub fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, gpx::errors::GpxError> {
        let gpx = gpx::read(reader)?;
        Ok(Self::from_gpx(&gpx))
    }

    /// Open and parse a GPX file.
    ///
    /// Fails with [`TrackError::RouteNotFound`] when the file cannot be
    /// opened, [`TrackError::Parse`] when it is not GPX, and
    /// [`TrackError::NoPoints`] when it has no track points.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| TrackError::RouteNotFound {
            path: path.to_path_buf(),
            source,
        })?;

        let track = Self::from_reader(BufReader::new(file)).map_err(|source| TrackError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if track.is_empty() {
            return Err(TrackError::NoPoints {
                path: path.to_path_buf(),
            });
        }

        Ok(track)
    }

    /// All points across all segments, in recorded order.
    pub fn walk(&self) -> impl Iterator<Item = &TrackPoint> + '_ {
        self.segments.iter().flatten()
    }

    /// Mutable walk over all points, same order as [`walk`](Self::walk).
    pub fn points_mut(&mut self) -> impl Iterator<Item = &mut TrackPoint> + '_ {
        self.segments.iter_mut().flatten()
    }

    /// Total number of points across all segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SEGMENTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Ridge loop</name>
    <trkseg>
      <trkpt lat="46.0" lon="7.0"><ele>1000.0</ele></trkpt>
      <trkpt lat="46.001" lon="7.0"><ele>1010.0</ele></trkpt>
    </trkseg>
    <trkseg>
      <trkpt lat="46.002" lon="7.0"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    #[test]
    fn test_walk_flattens_segments_in_order() {
        let track = Track::from_reader(TWO_SEGMENTS.as_bytes()).unwrap();

        assert_eq!(track.segments.len(), 2);
        assert_eq!(track.len(), 3);

        let lats: Vec<f64> = track.walk().map(|p| p.latitude).collect();
        assert_eq!(lats, vec![46.0, 46.001, 46.002]);

        let elevations: Vec<Option<f64>> = track.walk().map(|p| p.elevation).collect();
        assert_eq!(elevations, vec![Some(1000.0), Some(1010.0), None]);
    }

    #[test]
    fn test_points_mut_reaches_every_segment() {
        let mut track = Track::from_reader(TWO_SEGMENTS.as_bytes()).unwrap();
        for point in track.points_mut() {
            point.elevation = Some(1.0);
        }
        assert!(track.walk().all(|p| p.elevation == Some(1.0)));
    }

    #[test]
    fn test_malformed_gpx_is_rejected() {
        assert!(Track::from_reader("<gpx><trk>".as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_route_not_found() {
        let err = Track::from_file(Path::new("/nonexistent/route.gpx")).unwrap_err();
        assert!(matches!(err, TrackError::RouteNotFound { .. }));
    }
}
