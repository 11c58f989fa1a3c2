//! # SRTM Terrain Dataset
//!
//! Elevation lookups from SRTM `.hgt` tiles stored in a local directory.
//!
//! Each tile covers one degree of latitude and longitude and is named after
//! its south-west corner, e.g. `N35E138.hgt`. Samples are 16-bit big-endian
//! signed integers in meters, row by row from the north edge:
//!
//! | Product | Samples | Resolution |
//! |---------|---------|------------|
//! | SRTM1 | 3601×3601 | 1 arc-second (~30m) |
//! | SRTM3 | 1201×1201 | 3 arc-seconds (~90m) |
//!
//! [`VOID_VALUE`] marks samples with no data.
//!
//! Tiles are memory-mapped on first use and held in an LRU cache of
//! [`DEFAULT_CACHE_SIZE`] entries. A tile that is missing or unreadable is
//! cached as absent, so every point in that degree square is a coverage miss
//! rather than an error.

use std::fs::{self, File};
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use lru::LruCache;
use memmap2::Mmap;

use crate::error::{Result, TrackError};
use crate::terrain::ElevationDataset;

/// Sample value for "no data".
pub const VOID_VALUE: i16 = -32768;

/// Tile cache entries kept by [`SrtmDataset::open`].
pub const DEFAULT_CACHE_SIZE: usize = 32;

const SRTM1_SIDE: usize = 3601;
const SRTM3_SIDE: usize = 1201;

/// File name of the tile containing a location.
///
/// # Example
/// ```
/// use track_profile::srtm::tile_name;
/// assert_eq!(tile_name(35.5, 138.7), "N35E138.hgt");
/// assert_eq!(tile_name(-0.5, -0.1), "S01W001.hgt");
/// ```
pub fn tile_name(latitude: f64, longitude: f64) -> String {
    let lat = latitude.floor() as i32;
    let lon = longitude.floor() as i32;
    format!(
        "{}{:02}{}{:03}.hgt",
        if lat >= 0 { 'N' } else { 'S' },
        lat.abs(),
        if lon >= 0 { 'E' } else { 'W' },
        lon.abs()
    )
}

fn side_for_len(len: usize) -> Option<usize> {
    [SRTM1_SIDE, SRTM3_SIDE]
        .into_iter()
        .find(|side| side * side * 2 == len)
}

// ============================================================================
// Tile
// ============================================================================

/// One degree square of elevation samples, decoded on access.
#[derive(Debug)]
pub struct SrtmTile {
    south: i32,
    west: i32,
    side: usize,
    data: Mmap,
}

impl SrtmTile {
    /// Memory-map a `.hgt` file. `Ok(None)` when its size is not SRTM1 or SRTM3.
    pub fn map_file(south: i32, west: i32, path: &Path) -> io::Result<Option<Self>> {
        let file = File::open(path)?;
        // SAFETY: tile files are read-only inputs for the lifetime of a run.
        let map = unsafe { Mmap::map(&file)? };
        Ok(side_for_len(map.len()).map(|side| Self {
            south,
            west,
            side,
            data: map,
        }))
    }

    /// Samples per edge: 3601 for SRTM1, 1201 for SRTM3.
    pub fn side(&self) -> usize {
        self.side
    }

    fn sample(&self, row: usize, col: usize) -> Option<f64> {
        let offset = (row * self.side + col) * 2;
        let raw = self.data.get(offset..offset + 2)?;
        let value = i16::from_be_bytes([raw[0], raw[1]]);
        (value != VOID_VALUE).then_some(f64::from(value))
    }

    /// Elevation at a location inside this tile.
    ///
    /// With `interpolate`, blends the four surrounding samples bilinearly,
    /// falling back to the nearest sample when any of them is void.
    pub fn elevation(&self, latitude: f64, longitude: f64, interpolate: bool) -> Option<f64> {
        let last = (self.side - 1) as f64;
        let y = (f64::from(self.south + 1) - latitude) * last;
        let x = (longitude - f64::from(self.west)) * last;
        if !(0.0..=last).contains(&y) || !(0.0..=last).contains(&x) {
            return None;
        }

        if interpolate {
            let row = (y.floor() as usize).min(self.side - 2);
            let col = (x.floor() as usize).min(self.side - 2);
            let fy = y - row as f64;
            let fx = x - col as f64;

            let corners = (
                self.sample(row, col),
                self.sample(row, col + 1),
                self.sample(row + 1, col),
                self.sample(row + 1, col + 1),
            );
            if let (Some(nw), Some(ne), Some(sw), Some(se)) = corners {
                let north = nw + (ne - nw) * fx;
                let south = sw + (se - sw) * fx;
                return Some(north + (south - north) * fy);
            }
        }

        self.sample(y.round() as usize, x.round() as usize)
    }
}

// ============================================================================
// Dataset
// ============================================================================

/// Directory of `.hgt` tiles behind a bounded LRU cache.
///
/// Safe to share across threads. Evicted tiles are unmapped and mapped
/// again on the next lookup that needs them.
#[derive(Debug)]
pub struct SrtmDataset {
    dir: PathBuf,
    tiles: Mutex<LruCache<String, Option<Arc<SrtmTile>>>>,
}

impl SrtmDataset {
    /// Open a tile directory with [`DEFAULT_CACHE_SIZE`] cache entries.
    ///
    /// Fails only when `dir` is not a readable directory; individual tiles
    /// are not checked until needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_cache_size(dir, DEFAULT_CACHE_SIZE)
    }

    /// Open a tile directory caching at most `cache_size` tiles (at least one).
    pub fn with_cache_size(dir: impl Into<PathBuf>, cache_size: usize) -> Result<Self> {
        let dir = dir.into();
        match fs::metadata(&dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(TrackError::Terrain {
                    path: dir,
                    reason: "not a directory".to_string(),
                })
            }
            Err(e) => {
                return Err(TrackError::Terrain {
                    path: dir,
                    reason: e.to_string(),
                })
            }
        }

        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        debug!("[SRTM] Tile cache holds {} entries", capacity);
        Ok(Self {
            dir,
            tiles: Mutex::new(LruCache::new(capacity)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn tile(&self, latitude: f64, longitude: f64) -> Option<Arc<SrtmTile>> {
        let name = tile_name(latitude, longitude);

        {
            let mut tiles = self.tiles.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = tiles.get(&name) {
                return cached.clone();
            }
        }

        let loaded = self
            .load_tile(&name, latitude.floor() as i32, longitude.floor() as i32)
            .map(Arc::new);

        let mut tiles = self.tiles.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = tiles.get(&name) {
            return cached.clone();
        }
        tiles.put(name, loaded.clone());
        loaded
    }

    fn load_tile(&self, name: &str, south: i32, west: i32) -> Option<SrtmTile> {
        let path = self.dir.join(name);
        match SrtmTile::map_file(south, west, &path) {
            Ok(Some(tile)) => {
                debug!("[SRTM] Mapped {} ({}x{} samples)", name, tile.side(), tile.side());
                Some(tile)
            }
            Ok(None) => {
                warn!(
                    "[SRTM] Ignoring {}: size is not an SRTM1 or SRTM3 tile",
                    path.display()
                );
                None
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("[SRTM] No tile {} in {}", name, self.dir.display());
                None
            }
            Err(e) => {
                warn!("[SRTM] Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl ElevationDataset for SrtmDataset {
    fn elevation_at(&self, latitude: f64, longitude: f64, interpolate: bool) -> Option<f64> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        self.tile(latitude, longitude)?
            .elevation(latitude, longitude, interpolate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    /// SRTM3 tile whose sample at (row, col) is `row + col`, with one void.
    fn gradient_bytes() -> Vec<u8> {
        let mut bytes = Vec::with_capacity(SRTM3_SIDE * SRTM3_SIDE * 2);
        for row in 0..SRTM3_SIDE {
            for col in 0..SRTM3_SIDE {
                let value = if row == 600 && col == 600 {
                    VOID_VALUE
                } else {
                    (row + col) as i16
                };
                bytes.extend_from_slice(&value.to_be_bytes());
            }
        }
        bytes
    }

    #[test]
    fn test_tile_name() {
        assert_eq!(tile_name(46.55, 7.98), "N46E007.hgt");
        assert_eq!(tile_name(-33.9, 18.4), "S34E018.hgt");
        assert_eq!(tile_name(40.7, -74.0), "N40W074.hgt");
    }

    /// Write the gradient tile into `dir` and map it.
    fn gradient_tile(dir: &Path) -> SrtmTile {
        let path = dir.join("N46E007.hgt");
        fs::write(&path, gradient_bytes()).unwrap();
        SrtmTile::map_file(46, 7, &path).unwrap().unwrap()
    }

    #[test]
    fn test_rejects_unknown_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("N46E007.hgt");
        fs::write(&path, [0u8; 100]).unwrap();
        assert!(SrtmTile::map_file(46, 7, &path).unwrap().is_none());
    }

    #[test]
    fn test_nearest_and_interpolated_samples() {
        let dir = tempfile::tempdir().unwrap();
        let tile = gradient_tile(dir.path());
        assert_eq!(tile.side(), SRTM3_SIDE);

        // North-west corner is row 0, col 0
        assert_eq!(tile.elevation(47.0, 7.0, false), Some(0.0));
        // South-east corner
        assert_eq!(tile.elevation(46.0, 8.0, false), Some(2400.0));

        // Halfway between grid cells: nearest rounds, interpolation blends
        let half = 0.5 / 1200.0;
        let lat = 47.0 - (10.0 / 1200.0) - half;
        let lon = 7.0 + (20.0 / 1200.0);
        let blended = tile.elevation(lat, lon, true).unwrap();
        assert!(approx_eq(blended, 30.5, 1e-6));
    }

    #[test]
    fn test_void_sample_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let tile = gradient_tile(dir.path());
        let lat = 47.0 - 600.0 / 1200.0;
        let lon = 7.0 + 600.0 / 1200.0;
        assert_eq!(tile.elevation(lat, lon, false), None);
        // Interpolation falls back to nearest, which is the void
        assert_eq!(tile.elevation(lat, lon, true), None);
    }

    #[test]
    fn test_outside_tile_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let tile = gradient_tile(dir.path());
        assert_eq!(tile.elevation(48.0, 7.5, false), None);
    }

    /// (tiles mapped, cache entries including misses)
    fn cache_counts(dataset: &SrtmDataset) -> (usize, usize) {
        let tiles = dataset.tiles.lock().unwrap();
        let mapped = tiles.iter().filter(|(_, tile)| tile.is_some()).count();
        (mapped, tiles.len())
    }

    #[test]
    fn test_dataset_loads_and_caches_tiles() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("N46E007.hgt"), gradient_bytes()).unwrap();

        let dataset = SrtmDataset::open(dir.path()).unwrap();
        assert_eq!(cache_counts(&dataset), (0, 0));

        assert_eq!(dataset.elevation_at(46.75, 7.5, false), Some(900.0));
        assert_eq!(dataset.elevation_at(46.5, 7.5, true), None);
        assert_eq!(dataset.elevation_at(46.25, 7.25, false), Some(1200.0));
        assert_eq!(cache_counts(&dataset), (1, 1));

        // Different degree square, no file: a miss, not an error
        assert_eq!(dataset.elevation_at(10.5, 10.5, true), None);
        assert_eq!(cache_counts(&dataset), (1, 2));
    }

    #[test]
    fn test_cache_is_bounded_and_remaps_evicted_tiles() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["N46E007.hgt", "N46E008.hgt", "N46E009.hgt"] {
            fs::write(dir.path().join(name), gradient_bytes()).unwrap();
        }

        let dataset = SrtmDataset::with_cache_size(dir.path(), 2).unwrap();
        for lon in [7.5, 8.5, 9.5] {
            assert_eq!(dataset.elevation_at(46.75, lon, false), Some(900.0));
        }
        for lat in 0..20 {
            assert_eq!(dataset.elevation_at(f64::from(lat) + 0.5, 100.5, false), None);
        }
        let (_, entries) = cache_counts(&dataset);
        assert_eq!(entries, 2);

        // Evicted long ago, mapped again on demand
        assert_eq!(dataset.elevation_at(46.75, 7.5, false), Some(900.0));
        assert_eq!(cache_counts(&dataset).0, 1);
    }

    #[test]
    fn test_zero_cache_size_keeps_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("N46E007.hgt"), gradient_bytes()).unwrap();

        let dataset = SrtmDataset::with_cache_size(dir.path(), 0).unwrap();
        assert_eq!(dataset.elevation_at(46.75, 7.5, false), Some(900.0));
        assert_eq!(dataset.elevation_at(46.25, 7.25, false), Some(1200.0));
        assert_eq!(cache_counts(&dataset), (1, 1));
    }

    #[test]
    fn test_open_rejects_missing_directory() {
        let err = SrtmDataset::open("/nonexistent/srtm").unwrap_err();
        assert!(matches!(err, TrackError::Terrain { .. }));
    }
}
