//! Map-tile service boundary.
//!
//! A background map arrives from a remote imagery service as a raster
//! tile keyed by geographic center, zoom level, and imagery kind. The
//! transport is a single blocking call behind [`TileFetcher`]; this
//! module owns the request/response types, a by-request cache, and the
//! pass-through error kind. No retry or cancellation semantics exist at
//! this boundary.

use image::DynamicImage;
use std::cell::RefCell;
use std::collections::HashMap;
use thiserror::Error;

/// Imagery styles the tile service can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageryKind {
    Satellite,
    Terrain,
    Roadmap,
}

impl ImageryKind {
    pub fn name(&self) -> &'static str {
        match self {
            ImageryKind::Satellite => "satellite",
            ImageryKind::Terrain => "terrain",
            ImageryKind::Roadmap => "roadmap",
        }
    }
}

/// A tile request: geographic center, zoom level, imagery kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRequest {
    pub lon: f64,
    pub lat: f64,
    pub zoom: u8,
    pub imagery: ImageryKind,
}

impl TileRequest {
    pub fn new(lon: f64, lat: f64, zoom: u8, imagery: ImageryKind) -> Self {
        TileRequest {
            lon,
            lat,
            zoom,
            imagery,
        }
    }

    /// Cache key; coordinates compare bitwise.
    fn key(&self) -> (u64, u64, u8, ImageryKind) {
        (self.lon.to_bits(), self.lat.to_bits(), self.zoom, self.imagery)
    }
}

/// Failures crossing the tile-service boundary. All recoverable; the
/// caller decides whether to retry.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("network error fetching tile: {0}")]
    Network(String),
    #[error("tile request timed out")]
    Timeout,
    #[error("failed to decode tile image: {0}")]
    Decode(String),
}

/// The transport seam: one blocking call per request.
pub trait TileFetcher {
    fn fetch(&self, request: &TileRequest) -> Result<DynamicImage, TileError>;
}

/// Decode raw tile bytes into a raster handle.
pub fn decode_tile(bytes: &[u8]) -> Result<DynamicImage, TileError> {
    image::load_from_memory(bytes).map_err(|e| TileError::Decode(e.to_string()))
}

/// Wraps a fetcher with a by-request cache: repeated requests hit the
/// service once. Errors are passed through and never cached.
pub struct CachingFetcher<F: TileFetcher> {
    inner: F,
    cache: RefCell<HashMap<(u64, u64, u8, ImageryKind), DynamicImage>>,
}

impl<F: TileFetcher> CachingFetcher<F> {
    pub fn new(inner: F) -> Self {
        CachingFetcher {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_tiles(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<F: TileFetcher> TileFetcher for CachingFetcher<F> {
    fn fetch(&self, request: &TileRequest) -> Result<DynamicImage, TileError> {
        let key = request.key();
        if let Some(tile) = self.cache.borrow().get(&key) {
            log::debug!("tile cache hit for zoom {} {}", request.zoom, request.imagery.name());
            return Ok(tile.clone());
        }
        let tile = self.inner.fetch(request)?;
        self.cache.borrow_mut().insert(key, tile.clone());
        Ok(tile)
    }
}
