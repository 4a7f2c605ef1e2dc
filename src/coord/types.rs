//! Coordinate type definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Valid latitude range in degrees.
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range in degrees.
pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;

/// Latitude bound of the Web Mercator projection.
///
/// Records may carry any valid latitude; positions beyond this bound are
/// clamped when projecting to screen pixels for clustering.
pub const MERCATOR_MAX_LAT: f64 = 85.05112877980659;

/// Maximum zoom level accepted from the map widget.
pub const MAX_ZOOM: u8 = 21;

/// Errors that can occur when constructing or projecting coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is outside the valid range (-90.0 to 90.0).
    #[error("invalid latitude: {0} (must be between {MIN_LAT} and {MAX_LAT})")]
    InvalidLatitude(f64),
    /// Longitude is outside the valid range (-180.0 to 180.0).
    #[error("invalid longitude: {0} (must be between {MIN_LNG} and {MAX_LNG})")]
    InvalidLongitude(f64),
    /// Zoom level is outside the valid range (0 to 21).
    #[error("invalid zoom level: {0} (must be at most {MAX_ZOOM})")]
    InvalidZoom(u8),
}

/// A validated geographic position in degrees.
///
/// Construction enforces the coordinate range invariant, so any
/// `GeoPoint` held by the store is known to be in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&lat) || lat.is_nan() {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !(MIN_LNG..=MAX_LNG).contains(&lng) || lng.is_nan() {
            return Err(CoordError::InvalidLongitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[inline]
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// A latitude/longitude aligned bounding box.
///
/// `south <= north` and `west <= east`; boxes spanning the antimeridian
/// are not modeled (the source screens never pan across it).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Creates a bounding box from two corner points.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south: south.min(north),
            west: west.min(east),
            north: south.max(north),
            east: west.max(east),
        }
    }

    /// Returns true if the point lies inside the box (edges inclusive).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lat() >= self.south
            && point.lat() <= self.north
            && point.lng() >= self.west
            && point.lng() <= self.east
    }
}

/// The visible map viewport: zoom level plus geographic bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Map widget zoom level (0 = whole world).
    pub zoom: u8,
    /// Visible geographic bounds.
    pub bounds: BoundingBox,
}

impl Viewport {
    /// Creates a viewport, rejecting out-of-range zoom levels.
    pub fn new(zoom: u8, bounds: BoundingBox) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        Ok(Self { zoom, bounds })
    }
}

/// A position in world-pixel space at a given zoom level.
///
/// The world is a square of `256 * 2^zoom` pixels per side, origin at
/// the northwest corner, following the Web Mercator tile scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}
