//! Coordinate module
//!
//! Provides validated geographic positions, viewport types, and the
//! Web Mercator world-pixel projection used to place records on the
//! cluster grid.

mod types;

pub use types::{
    BoundingBox, CoordError, GeoPoint, PixelPoint, Viewport, MAX_LAT, MAX_LNG, MAX_ZOOM,
    MERCATOR_MAX_LAT, MIN_LAT, MIN_LNG,
};

use std::f64::consts::PI;

/// Pixel side length of one Web Mercator tile.
const TILE_SIZE: f64 = 256.0;

/// Projects a geographic position to world-pixel coordinates.
///
/// Latitudes beyond the Web Mercator bound are clamped, so polar
/// records still land on the grid instead of projecting to infinity.
///
/// # Arguments
///
/// * `point` - The position to project
/// * `zoom` - Zoom level (0 to 21)
#[inline]
pub fn project(point: &GeoPoint, zoom: u8) -> PixelPoint {
    let world = TILE_SIZE * 2.0_f64.powi(zoom as i32);

    let x = (point.lng() + 180.0) / 360.0 * world;

    let lat = point.lat().clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
    let lat_rad = lat * PI / 180.0;
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * world;

    PixelPoint { x, y }
}
