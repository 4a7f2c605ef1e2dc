//! Render instruction set.
//!
//! The data handed to the external map widget adapter on each frame.
//! The directory decides *what* to draw; icons, colors and layout stay
//! with the renderer.

use crate::cluster::{ClusterId, SizeTier};
use crate::coord::GeoPoint;
use crate::record::{CaseStatus, RecordId};
use crate::selection::{DetailPayload, RegionId};
use serde::Serialize;

/// A plain marker to draw (a singleton record).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerInstruction {
    pub id: RecordId,
    pub point: GeoPoint,
    pub label: String,
    /// Classification tag the renderer maps to a marker color.
    pub status: Option<CaseStatus>,
}

/// A cluster icon to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterInstruction {
    pub id: ClusterId,
    pub centroid: GeoPoint,
    /// Member count shown on the icon.
    pub count: usize,
    /// Icon tier for the count.
    pub tier: SizeTier,
}

/// An adapter-supplied region polygon echoed back for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPolygon {
    pub id: RegionId,
    pub vertices: Vec<GeoPoint>,
}

/// Everything the adapter needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub markers: Vec<MarkerInstruction>,
    pub clusters: Vec<ClusterInstruction>,
    pub polygons: Vec<RegionPolygon>,
    /// Detail popup content, or `None` when nothing is open.
    pub open_detail: Option<DetailPayload>,
}
