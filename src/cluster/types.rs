//! Cluster type definitions

use crate::coord::GeoPoint;
use crate::record::RecordId;
use serde::Serialize;
use std::fmt;

/// Identifier of a derived cluster, stable for identical input.
///
/// Packs the zoom level and the anchor cell of the cluster, so the same
/// records in the same viewport always yield the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Builds an id from the zoom level and anchor grid cell.
    pub(crate) fn from_cell(zoom: u8, cell_x: u32, cell_y: u32) -> Self {
        ClusterId(((zoom as u64) << 56) | ((cell_x as u64) << 28) | cell_y as u64)
    }

    /// Builds a singleton id from the member record.
    ///
    /// The high bit separates record-derived ids from cell-derived
    /// ones, so singletons sharing a cell never collide.
    pub(crate) fn from_record(id: RecordId) -> Self {
        ClusterId((1 << 63) | id.0)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{:x}", self.0)
    }
}

/// Rendering tier picked from the member count.
///
/// Mirrors the three icon tiers of the original cluster renderer; the
/// engine only emits the tier, styling stays external.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeTier {
    /// Fewer than 10 members.
    Small,
    /// 10 to 99 members.
    Medium,
    /// 100 members or more.
    Large,
}

impl SizeTier {
    /// Buckets a member count into a tier.
    pub fn from_count(count: usize) -> Self {
        match count {
            0..=9 => SizeTier::Small,
            10..=99 => SizeTier::Medium,
            _ => SizeTier::Large,
        }
    }
}

/// A derived, viewport-dependent grouping of nearby records.
///
/// Never persisted; recomputed whenever the viewport or the record set
/// changes. A node with a single member is a singleton and renders as a
/// plain marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterNode {
    /// Stable id derived from the anchor cell.
    pub id: ClusterId,
    /// Arithmetic mean of the member coordinates.
    pub centroid: GeoPoint,
    /// Member record ids in discovery order.
    pub member_ids: Vec<RecordId>,
    /// Rendering tier for the member count.
    pub tier: SizeTier,
}

impl ClusterNode {
    /// Number of member records.
    pub fn count(&self) -> usize {
        self.member_ids.len()
    }

    /// Returns true if the node holds a single record.
    pub fn is_singleton(&self) -> bool {
        self.member_ids.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_tiers() {
        assert_eq!(SizeTier::from_count(1), SizeTier::Small);
        assert_eq!(SizeTier::from_count(9), SizeTier::Small);
        assert_eq!(SizeTier::from_count(10), SizeTier::Medium);
        assert_eq!(SizeTier::from_count(99), SizeTier::Medium);
        assert_eq!(SizeTier::from_count(100), SizeTier::Large);
    }

    #[test]
    fn test_cluster_id_deterministic() {
        assert_eq!(ClusterId::from_cell(13, 5, 7), ClusterId::from_cell(13, 5, 7));
        assert_ne!(ClusterId::from_cell(13, 5, 7), ClusterId::from_cell(13, 7, 5));
        assert_ne!(ClusterId::from_cell(12, 5, 7), ClusterId::from_cell(13, 5, 7));
    }
}
