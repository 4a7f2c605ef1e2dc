//! Grid-based greedy clustering.
//!
//! Records visible in the viewport are projected to world pixels at the
//! current zoom and bucketed into square grid cells. A cell with at
//! least `min_cluster_size` members forms a cluster; an under-minimum
//! cell merges into an adjacent formed cluster when one exists,
//! otherwise its members stay singletons. The whole partition is
//! recomputed on every query (correctness over micro-optimization at
//! these record counts) and memoized per (viewport, store generation).

use super::types::{ClusterId, ClusterNode, SizeTier};
use crate::config::ClusterConfig;
use crate::coord::{self, GeoPoint, Viewport};
use crate::record::GeoRecord;
use crate::store::LocationStore;
use std::collections::HashMap;
use tracing::debug;

type Cell = (u32, u32);

/// Memoized partition for one (viewport, store generation) pair.
#[derive(Debug)]
struct Memo {
    viewport: Viewport,
    generation: u64,
    clusters: Vec<ClusterNode>,
}

/// Viewport-dependent display clustering over the record store.
#[derive(Debug)]
pub struct GridClusterEngine {
    config: ClusterConfig,
    memo: Option<Memo>,
}

impl GridClusterEngine {
    /// Creates an engine with the given settings.
    pub fn new(config: ClusterConfig) -> Self {
        Self { config, memo: None }
    }

    /// Partitions the records visible in the viewport into clusters.
    ///
    /// Every visible record belongs to exactly one returned node; a
    /// node of size one is a singleton. Identical input (same viewport,
    /// unchanged store) yields identical membership and ordering, and
    /// is served from the memo without recomputation.
    pub fn cluster(&mut self, store: &LocationStore, viewport: &Viewport) -> Vec<ClusterNode> {
        if let Some(memo) = &self.memo {
            if memo.viewport == *viewport && memo.generation == store.generation() {
                return memo.clusters.clone();
            }
        }

        let clusters = self.partition(store, viewport);
        debug!(
            visible_clusters = clusters.len(),
            zoom = viewport.zoom,
            "recomputed cluster partition"
        );
        self.memo = Some(Memo {
            viewport: *viewport,
            generation: store.generation(),
            clusters: clusters.clone(),
        });
        clusters
    }

    /// Drops the memoized partition.
    pub fn invalidate(&mut self) {
        self.memo = None;
    }

    fn partition(&self, store: &LocationStore, viewport: &Viewport) -> Vec<ClusterNode> {
        let visible: Vec<&GeoRecord> = store
            .all()
            .iter()
            .filter(|r| viewport.bounds.contains(&r.point))
            .collect();

        // Past the clustering zoom limit every record stands alone.
        if viewport.zoom > self.config.max_cluster_zoom {
            return visible.into_iter().map(singleton).collect();
        }

        let grid = self.config.grid_size_px.max(1) as f64;
        let min_size = self.config.min_cluster_size.max(1);

        // Bucket records by grid cell, keeping first-touch cell order
        // so the output sequence follows record discovery order.
        let mut cell_order: Vec<Cell> = Vec::new();
        let mut cells: HashMap<Cell, Vec<&GeoRecord>> = HashMap::new();
        for record in visible {
            let px = coord::project(&record.point, viewport.zoom);
            let cell = (cell_index(px.x, grid), cell_index(px.y, grid));
            cells
                .entry(cell)
                .or_insert_with(|| {
                    cell_order.push(cell);
                    Vec::new()
                })
                .push(record);
        }

        // Under-minimum cells merge into an adjacent formed cluster
        // when one exists. Processing order and target choice are both
        // fixed so the result is reproducible.
        let mut under: Vec<Cell> = cells
            .iter()
            .filter(|(_, members)| members.len() < min_size)
            .map(|(cell, _)| *cell)
            .collect();
        under.sort_by_key(|&(x, y)| (y, x));

        let mut merged: HashMap<Cell, Cell> = HashMap::new();
        let mut adopted: HashMap<Cell, Vec<&GeoRecord>> = HashMap::new();
        for cell in under {
            if let Some(target) = lowest_adjacent_formed(cell, &cells, min_size) {
                adopted
                    .entry(target)
                    .or_default()
                    .extend(cells[&cell].iter().copied());
                merged.insert(cell, target);
            }
        }

        let mut nodes = Vec::new();
        for cell in cell_order {
            let members = &cells[&cell];
            if members.len() >= min_size {
                let mut all = members.clone();
                if let Some(extra) = adopted.get(&cell) {
                    all.extend(extra.iter().copied());
                }
                nodes.push(cluster_node(viewport.zoom, cell, &all));
            } else if !merged.contains_key(&cell) {
                nodes.extend(members.iter().copied().map(singleton));
            }
        }
        nodes
    }
}

/// Maps a world-pixel coordinate to its grid cell index.
///
/// A position exactly on a cell boundary belongs to the lower-indexed
/// cell, which keeps clustering reproducible for identical input.
fn cell_index(px: f64, grid: f64) -> u32 {
    let mut index = (px / grid).floor();
    if index > 0.0 && px == index * grid {
        index -= 1.0;
    }
    index.max(0.0) as u32
}

/// The adjacent (8-neighborhood) formed cell with the lowest (y, x),
/// if any neighbor holds at least `min_size` members.
fn lowest_adjacent_formed(
    cell: Cell,
    cells: &HashMap<Cell, Vec<&GeoRecord>>,
    min_size: usize,
) -> Option<Cell> {
    let (cx, cy) = cell;
    let mut best: Option<Cell> = None;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = cx as i64 + dx;
            let ny = cy as i64 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let neighbor = (nx as u32, ny as u32);
            if cells.get(&neighbor).is_some_and(|m| m.len() >= min_size) {
                let better = match best {
                    Some((bx, by)) => (neighbor.1, neighbor.0) < (by, bx),
                    None => true,
                };
                if better {
                    best = Some(neighbor);
                }
            }
        }
    }
    best
}

fn singleton(record: &GeoRecord) -> ClusterNode {
    ClusterNode {
        id: ClusterId::from_record(record.id),
        centroid: record.point,
        member_ids: vec![record.id],
        tier: SizeTier::Small,
    }
}

fn cluster_node(zoom: u8, cell: Cell, members: &[&GeoRecord]) -> ClusterNode {
    let count = members.len() as f64;
    let lat = members.iter().map(|r| r.point.lat()).sum::<f64>() / count;
    let lng = members.iter().map(|r| r.point.lng()).sum::<f64>() / count;
    // The mean of in-range coordinates is in range.
    let centroid = GeoPoint::new(lat, lng).unwrap_or(members[0].point);

    ClusterNode {
        id: ClusterId::from_cell(zoom, cell.0, cell.1),
        centroid,
        member_ids: members.iter().map(|r| r.id).collect(),
        tier: SizeTier::from_count(members.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::BoundingBox;
    use crate::record::{NewRecord, RecordId};
    use std::collections::HashSet;

    fn viewport(zoom: u8) -> Viewport {
        Viewport::new(zoom, BoundingBox::new(20.0, 118.0, 27.0, 123.0)).unwrap()
    }

    fn store_with(points: &[(f64, f64)]) -> LocationStore {
        let mut store = LocationStore::new();
        for (i, (lat, lng)) in points.iter().enumerate() {
            store
                .add(NewRecord::new(format!("r{}", i), *lat, *lng))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_same_cell_records_cluster_together() {
        // Two records a few meters apart share a cell at city zoom.
        let store = store_with(&[(25.0330, 121.5654), (25.03301, 121.56541)]);
        let mut engine = GridClusterEngine::new(ClusterConfig::default());

        let nodes = engine.cluster(&store, &viewport(13));
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].count(), 2);
        assert_eq!(nodes[0].tier, SizeTier::Small);
    }

    #[test]
    fn test_distant_records_stay_singletons() {
        let store = store_with(&[(25.0330, 121.5654), (22.9908, 120.2133)]);
        let mut engine = GridClusterEngine::new(ClusterConfig::default());

        let nodes = engine.cluster(&store, &viewport(13));
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.is_singleton()));
    }

    #[test]
    fn test_partition_covers_every_visible_record_once() {
        let store = store_with(&[
            (25.0330, 121.5654),
            (25.0331, 121.5655),
            (25.0332, 121.5656),
            (22.9908, 120.2133),
            (24.1477, 120.6736),
        ]);
        let mut engine = GridClusterEngine::new(ClusterConfig::default());

        let vp = viewport(11);
        let nodes = engine.cluster(&store, &vp);

        let mut seen: HashSet<RecordId> = HashSet::new();
        for node in &nodes {
            for id in &node.member_ids {
                assert!(seen.insert(*id), "record {} appears twice", id);
            }
        }
        let visible: HashSet<RecordId> = store
            .all()
            .iter()
            .filter(|r| vp.bounds.contains(&r.point))
            .map(|r| r.id)
            .collect();
        assert_eq!(seen, visible);
    }

    #[test]
    fn test_records_outside_viewport_excluded() {
        let store = store_with(&[(25.0330, 121.5654), (51.5072, -0.1276)]);
        let mut engine = GridClusterEngine::new(ClusterConfig::default());

        let nodes = engine.cluster(&store, &viewport(13));
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let store = store_with(&[
            (25.0330, 121.5654),
            (25.0331, 121.5655),
            (22.9908, 120.2133),
            (22.9909, 120.2134),
        ]);
        let vp = viewport(12);

        let mut engine_a = GridClusterEngine::new(ClusterConfig::default());
        let mut engine_b = GridClusterEngine::new(ClusterConfig::default());
        assert_eq!(engine_a.cluster(&store, &vp), engine_b.cluster(&store, &vp));
    }

    #[test]
    fn test_no_clustering_past_zoom_limit() {
        let store = store_with(&[(25.0330, 121.5654), (25.03301, 121.56541)]);
        let mut engine = GridClusterEngine::new(ClusterConfig::default());

        let nodes = engine.cluster(&store, &viewport(16));
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| n.is_singleton()));

        // Singleton ids stay distinct even in a shared cell.
        assert_ne!(nodes[0].id, nodes[1].id);
    }

    #[test]
    fn test_centroid_is_member_mean() {
        let store = store_with(&[(25.0, 121.0), (25.001, 121.001)]);
        let mut engine = GridClusterEngine::new(ClusterConfig {
            grid_size_px: 200,
            ..ClusterConfig::default()
        });

        let nodes = engine.cluster(&store, &viewport(13));
        assert_eq!(nodes.len(), 1);
        assert!((nodes[0].centroid.lat() - 25.0005).abs() < 1e-9);
        assert!((nodes[0].centroid.lng() - 121.0005).abs() < 1e-9);
    }

    #[test]
    fn test_memo_reused_until_store_changes() {
        let mut store = store_with(&[(25.0330, 121.5654)]);
        let mut engine = GridClusterEngine::new(ClusterConfig::default());
        let vp = viewport(13);

        let first = engine.cluster(&store, &vp);
        let second = engine.cluster(&store, &vp);
        assert_eq!(first, second);

        // A mutation invalidates the memo through the generation.
        store.add(NewRecord::new("new", 25.03301, 121.56541)).unwrap();
        let third = engine.cluster(&store, &vp);
        assert_ne!(first, third);
    }

    #[test]
    fn test_boundary_pixel_assigned_to_lower_cell() {
        assert_eq!(cell_index(0.0, 50.0), 0);
        assert_eq!(cell_index(49.999, 50.0), 0);
        // Exactly on the boundary: lower-indexed cell.
        assert_eq!(cell_index(50.0, 50.0), 0);
        assert_eq!(cell_index(50.001, 50.0), 1);
        assert_eq!(cell_index(100.0, 50.0), 1);
    }

    #[test]
    fn test_member_order_follows_insertion_order() {
        let store = store_with(&[(25.0330, 121.5654), (25.03301, 121.56541), (25.03302, 121.56542)]);
        let mut engine = GridClusterEngine::new(ClusterConfig::default());

        let nodes = engine.cluster(&store, &viewport(13));
        assert_eq!(nodes.len(), 1);
        let ids: Vec<u64> = nodes[0].member_ids.iter().map(|id| id.0).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
