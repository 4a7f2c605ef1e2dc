//! Directory facade.
//!
//! Wires the store, search, cluster engine, geocoding gateway and
//! selection controller together behind the API the map widget adapter
//! drives: viewport and click events in, render instructions out.

use super::render::{ClusterInstruction, MarkerInstruction, RegionPolygon, RenderState};
use crate::cluster::{ClusterId, ClusterNode, GridClusterEngine};
use crate::config::DirectoryConfig;
use crate::coord::{BoundingBox, CoordError, GeoPoint, Viewport, MAX_ZOOM};
use crate::geocode::{
    ForwardOutcome, GeocodeClient, GeocodeError, GeocodingGateway, ReverseOutcome, SeqCounter,
};
use crate::record::{GeoRecord, NewRecord, RecordDraft, RecordId, RecordPatch};
use crate::search;
use crate::selection::{DetailPayload, RegionId, SelectionController, SelectionState, SelectionTarget};
use crate::store::{LocationStore, StoreError};
use thiserror::Error;
use tracing::{debug, info};

/// Span of the fallback viewport built around the configured center
/// before the widget reports a real one.
const DEFAULT_VIEW_SPAN_DEG: f64 = 0.25;

/// Errors surfaced by directory operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DirectoryError {
    /// A confirm was issued with no staged record present.
    #[error("no staged record to confirm")]
    NothingStaged,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Coord(#[from] CoordError),
}

/// Resolution of a forward-geocode locate request.
///
/// `Superseded` means a newer locate was issued while this one was in
/// flight; the stale result must be discarded, not applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Locate {
    /// The place to pan the viewport to.
    Found { point: GeoPoint, address: String },
    /// The service definitively found nothing.
    NoMatch,
    /// A newer request replaced this one.
    Superseded,
    /// The retry budget was exhausted; the directory stays usable.
    Failed(GeocodeError),
}

/// The geo-annotation directory.
///
/// Single-owner by design: one instance per screen, driven by the UI
/// event loop. Only the geocoding calls suspend.
pub struct GeoDirectory<C> {
    store: LocationStore,
    engine: GridClusterEngine,
    selection: SelectionController,
    gateway: GeocodingGateway<C>,
    viewport: Viewport,
    staged: Option<RecordDraft>,
    regions: Vec<RegionPolygon>,
    locate_seq: SeqCounter,
}

impl<C: GeocodeClient> GeoDirectory<C> {
    /// Creates a directory over the given geocoding client.
    pub fn new(config: DirectoryConfig, client: C) -> Self {
        let center = config.default_center;
        let half = DEFAULT_VIEW_SPAN_DEG / 2.0;
        let bounds = BoundingBox::new(
            (center.lat() - half).max(-90.0),
            (center.lng() - half).max(-180.0),
            (center.lat() + half).min(90.0),
            (center.lng() + half).min(180.0),
        );
        // A misconfigured default zoom is clamped rather than rejected.
        let zoom = config.default_zoom.min(MAX_ZOOM);
        let viewport = Viewport::new(zoom, bounds).expect("clamped zoom is in range");

        Self {
            store: LocationStore::new(),
            engine: GridClusterEngine::new(config.cluster),
            selection: SelectionController::new(),
            gateway: GeocodingGateway::new(client, config.geocode),
            viewport,
            staged: None,
            regions: Vec::new(),
            locate_seq: SeqCounter::new(),
        }
    }

    // ---- initial load and CRUD -------------------------------------

    /// Loads the initial dataset in order.
    ///
    /// Addresses are taken as supplied; absent ones stay unset until
    /// explicitly resolved. Stops at the first invalid record.
    pub fn load(&mut self, records: Vec<NewRecord>) -> Result<Vec<RecordId>, StoreError> {
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(self.store.add(record)?);
        }
        info!(count = ids.len(), "initial dataset loaded");
        Ok(ids)
    }

    /// Adds a record directly (bypassing the staged flow).
    pub fn add(&mut self, record: NewRecord) -> Result<RecordId, StoreError> {
        self.store.add(record)
    }

    /// Patches an existing record.
    pub fn update(&mut self, id: RecordId, patch: RecordPatch) -> Result<(), StoreError> {
        self.store.update(id, patch)
    }

    /// Removes a record; a selection pointing at it closes implicitly.
    pub fn remove(&mut self, id: RecordId) -> Result<(), StoreError> {
        self.store.remove(id)?;
        self.selection.record_removed(id);
        Ok(())
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &LocationStore {
        &self.store
    }

    // ---- staged-record click flow ----------------------------------

    /// Handles a map click: validates the position, resolves its
    /// address, and stages a draft pending confirmation.
    ///
    /// Nothing is committed to the store; an unavailable address keeps
    /// the draft usable with a placeholder.
    pub async fn handle_click(&mut self, lat: f64, lng: f64) -> Result<RecordDraft, DirectoryError> {
        let point = GeoPoint::new(lat, lng)?;

        let address = match self.gateway.reverse(&point).await {
            ReverseOutcome::Address(address) => Some(address),
            ReverseOutcome::Unavailable => None,
        };

        let draft = RecordDraft {
            point,
            address,
            notes: None,
        };
        debug!(point = %point, resolved = draft.address.is_some(), "record staged");
        self.staged = Some(draft.clone());
        Ok(draft)
    }

    /// The currently staged draft, if any.
    pub fn staged(&self) -> Option<&RecordDraft> {
        self.staged.as_ref()
    }

    /// Updates the notes on the staged draft (the dialog's notes box).
    pub fn set_staged_notes(&mut self, notes: impl Into<String>) {
        if let Some(draft) = self.staged.as_mut() {
            draft.notes = Some(notes.into());
        }
    }

    /// Commits the staged draft under the given name.
    pub fn confirm_staged(&mut self, name: impl Into<String>) -> Result<RecordId, DirectoryError> {
        let draft = self.staged.take().ok_or(DirectoryError::NothingStaged)?;

        let mut record = NewRecord::new(name, draft.point.lat(), draft.point.lng());
        record.address = draft.address;
        record.notes = draft.notes;

        let id = self.store.add(record)?;
        info!(id = %id, "staged record committed");
        Ok(id)
    }

    /// Discards the staged draft without mutating anything.
    ///
    /// Returns true if a draft was present.
    pub fn discard_staged(&mut self) -> bool {
        self.staged.take().is_some()
    }

    // ---- search and locate -----------------------------------------

    /// Text search over record names (see [`search::query`]).
    pub fn search(&self, text: &str) -> Vec<&GeoRecord> {
        search::query(&self.store, text)
    }

    /// Forward-geocodes free text into a pan target.
    ///
    /// Each call supersedes the previous one: if a newer locate is
    /// issued while this one is in flight, the late result comes back
    /// as [`Locate::Superseded`] and must not be applied.
    pub async fn locate(&self, query: &str) -> Locate {
        let token = self.locate_seq.issue();
        let outcome = self.gateway.forward(query).await;

        if !self.locate_seq.is_current(token) {
            debug!(query, "discarding stale locate result");
            return Locate::Superseded;
        }

        match outcome {
            Ok(ForwardOutcome::Found(place)) => Locate::Found {
                point: place.point,
                address: place.formatted_address,
            },
            Ok(ForwardOutcome::NoMatch) => Locate::NoMatch,
            Err(error) => Locate::Failed(error),
        }
    }

    // ---- viewport and clustering -----------------------------------

    /// Applies a viewport change from the map widget.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// The current viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The cluster partition for the current viewport.
    pub fn clusters(&mut self) -> Vec<ClusterNode> {
        self.engine.cluster(&self.store, &self.viewport)
    }

    // ---- selection -------------------------------------------------

    /// Opens a marker's detail.
    pub fn select_marker(&mut self, id: RecordId) {
        self.selection.select(SelectionTarget::Marker(id));
    }

    /// Opens a cluster summary.
    pub fn select_cluster(&mut self, id: ClusterId) {
        self.selection.select(SelectionTarget::Cluster(id));
    }

    /// Opens a region summary.
    pub fn select_region(&mut self, id: RegionId) {
        self.selection.select(SelectionTarget::Region(id));
    }

    /// Closes the open detail.
    pub fn close_detail(&mut self) {
        self.selection.close();
    }

    /// The current selection state.
    pub fn selection(&self) -> SelectionState {
        self.selection.state()
    }

    // ---- rendering -------------------------------------------------

    /// Replaces the adapter-supplied region polygons.
    pub fn set_regions(&mut self, regions: Vec<RegionPolygon>) {
        self.regions = regions;
    }

    /// Composes the render instruction set for the current frame.
    pub fn render_state(&mut self) -> RenderState {
        let nodes = self.engine.cluster(&self.store, &self.viewport);

        let mut markers = Vec::new();
        let mut clusters = Vec::new();
        for node in &nodes {
            if node.is_singleton() {
                if let Some(record) = self.store.get(node.member_ids[0]) {
                    markers.push(MarkerInstruction {
                        id: record.id,
                        point: record.point,
                        label: record.name.clone(),
                        status: record.status,
                    });
                }
            } else {
                clusters.push(ClusterInstruction {
                    id: node.id,
                    centroid: node.centroid,
                    count: node.count(),
                    tier: node.tier,
                });
            }
        }

        let open_detail: Option<DetailPayload> = self.selection.detail(&self.store, &nodes);

        RenderState {
            markers,
            clusters,
            polygons: self.regions.clone(),
            open_detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::MockGeocodeClient;
    use crate::record::CaseStatus;

    fn directory(client: MockGeocodeClient) -> GeoDirectory<MockGeocodeClient> {
        GeoDirectory::new(DirectoryConfig::default(), client)
    }

    #[tokio::test]
    async fn test_out_of_range_default_zoom_is_clamped() {
        let config = DirectoryConfig {
            default_zoom: 99,
            ..DirectoryConfig::default()
        };
        let dir = GeoDirectory::new(config, MockGeocodeClient::empty());
        assert_eq!(dir.viewport().zoom, MAX_ZOOM);
    }

    #[tokio::test]
    async fn test_click_stages_without_committing() {
        let mut dir = directory(MockGeocodeClient::with_place(25.0, 121.5, "somewhere"));

        let draft = dir.handle_click(25.0330, 121.5654).await.unwrap();
        assert_eq!(draft.address.as_deref(), Some("somewhere"));
        assert!(dir.store().is_empty());
        assert!(dir.staged().is_some());
    }

    #[tokio::test]
    async fn test_confirm_commits_staged_draft() {
        let mut dir = directory(MockGeocodeClient::with_place(25.0, 121.5, "somewhere"));

        dir.handle_click(25.0330, 121.5654).await.unwrap();
        dir.set_staged_notes("front plaza");
        let id = dir.confirm_staged("Taipei Station").unwrap();

        let record = dir.store().get(id).unwrap();
        assert_eq!(record.name, "Taipei Station");
        assert_eq!(record.address.as_deref(), Some("somewhere"));
        assert_eq!(record.notes.as_deref(), Some("front plaza"));
        assert!(dir.staged().is_none());
    }

    #[tokio::test]
    async fn test_discard_performs_no_mutation() {
        let mut dir = directory(MockGeocodeClient::with_place(25.0, 121.5, "somewhere"));

        dir.handle_click(25.0330, 121.5654).await.unwrap();
        assert!(dir.discard_staged());
        assert!(dir.store().is_empty());
        assert!(!dir.discard_staged());
        assert!(matches!(
            dir.confirm_staged("x"),
            Err(DirectoryError::NothingStaged)
        ));
    }

    #[tokio::test]
    async fn test_click_with_unavailable_address_still_stages() {
        let mut dir = directory(MockGeocodeClient::empty());

        let draft = dir.handle_click(25.0330, 121.5654).await.unwrap();
        assert!(draft.address.is_none());
        assert_eq!(draft.address_or_unknown(), "unknown");

        let id = dir.confirm_staged("Unnamed spot").unwrap();
        assert_eq!(dir.store().get(id).unwrap().address_or_unknown(), "unknown");
    }

    #[tokio::test]
    async fn test_click_rejects_invalid_coordinates() {
        let mut dir = directory(MockGeocodeClient::empty());
        let result = dir.handle_click(95.0, 0.0).await;
        assert!(matches!(result, Err(DirectoryError::Coord(_))));
        assert!(dir.staged().is_none());
    }

    #[tokio::test]
    async fn test_remove_closes_selection_on_selected_marker() {
        let mut dir = directory(MockGeocodeClient::empty());
        let id = dir.add(NewRecord::new("a", 25.0, 121.5)).unwrap();

        dir.select_marker(id);
        assert_eq!(dir.selection(), SelectionState::Marker(id));

        dir.remove(id).unwrap();
        assert_eq!(dir.selection(), SelectionState::None);
    }

    #[tokio::test]
    async fn test_render_state_splits_markers_and_clusters() {
        let mut dir = directory(MockGeocodeClient::empty());
        // Two records in one cell, one far away but in view.
        dir.add(NewRecord::new("a", 25.0330, 121.5654).with_status(CaseStatus::Pending))
            .unwrap();
        dir.add(NewRecord::new("b", 25.03301, 121.56541)).unwrap();
        dir.add(NewRecord::new("c", 25.1000, 121.5000)).unwrap();

        dir.set_viewport(
            Viewport::new(13, BoundingBox::new(24.9, 121.4, 25.2, 121.7)).unwrap(),
        );

        let frame = dir.render_state();
        assert_eq!(frame.clusters.len(), 1);
        assert_eq!(frame.clusters[0].count, 2);
        assert_eq!(frame.markers.len(), 1);
        assert_eq!(frame.markers[0].label, "c");
        assert!(frame.open_detail.is_none());
    }

    #[tokio::test]
    async fn test_render_state_includes_detail_and_polygons() {
        let mut dir = directory(MockGeocodeClient::empty());
        let id = dir.add(NewRecord::new("a", 25.0330, 121.5654)).unwrap();
        dir.select_marker(id);
        dir.set_regions(vec![RegionPolygon {
            id: RegionId(1),
            vertices: vec![
                GeoPoint::new(25.0, 121.5).unwrap(),
                GeoPoint::new(25.1, 121.5).unwrap(),
                GeoPoint::new(25.1, 121.6).unwrap(),
            ],
        }]);

        let frame = dir.render_state();
        assert_eq!(frame.polygons.len(), 1);
        match frame.open_detail {
            Some(DetailPayload::Record(record)) => assert_eq!(record.id, id),
            other => panic!("expected record detail, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_locate_found() {
        let dir = directory(MockGeocodeClient::with_place(25.0478, 121.5170, "Taipei Station"));
        match dir.locate("taipei station").await {
            Locate::Found { address, .. } => assert_eq!(address, "Taipei Station"),
            other => panic!("expected found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_locate_no_match_is_not_a_failure() {
        let dir = directory(MockGeocodeClient::empty());
        assert_eq!(dir.locate("nonexistent place xyz").await, Locate::NoMatch);
    }
}
