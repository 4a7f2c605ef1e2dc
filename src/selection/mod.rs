//! Selection tracking
//!
//! A small state machine over the single currently "open" entity whose
//! detail is shown to the user. Transitions are total: every event from
//! every state lands in one of the four defined states, so the detail
//! popup can never get stuck.

use crate::cluster::{ClusterId, ClusterNode};
use crate::record::{GeoRecord, RecordId};
use crate::store::LocationStore;
use serde::Serialize;
use tracing::debug;

/// Identifier of an adapter-supplied region polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RegionId(pub u32);

/// The entity a select event points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    Marker(RecordId),
    Cluster(ClusterId),
    Region(RegionId),
}

/// The single current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// Nothing is open.
    #[default]
    None,
    /// A marker's record detail is open.
    Marker(RecordId),
    /// A cluster summary is open.
    Cluster(ClusterId),
    /// A region summary is open.
    Region(RegionId),
}

/// Detail payload the external renderer shows for the selection.
///
/// The controller only assembles data; it never renders anything.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailPayload {
    /// The selected record.
    Record(GeoRecord),
    /// Summary of the selected cluster.
    Cluster(ClusterNode),
    /// The selected region; its display data lives with the adapter.
    Region(RegionId),
}

/// Tracks and transitions the current selection.
#[derive(Debug, Default)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    /// Creates a controller with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current selection.
    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Opens the given entity from any state.
    ///
    /// Selecting the already-selected entity is a no-op. Returns true
    /// if the state changed.
    pub fn select(&mut self, target: SelectionTarget) -> bool {
        let next = match target {
            SelectionTarget::Marker(id) => SelectionState::Marker(id),
            SelectionTarget::Cluster(id) => SelectionState::Cluster(id),
            SelectionTarget::Region(id) => SelectionState::Region(id),
        };
        if next == self.state {
            return false;
        }
        debug!(from = ?self.state, to = ?next, "selection changed");
        self.state = next;
        true
    }

    /// Closes the open detail; a no-op when nothing is open.
    pub fn close(&mut self) {
        if self.state != SelectionState::None {
            debug!(from = ?self.state, "selection closed");
            self.state = SelectionState::None;
        }
    }

    /// Reacts to a record removal: a selection pointing at the removed
    /// record closes implicitly, anything else is untouched.
    pub fn record_removed(&mut self, id: RecordId) {
        if self.state == SelectionState::Marker(id) {
            debug!(id = %id, "selected record removed, closing detail");
            self.state = SelectionState::None;
        }
    }

    /// Assembles the detail payload for the current selection.
    ///
    /// Returns `None` when nothing is open or the selected entity no
    /// longer exists in the given snapshot.
    pub fn detail(&self, store: &LocationStore, clusters: &[ClusterNode]) -> Option<DetailPayload> {
        match self.state {
            SelectionState::None => None,
            SelectionState::Marker(id) => store.get(id).cloned().map(DetailPayload::Record),
            SelectionState::Cluster(id) => clusters
                .iter()
                .find(|node| node.id == id)
                .cloned()
                .map(DetailPayload::Cluster),
            SelectionState::Region(id) => Some(DetailPayload::Region(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewRecord;

    #[test]
    fn test_starts_with_nothing_selected() {
        let controller = SelectionController::new();
        assert_eq!(controller.state(), SelectionState::None);
    }

    #[test]
    fn test_select_marker() {
        let mut controller = SelectionController::new();
        assert!(controller.select(SelectionTarget::Marker(RecordId(5))));
        assert_eq!(controller.state(), SelectionState::Marker(RecordId(5)));
    }

    #[test]
    fn test_reselect_same_marker_is_noop() {
        let mut controller = SelectionController::new();
        controller.select(SelectionTarget::Marker(RecordId(5)));
        assert!(!controller.select(SelectionTarget::Marker(RecordId(5))));
        assert_eq!(controller.state(), SelectionState::Marker(RecordId(5)));
    }

    #[test]
    fn test_select_replaces_previous_selection() {
        let mut controller = SelectionController::new();
        controller.select(SelectionTarget::Marker(RecordId(5)));
        controller.select(SelectionTarget::Region(RegionId(2)));
        assert_eq!(controller.state(), SelectionState::Region(RegionId(2)));
    }

    #[test]
    fn test_close_from_selected_and_from_none() {
        let mut controller = SelectionController::new();
        controller.select(SelectionTarget::Marker(RecordId(5)));
        controller.close();
        assert_eq!(controller.state(), SelectionState::None);
        // close() from None stays None.
        controller.close();
        assert_eq!(controller.state(), SelectionState::None);
    }

    #[test]
    fn test_removing_selected_record_closes() {
        let mut controller = SelectionController::new();
        controller.select(SelectionTarget::Marker(RecordId(5)));
        controller.record_removed(RecordId(5));
        assert_eq!(controller.state(), SelectionState::None);
    }

    #[test]
    fn test_removing_other_record_keeps_selection() {
        let mut controller = SelectionController::new();
        controller.select(SelectionTarget::Marker(RecordId(5)));
        controller.record_removed(RecordId(6));
        assert_eq!(controller.state(), SelectionState::Marker(RecordId(5)));
    }

    #[test]
    fn test_transitions_are_total() {
        // Every event from every state lands in a defined state.
        let targets = [
            SelectionTarget::Marker(RecordId(1)),
            SelectionTarget::Cluster(ClusterId::from_record(RecordId(2))),
            SelectionTarget::Region(RegionId(3)),
        ];
        for start in &targets {
            for event in &targets {
                let mut controller = SelectionController::new();
                controller.select(*start);
                controller.select(*event);
                controller.record_removed(RecordId(1));
                controller.close();
                assert_eq!(controller.state(), SelectionState::None);
            }
        }
    }

    #[test]
    fn test_detail_for_marker() {
        let mut store = LocationStore::new();
        let id = store
            .add(NewRecord::new("Taipei Station", 25.0330, 121.5654))
            .unwrap();

        let mut controller = SelectionController::new();
        controller.select(SelectionTarget::Marker(id));

        match controller.detail(&store, &[]) {
            Some(DetailPayload::Record(record)) => assert_eq!(record.name, "Taipei Station"),
            other => panic!("expected record detail, got {:?}", other),
        }
    }

    #[test]
    fn test_detail_none_when_nothing_selected() {
        let store = LocationStore::new();
        let controller = SelectionController::new();
        assert!(controller.detail(&store, &[]).is_none());
    }

    #[test]
    fn test_detail_region_echoes_id() {
        let store = LocationStore::new();
        let mut controller = SelectionController::new();
        controller.select(SelectionTarget::Region(RegionId(9)));
        assert_eq!(
            controller.detail(&store, &[]),
            Some(DetailPayload::Region(RegionId(9)))
        );
    }
}
