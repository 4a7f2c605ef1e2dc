//! Location store
//!
//! Owns the authoritative, insertion-ordered set of records. All
//! mutations validate their inputs and bump a generation counter that
//! downstream consumers (the cluster engine) use to invalidate memoized
//! derived state.

use crate::coord::{CoordError, GeoPoint};
use crate::record::{GeoRecord, NewRecord, RecordId, RecordPatch};
use chrono::Utc;
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by store mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Latitude or longitude out of range; the record was not stored.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordError),
    /// No record with the given id exists.
    #[error("record {0} not found")]
    NotFound(RecordId),
    /// A caller-supplied id collides with an existing record.
    #[error("record id {0} already exists")]
    DuplicateId(RecordId),
}

/// Insertion-ordered collection of [`GeoRecord`]s.
///
/// Single-writer by design: the owning event loop applies mutations in
/// issue order, so reads always observe a consistent snapshot.
#[derive(Debug, Default)]
pub struct LocationStore {
    records: Vec<GeoRecord>,
    next_id: u64,
    generation: u64,
}

impl LocationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, validating coordinates and id uniqueness.
    ///
    /// Assigns a fresh id when the caller did not supply one. Returns
    /// the id of the stored record. On any error the store is
    /// unchanged.
    pub fn add(&mut self, input: NewRecord) -> Result<RecordId, StoreError> {
        let point = GeoPoint::new(input.lat, input.lng)?;

        let id = match input.id {
            Some(id) => {
                if self.records.iter().any(|r| r.id == id) {
                    return Err(StoreError::DuplicateId(id));
                }
                // Keep generated ids ahead of caller-supplied ones.
                self.next_id = self.next_id.max(id.0.saturating_add(1));
                id
            }
            None => {
                let id = RecordId(self.next_id);
                self.next_id += 1;
                id
            }
        };

        self.records.push(GeoRecord {
            id,
            name: input.name,
            point,
            address: input.address,
            status: input.status,
            notes: input.notes,
            created_at: Utc::now(),
        });
        self.generation += 1;

        debug!(id = %id, total = self.records.len(), "record added");
        Ok(id)
    }

    /// Merges the provided fields into an existing record.
    ///
    /// Only `address`, `status` and `notes` can change; `id`,
    /// coordinates and `created_at` are immutable.
    pub fn update(&mut self, id: RecordId, patch: RecordPatch) -> Result<(), StoreError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        if patch.is_empty() {
            return Ok(());
        }
        if let Some(address) = patch.address {
            record.address = Some(address);
        }
        if let Some(status) = patch.status {
            record.status = Some(status);
        }
        if let Some(notes) = patch.notes {
            record.notes = Some(notes);
        }
        self.generation += 1;

        debug!(id = %id, "record updated");
        Ok(())
    }

    /// Removes a record unconditionally.
    ///
    /// The caller is responsible for closing a selection that pointed
    /// at the removed record (the directory facade does this).
    pub fn remove(&mut self, id: RecordId) -> Result<GeoRecord, StoreError> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let removed = self.records.remove(index);
        self.generation += 1;

        debug!(id = %id, total = self.records.len(), "record removed");
        Ok(removed)
    }

    /// Looks up a record by id.
    pub fn get(&self, id: RecordId) -> Option<&GeoRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Read-only snapshot of all records in insertion order.
    pub fn all(&self) -> &[GeoRecord] {
        &self.records
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Monotone counter bumped by every successful mutation.
    ///
    /// Consumers compare generations to detect that memoized derived
    /// state (cluster partitions) is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
