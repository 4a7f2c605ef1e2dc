//! Record type definitions

use crate::coord::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown when a record has no resolved address.
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Unique identifier of a record within one [`LocationStore`] instance.
///
/// [`LocationStore`]: crate::store::LocationStore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Case progress state used for marker styling and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Waiting to be handled.
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Work finished.
    Completed,
    /// Matched to a taker.
    Matched,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CaseStatus::Pending => "pending",
            CaseStatus::InProgress => "in progress",
            CaseStatus::Completed => "completed",
            CaseStatus::Matched => "matched",
        };
        f.write_str(label)
    }
}

/// A located, named entity tracked by the directory.
///
/// `id`, `point` and `created_at` are immutable after insertion; only
/// `address`, `notes` and `status` may be patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    /// Unique identifier within the owning store.
    pub id: RecordId,
    /// Display label, matched by text search.
    pub name: String,
    /// Geographic position, validated at construction.
    pub point: GeoPoint,
    /// Human-readable address, resolved asynchronously if absent.
    pub address: Option<String>,
    /// Optional classification tag.
    pub status: Option<CaseStatus>,
    /// Free-text notes, user editable.
    pub notes: Option<String>,
    /// Creation timestamp, set once by the store.
    pub created_at: DateTime<Utc>,
}

impl GeoRecord {
    /// The record's address, or the `"unknown"` placeholder when the
    /// reverse lookup never resolved.
    pub fn address_or_unknown(&self) -> &str {
        self.address.as_deref().unwrap_or(UNKNOWN_ADDRESS)
    }
}

/// Input for creating a record.
///
/// The store assigns an id unless the caller supplies one (bulk loads
/// from an external feed carry their own ids).
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    /// Caller-assigned id, or `None` to let the store generate one.
    pub id: Option<RecordId>,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub status: Option<CaseStatus>,
    pub notes: Option<String>,
}

impl NewRecord {
    /// Creates a record input with the required fields.
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            ..Self::default()
        }
    }

    /// Sets a caller-assigned id.
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the resolved address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the classification tag.
    pub fn with_status(mut self, status: CaseStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the free-text notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update applied by [`LocationStore::update`].
///
/// Only the fields present are merged; `id`, coordinates and
/// `created_at` can never be altered.
///
/// [`LocationStore::update`]: crate::store::LocationStore::update
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub address: Option<String>,
    pub status: Option<CaseStatus>,
    pub notes: Option<String>,
}

impl RecordPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.status.is_none() && self.notes.is_none()
    }
}

/// A record staged by a user interaction but not yet committed.
///
/// Produced by the map-click flow: coordinates plus whatever address
/// the reverse lookup yielded. The caller must confirm the draft before
/// it is added to the store; discarding it performs no mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    /// Clicked position.
    pub point: GeoPoint,
    /// Reverse-geocoded address, `None` when the lookup was unavailable.
    pub address: Option<String>,
    /// Notes entered in the confirmation dialog.
    pub notes: Option<String>,
}

impl RecordDraft {
    /// The draft's address, or the `"unknown"` placeholder.
    pub fn address_or_unknown(&self) -> &str {
        self.address.as_deref().unwrap_or(UNKNOWN_ADDRESS)
    }
}
