//! Record types
//!
//! The data model for located entities: committed records, creation
//! inputs, partial updates, and staged drafts pending confirmation.

mod types;

pub use types::{
    CaseStatus, GeoRecord, NewRecord, RecordDraft, RecordId, RecordPatch, UNKNOWN_ADDRESS,
};
