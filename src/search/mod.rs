//! Record search
//!
//! Case-insensitive substring matching over the store's display labels.
//! Recomputed fresh against [`LocationStore::all`] on every call; at the
//! expected record-set sizes (tens to low hundreds) no persistent index
//! is needed.
//!
//! An empty or whitespace-only query returns no results: the search box
//! shows no dropdown rather than listing everything.

use crate::record::{CaseStatus, GeoRecord};
use crate::store::LocationStore;

/// Returns the records whose name contains `text`, case-insensitively.
///
/// Results preserve store insertion order; there is no relevance
/// ranking beyond substring containment.
pub fn query<'a>(store: &'a LocationStore, text: &str) -> Vec<&'a GeoRecord> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    store
        .all()
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .collect()
}

/// Returns the records carrying the given classification tag.
pub fn query_status(store: &LocationStore, status: CaseStatus) -> Vec<&GeoRecord> {
    store
        .all()
        .iter()
        .filter(|record| record.status == Some(status))
        .collect()
}
