//! Display clustering
//!
//! Groups records that are near each other on screen into clusters for
//! the current viewport. Purely derived state: recomputed from the
//! store on demand, memoized per (viewport, store generation).

mod grid;
mod types;

pub use grid::GridClusterEngine;
pub use types::{ClusterId, ClusterNode, SizeTier};
