//! High-level directory facade.
//!
//! This module wires the core components together behind a single API,
//! following the Facade pattern: the map widget adapter feeds events in
//! (clicks, viewport changes, select/close) and draws the render
//! instruction set that comes back out.
//!
//! # Example
//!
//! ```ignore
//! use geomark::config::DirectoryConfig;
//! use geomark::directory::GeoDirectory;
//! use geomark::geocode::NominatimClient;
//!
//! let client = NominatimClient::new()?;
//! let mut directory = GeoDirectory::new(DirectoryConfig::default(), client);
//!
//! let draft = directory.handle_click(25.0330, 121.5654).await?;
//! let id = directory.confirm_staged("Taipei Station")?;
//! let frame = directory.render_state();
//! ```

mod facade;
mod render;

pub use facade::{DirectoryError, GeoDirectory, Locate};
pub use render::{ClusterInstruction, MarkerInstruction, RegionPolygon, RenderState};
