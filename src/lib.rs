//! Geomark - an in-memory geo-annotation directory
//!
//! This library provides the core logic shared by map-based annotation
//! screens: an authoritative store of geo-located records, text search
//! over them, viewport-dependent display clustering, a geocoding gateway
//! with caching/coalescing/retry, and a selection state machine.
//!
//! Rendering is an external concern: the directory consumes viewport and
//! click events and produces a render instruction set (markers, clusters,
//! polygons, open detail) that a map widget adapter draws.
//!
//! # High-Level API
//!
//! For most use cases, the [`directory`] module provides a facade:
//!
//! ```ignore
//! use geomark::directory::GeoDirectory;
//! use geomark::geocode::NominatimClient;
//! use geomark::config::DirectoryConfig;
//!
//! let client = NominatimClient::new()?;
//! let mut directory = GeoDirectory::new(DirectoryConfig::default(), client);
//!
//! // Stage a record from a map click, then commit it.
//! let draft = directory.handle_click(25.0330, 121.5654).await?;
//! let id = directory.confirm_staged("Taipei Station".to_string())?;
//! ```

pub mod cluster;
pub mod config;
pub mod coord;
pub mod directory;
pub mod geocode;
pub mod logging;
pub mod record;
pub mod search;
pub mod selection;
pub mod store;

/// Version of the geomark library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
