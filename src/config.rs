//! Settings structs for the directory components.
//!
//! Pure data types with defaults; no parsing or persistence logic.
//! Defaults mirror the behavior of the original map screens.

use crate::coord::GeoPoint;
use std::time::Duration;

/// Complete directory configuration.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Initial map center when no viewport has been reported yet.
    pub default_center: GeoPoint,
    /// Initial zoom level.
    pub default_zoom: u8,
    /// Clustering settings.
    pub cluster: ClusterConfig,
    /// Geocoding gateway settings.
    pub geocode: GeocodeConfig,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            // Taipei Station, the location-picker screen's default.
            default_center: GeoPoint::new(25.0330, 121.5654)
                .expect("default center is in range"),
            default_zoom: 13,
            cluster: ClusterConfig::default(),
            geocode: GeocodeConfig::default(),
        }
    }
}

/// Clustering configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Side length of one grid cell in screen pixels.
    pub grid_size_px: u32,
    /// Smallest member count that forms a cluster; cells below this
    /// stay singleton markers.
    pub min_cluster_size: usize,
    /// Zoom level beyond which clustering is disabled and every record
    /// renders as its own marker.
    pub max_cluster_zoom: u8,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            grid_size_px: 50,
            min_cluster_size: 2,
            max_cluster_zoom: 15,
        }
    }
}

/// Geocoding gateway configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeocodeConfig {
    /// Attempt cap for transient failures (first try included).
    pub max_attempts: u32,
    /// Time budget per attempt; exceeding it counts as a transient
    /// failure eligible for retry.
    pub attempt_timeout: Duration,
    /// Backoff before the first retry; doubles per attempt.
    pub base_backoff: Duration,
    /// Upper bound on a single backoff pause.
    pub max_backoff: Duration,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(10),
            base_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(2),
        }
    }
}
