// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration loaded from environment variables.

use rebuild_geometry::holes::DEFAULT_MAX_HOLE_EDGES;

/// Default clip tolerance for near-plane vertices.
pub const DEFAULT_CLIP_TOLERANCE: f64 = 1e-6;

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Distance below the plane still treated as on it.
    pub clip_tolerance: f64,
    /// Largest boundary loop filled during repair and after a cut.
    pub max_hole_edges: usize,
    /// Process pieces on the rayon pool instead of sequentially.
    pub parallel: bool,
    /// Report failed pieces individually instead of failing the batch.
    pub best_effort: bool,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            clip_tolerance: std::env::var("REBUILD_CLIP_TOLERANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|t: &f64| t.is_finite() && *t >= 0.0)
                .unwrap_or(defaults.clip_tolerance),
            max_hole_edges: std::env::var("REBUILD_MAX_HOLE_EDGES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_hole_edges),
            parallel: std::env::var("REBUILD_PARALLEL")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.parallel),
            best_effort: std::env::var("REBUILD_BEST_EFFORT")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.best_effort),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clip_tolerance: DEFAULT_CLIP_TOLERANCE,
            max_hole_edges: DEFAULT_MAX_HOLE_EDGES,
            parallel: false,
            best_effort: false,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.clip_tolerance, 1e-6);
        assert_eq!(config.max_hole_edges, 1024);
        assert!(!config.parallel);
        assert!(!config.best_effort);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" yes "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
