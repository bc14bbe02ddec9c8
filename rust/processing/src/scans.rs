// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Candidate scan files and how pieces cycle through them

use rebuild_geometry::is_supported_extension;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Scan files that exist on disk, in the order they were supplied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanCatalog {
    paths: Vec<PathBuf>,
}

impl ScanCatalog {
    /// Keep the paths that exist; missing ones are dropped from the cycle
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut missing = 0usize;
        let paths: Vec<PathBuf> = paths
            .into_iter()
            .map(Into::into)
            .filter(|p| {
                let exists = !p.as_os_str().is_empty() && p.exists();
                if !exists {
                    missing += 1;
                }
                exists
            })
            .collect();

        if missing > 0 {
            debug!(missing, kept = paths.len(), "Dropped scan paths that do not exist");
        }
        Self { paths }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// File at the cycle position for `index`, whatever its extension
    pub fn cycle_position(&self, index: usize) -> Option<&Path> {
        if self.paths.is_empty() {
            return None;
        }
        Some(&self.paths[index % self.paths.len()])
    }

    /// Scan for the piece at `index`, or `None` when the file at that
    /// cycle position has an unsupported extension
    pub fn scan_for(&self, index: usize) -> Option<&Path> {
        self.cycle_position(index)
            .filter(|path| is_supported_extension(path))
    }
}
