// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported mesh format: {path}")]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid mesh content: {message}")]
    InvalidContent { message: String },

    #[error("Empty mesh: {0}")]
    EmptyMesh(String),

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),
}

impl Error {
    /// Create an invalid-content error for corrupt mesh data
    pub fn invalid_content(msg: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: msg.into(),
        }
    }
}
