// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the piece pipeline

use thiserror::Error;

/// Result type for processing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error("Geometry error: {0}")]
    Geometry(#[from] rebuild_geometry::Error),

    #[error("Piece {index} ({piece_id}): {source}")]
    Piece {
        index: usize,
        piece_id: String,
        #[source]
        source: rebuild_geometry::Error,
    },

    #[error("No processed project: run processing at least once before requesting an OBJ export")]
    NoProcessedProject,

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Archive(err.to_string())
    }
}
