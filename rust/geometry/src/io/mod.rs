// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scan file import
//!
//! Formats are chosen by file extension, case-insensitively. Every loader
//! produces a triangle soup or indexed mesh which is then welded so shared
//! edges become shared vertices.

mod obj;
mod ply;
mod stl;

pub use obj::parse_obj;

use crate::error::{Error, Result};
use crate::mesh::{Mesh, MERGE_TOLERANCE};
use nalgebra::Point3;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Mesh file formats recognised as scans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    Obj,
    Stl,
    Ply,
    /// Recognised but not decodable; loading reports `UnsupportedFormat`
    Fbx,
}

impl MeshFormat {
    /// Format for a bare extension such as `"OBJ"` or `"stl"`
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "obj" => Some(Self::Obj),
            "stl" => Some(Self::Stl),
            "ply" => Some(Self::Ply),
            "fbx" => Some(Self::Fbx),
            _ => None,
        }
    }

    /// Format for the extension of `path`
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// True when `path` has one of the recognised scan extensions
pub fn is_supported_extension(path: &Path) -> bool {
    MeshFormat::from_path(path).is_some()
}

/// Load a scan from disk as a welded triangle mesh
///
/// # Errors
///
/// `UnsupportedFormat` for unknown extensions and FBX, `Io` when the file
/// cannot be read, `InvalidContent` for corrupt data and `EmptyMesh` when
/// the file holds no faces.
pub fn load_mesh(path: &Path) -> Result<Mesh> {
    let unsupported = || Error::UnsupportedFormat {
        path: path.to_path_buf(),
    };
    let format = MeshFormat::from_path(path).ok_or_else(unsupported)?;

    let raw = match format {
        MeshFormat::Obj => parse_obj(BufReader::new(File::open(path)?))?,
        MeshFormat::Stl => stl::read_stl(BufReader::new(File::open(path)?))?,
        MeshFormat::Ply => ply::read_ply(BufReader::new(File::open(path)?))?,
        MeshFormat::Fbx => return Err(unsupported()),
    };

    let mesh = raw.welded(MERGE_TOLERANCE);
    if mesh.faces.is_empty() {
        return Err(Error::EmptyMesh(path.display().to_string()));
    }

    debug!(
        path = %path.display(),
        ?format,
        vertices = mesh.vertex_count(),
        faces = mesh.triangle_count(),
        "Loaded scan mesh"
    );
    Ok(mesh)
}

/// Vertex from parsed coordinates; `nan` and `inf` are corrupt data
pub(crate) fn finite_point(
    x: f64,
    y: f64,
    z: f64,
    context: impl FnOnce() -> String,
) -> Result<Point3<f64>> {
    if x.is_finite() && y.is_finite() && z.is_finite() {
        Ok(Point3::new(x, y, z))
    } else {
        Err(Error::invalid_content(format!("{}: non-finite coordinate", context())))
    }
}

/// Fan-triangulate a polygon given as vertex indices
pub(crate) fn push_fan(mesh: &mut Mesh, polygon: &[u32]) {
    for i in 1..polygon.len().saturating_sub(1) {
        mesh.faces.push([polygon[0], polygon[i], polygon[i + 1]]);
    }
}
