// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit normalization heuristic
//!
//! Scans arrive in metres or millimetres with no unit tag. A mesh whose
//! largest bounding-box extent is below [`METERS_EXTENT_THRESHOLD`] is
//! assumed to be in metres and scaled to millimetres. Anything larger is
//! assumed to be millimetres already, so a genuinely metre-scale mesh wider
//! than 50 m, or a millimetre part smaller than 50 mm, is misjudged.

use crate::mesh::Mesh;
use tracing::info;

/// Largest extent still treated as metres
pub const METERS_EXTENT_THRESHOLD: f64 = 50.0;

/// Scale applied to metre-scale meshes
pub const METERS_TO_MILLIMETERS: f64 = 1000.0;

/// Scale factor the heuristic would apply to `mesh`
pub fn unit_scale(mesh: &Mesh) -> f64 {
    let max_extent = mesh.extents().max();
    if max_extent > 0.0 && max_extent < METERS_EXTENT_THRESHOLD {
        METERS_TO_MILLIMETERS
    } else {
        1.0
    }
}

/// Copy of `mesh` rescaled into millimetres
pub fn normalize_units(mesh: &Mesh) -> Mesh {
    let scale = unit_scale(mesh);
    if scale == 1.0 {
        return mesh.clone();
    }

    info!(scale, "Normalized mesh scale to millimeters");
    mesh.scaled(scale)
}
