// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Watertight repair
//!
//! Cleanup runs duplicate removal, degenerate removal, hole filling and
//! unreferenced-vertex pruning in that order. If the result is still open
//! or non-manifold it is replaced by its convex hull, which always closes.

use crate::fallback::{FallbackChain, Resolved, ResolvingChain};
use crate::holes::{fill_holes, DEFAULT_MAX_HOLE_EDGES};
use crate::hull::convex_hull;
use crate::mesh::Mesh;
use rustc_hash::FxHashSet;
use std::convert::Infallible;
use tracing::{debug, info};

/// Strategy name for the cleanup pass
pub const CLEANUP: &str = "cleanup";
/// Strategy name for the convex hull substitute
pub const CONVEX_HULL: &str = "convex_hull";

/// Parameters for watertight repair
#[derive(Debug, Clone)]
pub struct RepairParams {
    /// Triangles with area at or below this are removed
    pub degenerate_area_threshold: f64,
    /// Boundary loops longer than this stay open during cleanup
    pub max_hole_edges: usize,
}

impl Default for RepairParams {
    fn default() -> Self {
        Self {
            degenerate_area_threshold: 1e-12,
            max_hole_edges: DEFAULT_MAX_HOLE_EDGES,
        }
    }
}

/// Remove faces that repeat the vertex set of an earlier face, in either
/// orientation
pub fn remove_duplicate_faces(mesh: &Mesh) -> Mesh {
    let mut seen: FxHashSet<[u32; 3]> = FxHashSet::default();
    let faces: Vec<[u32; 3]> = mesh
        .faces
        .iter()
        .filter(|face| {
            let mut key = **face;
            key.sort_unstable();
            seen.insert(key)
        })
        .copied()
        .collect();

    if faces.len() != mesh.faces.len() {
        debug!(removed = mesh.faces.len() - faces.len(), "Removed duplicate faces");
    }
    Mesh::from_parts(mesh.vertices.clone(), faces)
}

/// Remove faces with a repeated index or with area at or below `area_threshold`
pub fn remove_degenerate_faces(mesh: &Mesh, area_threshold: f64) -> Mesh {
    let faces: Vec<[u32; 3]> = mesh
        .faces
        .iter()
        .enumerate()
        .filter(|(i, f)| {
            if f[0] == f[1] || f[1] == f[2] || f[0] == f[2] {
                return false;
            }
            let area = mesh.triangle(*i).area();
            area.is_finite() && area > area_threshold
        })
        .map(|(_, f)| *f)
        .collect();

    if faces.len() != mesh.faces.len() {
        debug!(removed = mesh.faces.len() - faces.len(), "Removed degenerate faces");
    }
    Mesh::from_parts(mesh.vertices.clone(), faces)
}

/// Drop vertices no face references and compact the indices
///
/// Surviving vertices keep their relative order.
pub fn remove_unreferenced_vertices(mesh: &Mesh) -> Mesh {
    let mut referenced = vec![false; mesh.vertices.len()];
    for face in &mesh.faces {
        for &i in face {
            referenced[i as usize] = true;
        }
    }

    if referenced.iter().all(|&r| r) {
        return mesh.clone();
    }

    let mut remap = vec![0u32; mesh.vertices.len()];
    let mut vertices = Vec::with_capacity(mesh.vertices.len());
    for (old_idx, vertex) in mesh.vertices.iter().enumerate() {
        if referenced[old_idx] {
            remap[old_idx] = vertices.len() as u32;
            vertices.push(*vertex);
        }
    }

    let faces = mesh
        .faces
        .iter()
        .map(|f| [remap[f[0] as usize], remap[f[1] as usize], remap[f[2] as usize]])
        .collect();

    Mesh::from_parts(vertices, faces)
}

/// Cleanup pass without the hull fallback
pub fn cleanup(mesh: &Mesh, params: &RepairParams) -> Mesh {
    let deduplicated = remove_duplicate_faces(mesh);
    let nondegenerate = remove_degenerate_faces(&deduplicated, params.degenerate_area_threshold);
    let filled = fill_holes(&nondegenerate, params.max_hole_edges);
    remove_unreferenced_vertices(&filled)
}

/// The repair policy as a fallback chain: cleanup, accepted only when the
/// result is watertight, then the convex hull of the cleaned vertices
pub fn repair_chain(params: &RepairParams) -> ResolvingChain<'_, Mesh, Mesh, Infallible> {
    FallbackChain::<Mesh, Mesh, Infallible>::new()
        .attempt(CLEANUP, move |mesh| {
            let cleaned = cleanup(mesh, params);
            Ok(cleaned.is_watertight().then_some(cleaned))
        })
        .finally(CONVEX_HULL, move |mesh| {
            info!("Watertight check failed after cleanup; substituting convex hull");
            let cleaned = remove_unreferenced_vertices(mesh);
            Ok(convex_hull(&cleaned.vertices))
        })
}

/// Repair `mesh` into a watertight mesh, reporting which strategy won
pub fn repair_watertight(mesh: &Mesh, params: &RepairParams) -> Resolved<Mesh> {
    if !mesh.is_watertight() {
        info!(
            vertices = mesh.vertex_count(),
            faces = mesh.triangle_count(),
            "Mesh not watertight; repairing"
        );
    }
    let resolved = repair_chain(params).resolve(mesh);
    debug!(strategy = resolved.strategy, faces = resolved.value.triangle_count(), "Repair finished");
    resolved
}
