// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Half-space clipping
//!
//! Cuts an indexed mesh against a plane and keeps the closed half-space
//! `d(v) >= -epsilon`. Straddling faces are clipped polygon-wise; every
//! crossed edge is split exactly once through a per-clip edge-vertex cache,
//! so neighbouring faces share bit-identical split vertices.

use crate::adjacency::edge_key;
use crate::holes::{fill_holes, DEFAULT_MAX_HOLE_EDGES};
use crate::mesh::{Mesh, MERGE_TOLERANCE};
use crate::repair::remove_unreferenced_vertices;
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

/// Plane definition for clipping
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Point on the plane
    pub point: Point3<f64>,
    /// Normal vector (must be normalized)
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a new plane
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Cutting plane through `origin` whose normal is the X axis rotated by
    /// `angle_deg` within the XZ plane: `(cos a, 0, sin a)`
    pub fn from_cut_angle(origin: Point3<f64>, angle_deg: f64) -> Self {
        let angle = angle_deg.to_radians();
        Self::new(origin, Vector3::new(angle.cos(), 0.0, angle.sin()))
    }

    /// Calculate signed distance from point to plane
    /// Positive = in front, Negative = behind
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        (point - self.point).dot(&self.normal)
    }
}

/// Triangle definition
#[derive(Debug, Clone)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unnormalized normal; its length is twice the area
    #[inline]
    pub fn cross(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    /// Calculate triangle normal
    pub fn normal(&self) -> Vector3<f64> {
        self.cross().normalize()
    }

    /// Unit normal, or `None` for a degenerate triangle
    pub fn try_normal(&self) -> Option<Vector3<f64>> {
        let cross = self.cross();
        let len = cross.norm();
        (len > 0.0 && len.is_finite()).then(|| cross / len)
    }

    /// Calculate triangle area
    pub fn area(&self) -> f64 {
        self.cross().norm() * 0.5
    }

    /// Average of the three corners
    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.v0.coords + self.v1.coords + self.v2.coords) / 3.0)
    }
}

/// What a clip did to the mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOutcome {
    /// Every face was on the retained side; the input is returned as-is
    Untouched,
    /// Some faces were discarded or split
    Clipped { discarded: usize, split: usize },
    /// The plane removed everything; the input is returned as-is
    RemovedAll,
}

/// Clipped mesh together with its outcome
#[derive(Debug, Clone)]
pub struct ClippedMesh {
    pub mesh: Mesh,
    pub outcome: ClipOutcome,
}

/// Half-space clipping processor
#[derive(Debug, Clone)]
pub struct ClippingProcessor {
    /// Epsilon for floating point comparisons
    pub epsilon: f64,
    /// Largest boundary loop closed after a cut
    pub max_hole_edges: usize,
}

impl ClippingProcessor {
    /// Create a new clipping processor
    pub fn new() -> Self {
        Self {
            epsilon: 1e-6,
            max_hole_edges: DEFAULT_MAX_HOLE_EDGES,
        }
    }

    /// Create a processor with a custom tolerance
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            epsilon,
            ..Self::new()
        }
    }

    /// Cut `mesh` with the plane through its centroid at `angle_deg`
    pub fn slice_at_angle(&self, mesh: &Mesh, angle_deg: f64) -> Mesh {
        let plane = Plane::from_cut_angle(mesh.centroid(), angle_deg);
        info!(angle_deg, "Applying planar cut");
        self.clip_mesh(mesh, &plane)
    }

    /// Clip an entire mesh against a plane, keeping the front side
    pub fn clip_mesh(&self, mesh: &Mesh, plane: &Plane) -> Mesh {
        self.clip_mesh_detailed(mesh, plane).mesh
    }

    /// Clip an entire mesh against a plane and report what happened
    ///
    /// When no face is discarded or split the input comes back unchanged,
    /// which makes re-clipping with the same plane a no-op.
    pub fn clip_mesh_detailed(&self, mesh: &Mesh, plane: &Plane) -> ClippedMesh {
        let eps = self.epsilon;
        let distances: Vec<f64> = mesh
            .vertices
            .iter()
            .map(|v| plane.signed_distance(v))
            .collect();

        let mut vertices = mesh.vertices.clone();
        let mut faces = Vec::with_capacity(mesh.faces.len());
        let mut edge_cache: FxHashMap<(u32, u32), u32> = FxHashMap::default();
        let mut discarded = 0usize;
        let mut split = 0usize;

        for face in &mesh.faces {
            let d = face.map(|i| distances[i as usize]);

            if d.iter().all(|&x| x >= -eps) {
                faces.push(*face);
                continue;
            }
            if d.iter().all(|&x| x < -eps) {
                discarded += 1;
                continue;
            }

            split += 1;
            let polygon = clip_face(face, &d, eps, &mut vertices, &mut edge_cache);
            if polygon.len() >= 3 {
                let anchor = polygon[0];
                for i in 1..polygon.len() - 1 {
                    faces.push([anchor, polygon[i], polygon[i + 1]]);
                }
            }
        }

        if discarded == 0 && split == 0 {
            return ClippedMesh {
                mesh: mesh.clone(),
                outcome: ClipOutcome::Untouched,
            };
        }

        debug!(
            discarded,
            split,
            new_vertices = edge_cache.len(),
            "Clipped faces against plane"
        );

        let clipped = Mesh::from_parts(vertices, faces).welded(MERGE_TOLERANCE);
        if clipped.faces.is_empty() {
            warn!("Plane clipping removed all faces; returning original mesh");
            return ClippedMesh {
                mesh: mesh.clone(),
                outcome: ClipOutcome::RemovedAll,
            };
        }

        let pruned = remove_unreferenced_vertices(&clipped);
        ClippedMesh {
            mesh: fill_holes(&pruned, self.max_hole_edges),
            outcome: ClipOutcome::Clipped { discarded, split },
        }
    }
}

impl Default for ClippingProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Clip one face polygon, returning the retained polygon as vertex indices
///
/// Split vertices are appended to `vertices` and memoized per undirected
/// edge in `edge_cache`.
fn clip_face(
    face: &[u32; 3],
    distances: &[f64; 3],
    eps: f64,
    vertices: &mut Vec<Point3<f64>>,
    edge_cache: &mut FxHashMap<(u32, u32), u32>,
) -> SmallVec<[u32; 4]> {
    let mut clipped = SmallVec::new();

    for i in 0..3 {
        let j = (i + 1) % 3;
        let (current, next) = (face[i], face[j]);
        let (d_current, d_next) = (distances[i], distances[j]);
        let current_kept = d_current >= -eps;
        let next_kept = d_next >= -eps;

        if current_kept {
            clipped.push(current);
        }

        if current_kept != next_kept {
            let index = *edge_cache
                .entry(edge_key(current, next))
                .or_insert_with(|| {
                    let denom = d_current - d_next;
                    let t = if denom == 0.0 { 0.0 } else { d_current / denom };
                    let start = vertices[current as usize];
                    let end = vertices[next as usize];
                    vertices.push(start + (end - start) * t);
                    (vertices.len() - 1) as u32
                });
            clipped.push(index);
        }
    }

    clipped
}
