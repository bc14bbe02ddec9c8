// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! Meshes are plain values: every pipeline stage takes `&Mesh` and returns a
//! new `Mesh`, so intermediate stages stay inspectable.

use crate::adjacency::MeshAdjacency;
use crate::csg::Triangle;
use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashMap;

/// Quantization step used when merging coincident vertices
pub const MERGE_TOLERANCE: f64 = 1e-8;

/// Indexed triangle mesh in f64 precision
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    pub vertices: Vec<Point3<f64>>,
    /// Triangles as vertex index triples
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Build a mesh from raw parts
    pub fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Add a vertex, returning its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.vertices.push(position);
        (self.vertices.len() - 1) as u32
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.faces.push([i0, i1, i2]);
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh has no vertices
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Triangle for the face at `index`
    #[inline]
    pub fn triangle(&self, index: usize) -> Triangle {
        let [a, b, c] = self.faces[index];
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }

    /// Iterate over all face triangles
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.faces.len()).map(move |i| self.triangle(i))
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for v in &self.vertices {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }

        (min, max)
    }

    /// Axis-aligned bounding box extents
    pub fn extents(&self) -> Vector3<f64> {
        let (min, max) = self.bounds();
        max - min
    }

    /// Average of all vertex positions
    pub fn vertex_mean(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }

        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Surface centroid: triangle centroids weighted by triangle area
    ///
    /// Falls back to the vertex mean when the surface has no area.
    pub fn centroid(&self) -> Point3<f64> {
        let mut weighted = Vector3::zeros();
        let mut total_area = 0.0;
        for tri in self.triangles() {
            let area = tri.area();
            weighted += tri.centroid().coords * area;
            total_area += area;
        }

        if total_area > 0.0 && weighted.iter().all(|c| c.is_finite()) {
            Point3::from(weighted / total_area)
        } else {
            self.vertex_mean()
        }
    }

    /// Total surface area
    pub fn area(&self) -> f64 {
        self.triangles().map(|t| t.area()).sum()
    }

    /// Copy of the mesh with every vertex transformed by `transform`
    pub fn transformed(&self, transform: &Matrix4<f64>) -> Mesh {
        Mesh {
            vertices: self
                .vertices
                .iter()
                .map(|v| transform.transform_point(v))
                .collect(),
            faces: self.faces.clone(),
        }
    }

    /// Copy of the mesh uniformly scaled about the origin
    pub fn scaled(&self, factor: f64) -> Mesh {
        Mesh {
            vertices: self.vertices.iter().map(|v| Point3::from(v.coords * factor)).collect(),
            faces: self.faces.clone(),
        }
    }

    /// Copy of the mesh with coincident vertices merged
    ///
    /// Positions are quantized to `tolerance`; faces that collapse onto a
    /// repeated index are dropped. Vertex order follows first occurrence.
    pub fn welded(&self, tolerance: f64) -> Mesh {
        let mut lookup: FxHashMap<(i64, i64, i64), u32> = FxHashMap::default();
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut vertices = Vec::with_capacity(self.vertices.len());

        for v in &self.vertices {
            debug_assert!(
                v.coords.iter().all(|c| c.is_finite()),
                "welding a non-finite vertex"
            );
            let key = (
                (v.x / tolerance).round() as i64,
                (v.y / tolerance).round() as i64,
                (v.z / tolerance).round() as i64,
            );
            let index = *lookup.entry(key).or_insert_with(|| {
                vertices.push(*v);
                (vertices.len() - 1) as u32
            });
            remap.push(index);
        }

        let faces = self
            .faces
            .iter()
            .map(|f| [remap[f[0] as usize], remap[f[1] as usize], remap[f[2] as usize]])
            .filter(|f| f[0] != f[1] && f[1] != f[2] && f[0] != f[2])
            .collect();

        Mesh { vertices, faces }
    }

    /// True when every undirected edge is shared by exactly two faces
    ///
    /// A mesh with no faces has no boundary and counts as watertight.
    pub fn is_watertight(&self) -> bool {
        MeshAdjacency::build(self).is_watertight()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
