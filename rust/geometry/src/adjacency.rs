// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge adjacency for triangle meshes

use crate::mesh::Mesh;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Undirected edge key with the smaller index first
#[inline]
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Faces incident to each undirected edge
#[derive(Debug, Clone, Default)]
pub struct MeshAdjacency {
    edge_faces: FxHashMap<(u32, u32), SmallVec<[usize; 2]>>,
}

impl MeshAdjacency {
    /// Build adjacency for all faces of `mesh`
    pub fn build(mesh: &Mesh) -> Self {
        let mut edge_faces: FxHashMap<(u32, u32), SmallVec<[usize; 2]>> =
            FxHashMap::with_capacity_and_hasher(mesh.faces.len() * 3 / 2, Default::default());

        for (face_idx, face) in mesh.faces.iter().enumerate() {
            for i in 0..3 {
                let key = edge_key(face[i], face[(i + 1) % 3]);
                edge_faces.entry(key).or_default().push(face_idx);
            }
        }

        Self { edge_faces }
    }

    /// Number of distinct undirected edges
    pub fn edge_count(&self) -> usize {
        self.edge_faces.len()
    }

    /// Faces using the edge `(a, b)` in either direction
    pub fn faces_of_edge(&self, a: u32, b: u32) -> &[usize] {
        self.edge_faces
            .get(&edge_key(a, b))
            .map(|faces| faces.as_slice())
            .unwrap_or(&[])
    }

    /// Edges used by exactly one face
    pub fn boundary_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_faces
            .iter()
            .filter(|(_, faces)| faces.len() == 1)
            .map(|(edge, _)| *edge)
    }

    /// Edges used by more than two faces
    pub fn non_manifold_edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.edge_faces
            .iter()
            .filter(|(_, faces)| faces.len() > 2)
            .map(|(edge, _)| *edge)
    }

    /// Every edge shared by exactly two faces
    pub fn is_watertight(&self) -> bool {
        self.edge_faces.values().all(|faces| faces.len() == 2)
    }

    /// Boundary half-edges in the direction their single face walks them
    pub fn boundary_half_edges(&self, mesh: &Mesh) -> Vec<(u32, u32)> {
        let mut half_edges = Vec::new();
        for face in &mesh.faces {
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                if self.faces_of_edge(a, b).len() == 1 {
                    half_edges.push((a, b));
                }
            }
        }
        half_edges
    }
}
