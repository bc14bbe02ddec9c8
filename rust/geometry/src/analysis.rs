// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh inspection: topology counts and planar facets
//!
//! A facet is an edge-connected group of coplanar triangles, i.e. one flat
//! face of the solid regardless of how it is triangulated. A corner is a
//! vertex where at least three facets meet.

use crate::adjacency::MeshAdjacency;
use crate::mesh::Mesh;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Cosine tolerance for two triangle normals to count as parallel
const FACET_NORMAL_TOLERANCE: f64 = 1e-9;

/// Summary of a mesh's topology
#[derive(Debug, Clone, PartialEq)]
pub struct MeshReport {
    pub vertex_count: usize,
    pub face_count: usize,
    pub boundary_edge_count: usize,
    pub non_manifold_edge_count: usize,
    pub is_watertight: bool,
    pub facet_count: usize,
    pub corner_count: usize,
}

/// Inspect `mesh`
pub fn analyze(mesh: &Mesh) -> MeshReport {
    let adjacency = MeshAdjacency::build(mesh);
    let facets = facets_with(mesh, &adjacency);
    MeshReport {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.triangle_count(),
        boundary_edge_count: adjacency.boundary_edges().count(),
        non_manifold_edge_count: adjacency.non_manifold_edges().count(),
        is_watertight: adjacency.is_watertight(),
        facet_count: facets.len(),
        corner_count: corner_count(mesh, &facets),
    }
}

/// Group faces into planar facets
///
/// Degenerate faces belong to no facet.
pub fn facets(mesh: &Mesh) -> Vec<Vec<usize>> {
    facets_with(mesh, &MeshAdjacency::build(mesh))
}

fn facets_with(mesh: &Mesh, adjacency: &MeshAdjacency) -> Vec<Vec<usize>> {
    let normals: Vec<_> = mesh.triangles().map(|t| t.try_normal()).collect();
    let scale = mesh.extents().norm().max(f64::MIN_POSITIVE);
    let mut assigned = vec![false; mesh.faces.len()];
    let mut groups = Vec::new();

    for seed in 0..mesh.faces.len() {
        let Some(seed_normal) = normals[seed] else {
            continue;
        };
        if assigned[seed] {
            continue;
        }

        let seed_point = mesh.vertices[mesh.faces[seed][0] as usize];
        let mut group = vec![seed];
        let mut stack = vec![seed];
        assigned[seed] = true;

        while let Some(face) = stack.pop() {
            let f = mesh.faces[face];
            for i in 0..3 {
                for &other in adjacency.faces_of_edge(f[i], f[(i + 1) % 3]) {
                    if assigned[other] {
                        continue;
                    }
                    let Some(normal) = normals[other] else {
                        continue;
                    };
                    let coplanar = mesh.faces[other].iter().all(|&v| {
                        (mesh.vertices[v as usize] - seed_point).dot(&seed_normal).abs()
                            <= scale * FACET_NORMAL_TOLERANCE.sqrt()
                    });
                    if normal.dot(&seed_normal) >= 1.0 - FACET_NORMAL_TOLERANCE && coplanar {
                        assigned[other] = true;
                        group.push(other);
                        stack.push(other);
                    }
                }
            }
        }

        groups.push(group);
    }

    groups
}

/// Vertices touched by at least three distinct facets
fn corner_count(mesh: &Mesh, facets: &[Vec<usize>]) -> usize {
    let mut vertex_facets: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); mesh.vertex_count()];
    for (facet_id, faces) in facets.iter().enumerate() {
        let vertices: FxHashSet<u32> = faces.iter().flat_map(|&f| mesh.faces[f]).collect();
        for v in vertices {
            vertex_facets[v as usize].push(facet_id);
        }
    }
    vertex_facets.iter().filter(|f| f.len() >= 3).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::cuboid;
    use nalgebra::Point3;

    #[test]
    fn test_cube_report() {
        let cube = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let report = analyze(&cube);
        assert_eq!(report.vertex_count, 8);
        assert_eq!(report.face_count, 12);
        assert_eq!(report.facet_count, 6);
        assert_eq!(report.corner_count, 8);
        assert_eq!(report.boundary_edge_count, 0);
        assert!(report.is_watertight);
    }

    #[test]
    fn test_facets_skip_degenerate_faces() {
        let mesh = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        assert!(facets(&mesh).is_empty());
    }

    #[test]
    fn test_open_sheet_report() {
        let mut mesh = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        mesh.faces.truncate(2);
        let report = analyze(&mesh);
        assert_eq!(report.facet_count, 1);
        assert_eq!(report.corner_count, 0);
        assert_eq!(report.boundary_edge_count, 4);
        assert!(!report.is_watertight);
    }
}
