// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary loop detection and hole filling
//!
//! A loop lying inside a coplanar loop of opposite winding is the inner rim
//! of an annulus, as left by cutting a hollow section. Such loops are capped
//! together as one polygon with holes; every other loop gets its own cap.

use crate::adjacency::MeshAdjacency;
use crate::mesh::Mesh;
use crate::triangulation::{
    calculate_polygon_normal, orient, project_to_2d, signed_area_2d, triangulate_loop,
};
use nalgebra::{Point2, Point3, Vector3};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Default upper bound on the number of edges in a hole that gets filled
pub const DEFAULT_MAX_HOLE_EDGES: usize = 1024;

/// A closed chain of boundary edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Vertex indices in the order the bordering faces walk them
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges in the loop
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Trace all closed boundary loops of `mesh`
///
/// Open chains (possible around non-manifold vertices) are dropped.
pub fn detect_holes(mesh: &Mesh) -> Vec<BoundaryLoop> {
    let adjacency = MeshAdjacency::build(mesh);
    let half_edges = adjacency.boundary_half_edges(mesh);
    if half_edges.is_empty() {
        return Vec::new();
    }

    let mut outgoing: FxHashMap<u32, SmallVec<[u32; 2]>> = FxHashMap::default();
    for &(a, b) in &half_edges {
        outgoing.entry(a).or_default().push(b);
    }

    let mut loops = Vec::new();
    for &(start, first) in &half_edges {
        let taken = match outgoing.get_mut(&start) {
            Some(targets) => match targets.iter().position(|&t| t == first) {
                Some(pos) => {
                    targets.swap_remove(pos);
                    true
                }
                None => false,
            },
            None => false,
        };
        if !taken {
            continue;
        }

        let mut vertices = vec![start];
        let mut current = first;
        let mut closed = false;
        for _ in 0..half_edges.len() {
            if current == start {
                closed = true;
                break;
            }
            vertices.push(current);
            match outgoing.get_mut(&current).and_then(|targets| targets.pop()) {
                Some(next) => current = next,
                None => break,
            }
        }

        if closed && vertices.len() >= 3 {
            loops.push(BoundaryLoop { vertices });
        } else {
            debug!(length = vertices.len(), "Dropping open boundary chain");
        }
    }

    loops
}

/// Relative tolerance for treating two loops as coplanar
const COPLANAR_TOLERANCE: f64 = 1e-6;

/// One hole's cap polygon, wound opposite to the faces bordering it
struct Cap {
    vertices: Vec<u32>,
    positions: Vec<Point3<f64>>,
    normal: Vector3<f64>,
    area: f64,
}

impl Cap {
    fn new(hole: &BoundaryLoop, mesh: &Mesh) -> Self {
        let vertices: Vec<u32> = hole.vertices.iter().rev().copied().collect();
        let positions: Vec<_> = vertices.iter().map(|&i| mesh.vertices[i as usize]).collect();
        let normal = calculate_polygon_normal(&positions);
        let (flat, ..) = project_to_2d(&positions, &normal);
        let area = signed_area_2d(&flat).abs() / 2.0;
        Self {
            vertices,
            positions,
            normal,
            area,
        }
    }

    /// True when `inner` is a coplanar, oppositely wound loop strictly
    /// inside this one
    fn encloses(&self, inner: &Cap) -> bool {
        if self.normal.dot(&inner.normal) > -1.0 + COPLANAR_TOLERANCE || inner.area >= self.area {
            return false;
        }

        let origin = self.positions[0];
        let tolerance = extent(&self.positions) * COPLANAR_TOLERANCE;
        if inner
            .positions
            .iter()
            .any(|p| (p - origin).dot(&self.normal).abs() > tolerance)
        {
            return false;
        }

        let (outline, u, v, origin) = project_to_2d(&self.positions, &self.normal);
        inner.positions.iter().all(|p| {
            let d = p - origin;
            point_in_polygon(&Point2::new(d.dot(&u), d.dot(&v)), &outline)
        })
    }
}

fn extent(points: &[Point3<f64>]) -> f64 {
    let mut min = points[0];
    let mut max = points[0];
    for p in points {
        min = min.inf(p);
        max = max.sup(p);
    }
    (max - min).norm()
}

/// Even-odd test; points on the outline count as outside only by chance
fn point_in_polygon(p: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    for i in 0..n {
        let (a, b) = (&polygon[i], &polygon[(i + 1) % n]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Triangulate `outer` with `holes` cut out, as mesh vertex triples
///
/// `None` when earcut drops a vertex, which would leave an edge uncovered.
fn triangulate_with_holes(outer: &Cap, holes: &[&Cap]) -> Option<Vec<[u32; 3]>> {
    let (outline, u, v, origin) = project_to_2d(&outer.positions, &outer.normal);
    let mut ids = outer.vertices.clone();
    let mut flat = outline;
    let mut hole_starts = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_starts.push(ids.len());
        ids.extend_from_slice(&hole.vertices);
        flat.extend(hole.positions.iter().map(|p| {
            let d = p - origin;
            Point2::new(d.dot(&u), d.dot(&v))
        }));
    }

    let coords: Vec<f64> = flat.iter().flat_map(|p| [p.x, p.y]).collect();
    let indices = earcutr::earcut(&coords, &hole_starts, 2).ok()?;

    let expected = ids.len() + 2 * holes.len() - 2;
    let mut used = vec![false; ids.len()];
    for &i in &indices {
        used[i] = true;
    }
    if indices.len() != expected * 3 || used.contains(&false) {
        return None;
    }

    Some(
        indices
            .chunks_exact(3)
            .map(|t| {
                if orient(&flat[t[0]], &flat[t[1]], &flat[t[2]]) < 0.0 {
                    [ids[t[0]], ids[t[2]], ids[t[1]]]
                } else {
                    [ids[t[0]], ids[t[1]], ids[t[2]]]
                }
            })
            .collect(),
    )
}

/// Copy of `mesh` with every boundary loop of at most `max_hole_edges`
/// edges capped
///
/// Caps are wound against the surrounding faces so each boundary edge ends
/// up shared by two consistently oriented triangles.
pub fn fill_holes(mesh: &Mesh, max_hole_edges: usize) -> Mesh {
    let holes = detect_holes(mesh);
    if holes.is_empty() {
        return mesh.clone();
    }

    let (fillable, oversized): (Vec<_>, Vec<_>) = holes
        .iter()
        .partition(|hole| hole.edge_count() <= max_hole_edges);
    let caps: Vec<Cap> = fillable.iter().map(|hole| Cap::new(hole, mesh)).collect();

    // Smallest enclosing cap of each cap; an odd nesting depth marks an
    // inner rim
    let parent: Vec<Option<usize>> = (0..caps.len())
        .map(|j| {
            (0..caps.len())
                .filter(|&i| i != j && caps[i].encloses(&caps[j]))
                .min_by(|&a, &b| caps[a].area.total_cmp(&caps[b].area))
        })
        .collect();
    let is_rim: Vec<bool> = (0..caps.len())
        .map(|j| {
            let mut depth = 0usize;
            let mut current = parent[j];
            while let Some(i) = current {
                depth += 1;
                if depth > caps.len() {
                    break;
                }
                current = parent[i];
            }
            depth % 2 == 1
        })
        .collect();

    let mut filled = mesh.clone();
    let mut annuli = 0usize;
    for (i, cap) in caps.iter().enumerate() {
        if is_rim[i] {
            continue;
        }
        let rims: Vec<&Cap> = (0..caps.len())
            .filter(|&j| is_rim[j] && parent[j] == Some(i))
            .map(|j| &caps[j])
            .collect();

        if !rims.is_empty() {
            if let Some(triangles) = triangulate_with_holes(cap, &rims) {
                filled.faces.extend(triangles);
                annuli += 1;
                continue;
            }
            debug!(rims = rims.len(), "Annulus triangulation failed; capping loops separately");
            for rim in &rims {
                add_cap(&mut filled, rim);
            }
        }
        add_cap(&mut filled, cap);
    }

    if !oversized.is_empty() {
        warn!(
            skipped = oversized.len(),
            max_hole_edges,
            "Holes too large to fill were left open"
        );
    }
    debug!(holes = holes.len(), annuli, skipped = oversized.len(), "Filled boundary holes");

    filled
}

fn add_cap(mesh: &mut Mesh, cap: &Cap) {
    match triangulate_loop(&cap.positions) {
        Ok(triangles) => {
            for t in triangles {
                mesh.add_triangle(cap.vertices[t[0]], cap.vertices[t[1]], cap.vertices[t[2]]);
            }
        }
        Err(e) => warn!(error = %e, edges = cap.vertices.len(), "Failed to fill hole"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::cuboid;

    fn open_box() -> Mesh {
        // Unit cube with both top triangles removed
        let mut mesh = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        mesh.faces.truncate(10);
        mesh
    }

    /// Square tube, outer half-width 2 and inner half-width 1, with the top
    /// annulus missing
    fn open_tube() -> Mesh {
        let mut vertices = Vec::new();
        for (half, z) in [(2.0, 0.0), (2.0, 1.0), (1.0, 0.0), (1.0, 1.0)] {
            for (x, y) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                vertices.push(Point3::new(x * half, y * half, z));
            }
        }

        let mut mesh = Mesh::from_parts(vertices, Vec::new());
        let mut quad = |a: u32, b: u32, c: u32, d: u32| {
            mesh.add_triangle(a, b, c);
            mesh.add_triangle(a, c, d);
        };
        for i in 0..4 {
            let j = (i + 1) % 4;
            quad(i, j, 4 + j, 4 + i);
            quad(8 + i, 12 + i, 12 + j, 8 + j);
            quad(i, 8 + i, 8 + j, j);
        }
        mesh
    }

    #[test]
    fn test_closed_mesh_has_no_holes() {
        let cube = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert!(detect_holes(&cube).is_empty());
    }

    #[test]
    fn test_detect_square_hole() {
        let holes = detect_holes(&open_box());
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].edge_count(), 4);
    }

    #[test]
    fn test_fill_square_hole() {
        let mesh = open_box();
        let filled = fill_holes(&mesh, DEFAULT_MAX_HOLE_EDGES);
        assert_eq!(filled.triangle_count(), 12);
        assert!(filled.is_watertight());
        assert!(!mesh.is_watertight());
    }

    #[test]
    fn test_cap_faces_outward() {
        let filled = fill_holes(&open_box(), DEFAULT_MAX_HOLE_EDGES);
        for i in 10..filled.triangle_count() {
            let normal = filled.triangle(i).normal();
            assert!(normal.y > 0.99);
        }
    }

    #[test]
    fn test_large_holes_are_skipped() {
        let mesh = open_box();
        let filled = fill_holes(&mesh, 3);
        assert_eq!(filled, mesh);
    }

    #[test]
    fn test_single_triangle_gets_back_face() {
        let mesh = Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let filled = fill_holes(&mesh, DEFAULT_MAX_HOLE_EDGES);
        assert_eq!(filled.triangle_count(), 2);
        assert!(filled.is_watertight());
    }

    #[test]
    fn test_annulus_is_capped_around_the_inner_rim() {
        let mesh = open_tube();
        assert_eq!(detect_holes(&mesh).len(), 2);

        let filled = fill_holes(&mesh, DEFAULT_MAX_HOLE_EDGES);
        assert!(filled.is_watertight());
        assert_eq!(filled.triangle_count(), mesh.triangle_count() + 8);

        let mut cap_area = 0.0;
        for i in mesh.triangle_count()..filled.triangle_count() {
            let tri = filled.triangle(i);
            assert!(tri.normal().z > 0.99);
            let c = tri.centroid();
            assert!(c.x.abs() >= 1.0 || c.y.abs() >= 1.0, "cap covers the opening at {c:?}");
            cap_area += tri.area();
        }
        assert!((cap_area - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_separate_loops_get_separate_caps() {
        // Two open boxes side by side: neither loop encloses the other
        let a = open_box();
        let mut b = open_box();
        for v in &mut b.vertices {
            v.x += 3.0;
        }
        let offset = a.vertex_count() as u32;
        let mut both = a.clone();
        both.vertices.extend(b.vertices);
        both.faces.extend(b.faces.iter().map(|f| f.map(|i| i + offset)));

        let filled = fill_holes(&both, DEFAULT_MAX_HOLE_EDGES);
        assert!(filled.is_watertight());
        assert_eq!(filled.triangle_count(), 24);
    }
}
