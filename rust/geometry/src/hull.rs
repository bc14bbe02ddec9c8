// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 3D convex hull
//!
//! Quickhull from `chull`, wrapped so the result is always an outward-wound,
//! watertight mesh over the hull's own vertices. Input spanning no volume,
//! or a hull that comes back open, yields an empty mesh.

use crate::mesh::Mesh;
use chull::ConvexHullWrapper;
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use tracing::warn;

/// Relative tolerance for the degeneracy test
const HULL_EPSILON: f64 = 1e-10;

/// Convex hull of `points` as an outward-wound triangle mesh
///
/// Fewer than four non-coplanar points give an empty mesh, as does a
/// numerically broken hull.
pub fn convex_hull(points: &[Point3<f64>]) -> Mesh {
    if points.len() < 4 || points.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
        return Mesh::new();
    }

    let scale = bounding_diagonal(points);
    if scale <= 0.0 {
        return Mesh::new();
    }
    let Some(simplex) = initial_simplex(points, scale * HULL_EPSILON) else {
        return Mesh::new();
    };

    let input: Vec<Vec<f64>> = points.iter().map(|p| vec![p.x, p.y, p.z]).collect();
    let hull = match ConvexHullWrapper::try_new(&input, None) {
        Ok(hull) => hull,
        Err(err) => {
            warn!(points = points.len(), error = ?err, "Convex hull construction failed");
            return Mesh::new();
        }
    };
    let (vertices, indices) = hull.vertices_indices();

    // Centroid of the seed tetrahedron lies strictly inside the hull
    let inside = Point3::from(simplex.iter().map(|&i| points[i].coords).sum::<Vector3<f64>>() / 4.0);

    let mut remap: FxHashMap<usize, u32> = FxHashMap::default();
    let mut mesh = Mesh::new();
    for tri in indices.chunks_exact(3) {
        let corner = |i: usize| Point3::new(vertices[i][0], vertices[i][1], vertices[i][2]);
        let (a, b, c) = (corner(tri[0]), corner(tri[1]), corner(tri[2]));
        let normal = (b - a).cross(&(c - a));
        let order = if normal.dot(&(a - inside)) < 0.0 {
            [tri[0], tri[2], tri[1]]
        } else {
            [tri[0], tri[1], tri[2]]
        };

        let mut face = [0u32; 3];
        for (slot, i) in face.iter_mut().zip(order) {
            *slot = *remap.entry(i).or_insert_with(|| mesh.add_vertex(corner(i)));
        }
        mesh.faces.push(face);
    }

    if mesh.is_empty() || !mesh.is_watertight() {
        warn!(faces = mesh.triangle_count(), "Convex hull is not closed; discarding");
        return Mesh::new();
    }
    mesh
}

fn bounding_diagonal(points: &[Point3<f64>]) -> f64 {
    let mut min = points[0];
    let mut max = points[0];
    for p in points {
        min = min.inf(p);
        max = max.sup(p);
    }
    (max - min).norm()
}

/// Four affinely independent points, or `None` when all are coplanar
fn initial_simplex(points: &[Point3<f64>], eps: f64) -> Option<[usize; 4]> {
    let farthest = |score: &dyn Fn(&Point3<f64>) -> f64| -> (usize, f64) {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, score(p)))
            .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best })
    };

    let (a, _) = farthest(&|p: &Point3<f64>| -p.x);
    let pa = points[a];

    let (b, dist_b) = farthest(&|p: &Point3<f64>| (p - pa).norm());
    if dist_b <= eps {
        return None;
    }
    let axis = (points[b] - pa) / dist_b;

    let (c, dist_c) = farthest(&|p: &Point3<f64>| (p - pa).cross(&axis).norm());
    if dist_c <= eps {
        return None;
    }
    let normal = (points[b] - pa).cross(&(points[c] - pa)).normalize();

    let (d, dist_d) = farthest(&|p: &Point3<f64>| (p - pa).dot(&normal).abs());
    if dist_d <= eps {
        return None;
    }

    Some([a, b, c, d])
}
