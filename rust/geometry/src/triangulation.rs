// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Simple polygons are handed to earcutr first. Earcut drops collinear
//! points, which would leave T-junctions when capping a boundary loop, so
//! `triangulate_loop` only accepts results that use every loop vertex and
//! otherwise falls back to an ear clipper that keeps them.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let cross = orient(&points[i], &points[(i + 1) % n], &points[(i + 2) % n]);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

/// Twice the signed area of triangle `abc`; positive when counter-clockwise
#[inline]
pub(crate) fn orient(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Twice the signed polygon area (shoelace)
pub fn signed_area_2d(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (p, q) = (&points[i], &points[(i + 1) % n]);
            p.x * q.y - q.x * p.y
        })
        .sum()
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes)
/// Returns triangle indices into the input points
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    earcutr::earcut(&vertices, &[], 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Ear clipping that keeps every input vertex, collinear ones included
///
/// Returns counter-clockwise triangles. If no valid ear remains the rest of
/// the polygon is fanned.
pub fn ear_clip(points: &[Point2<f64>]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let tol = degeneracy_tolerance(points);
    let mut remaining: Vec<usize> = (0..n).collect();
    if signed_area_2d(points) < 0.0 {
        remaining.reverse();
    }

    let mut triangles = Vec::with_capacity(n - 2);
    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let prev = remaining[(i + m - 1) % m];
            let next = remaining[(i + 1) % m];
            is_ear(points, &remaining, prev, remaining[i], next, tol)
        });

        match ear {
            Some(i) => {
                let prev = remaining[(i + m - 1) % m];
                let next = remaining[(i + 1) % m];
                triangles.push([prev, remaining[i], next]);
                remaining.remove(i);
            }
            None => {
                for i in 1..m - 1 {
                    triangles.push([remaining[0], remaining[i], remaining[i + 1]]);
                }
                return triangles;
            }
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

fn is_ear(
    points: &[Point2<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    tol: f64,
) -> bool {
    let (a, b, c) = (&points[prev], &points[curr], &points[next]);
    if orient(a, b, c) <= tol {
        return false;
    }

    remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .map(|&idx| &points[idx])
        .filter(|p| *p != a && *p != b && *p != c)
        .all(|p| !point_in_triangle(p, a, b, c, tol))
}

/// Closed containment test for a counter-clockwise triangle
#[inline]
fn point_in_triangle(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
    tol: f64,
) -> bool {
    orient(a, b, p) >= -tol && orient(b, c, p) >= -tol && orient(c, a, p) >= -tol
}

fn degeneracy_tolerance(points: &[Point2<f64>]) -> f64 {
    let (mut min, mut max) = (points[0], points[0]);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let extent = (max.x - min.x).max(max.y - min.y);
    extent * extent * 1e-12
}

/// Triangulate a closed 3D loop, returning triangles wound like the loop
///
/// Every loop vertex is used and no returned triangle is degenerate unless
/// the loop itself is.
pub fn triangulate_loop(points_3d: &[Point3<f64>]) -> Result<Vec<[usize; 3]>> {
    let n = points_3d.len();
    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    let normal = calculate_polygon_normal(points_3d);
    let (points, _, _, _) = project_to_2d(points_3d, &normal);

    if let Ok(indices) = triangulate_polygon(&points) {
        if let Some(triangles) = accept_triangulation(&points, &indices) {
            return Ok(triangles);
        }
    }

    Ok(ear_clip(&points))
}

/// Accept a flat index list only if it covers the polygon with n - 2
/// non-degenerate, consistently wound triangles
fn accept_triangulation(points: &[Point2<f64>], indices: &[usize]) -> Option<Vec<[usize; 3]>> {
    if indices.len() != (points.len() - 2) * 3 {
        return None;
    }

    let tol = degeneracy_tolerance(points);
    let mut triangles: Vec<[usize; 3]> = indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();
    let signs: Vec<f64> = triangles
        .iter()
        .map(|t| orient(&points[t[0]], &points[t[1]], &points[t[2]]))
        .collect();

    if signs.iter().all(|&s| s > tol) {
        Some(triangles)
    } else if signs.iter().all(|&s| s < -tol) {
        triangles.iter_mut().for_each(|t| t.swap(1, 2));
        Some(triangles)
    } else {
        None
    }
}

/// Project 3D points onto a 2D plane defined by a normal
/// Returns 2D points and the coordinate system (u_axis, v_axis, origin)
///
/// The basis is right-handed about `normal`, so a loop that winds
/// counter-clockwise around `normal` has positive 2D area.
#[inline]
pub fn project_to_2d(
    points_3d: &[Point3<f64>],
    normal: &Vector3<f64>,
) -> (Vec<Point2<f64>>, Vector3<f64>, Vector3<f64>, Point3<f64>) {
    if points_3d.is_empty() {
        return (
            Vec::new(),
            Vector3::zeros(),
            Vector3::zeros(),
            Point3::origin(),
        );
    }

    let origin = points_3d[0];

    // Axis least parallel to the normal for a stable cross product
    let abs_x = normal.x.abs();
    let abs_y = normal.y.abs();
    let abs_z = normal.z.abs();

    let reference = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::new(1.0, 0.0, 0.0)
    } else if abs_y <= abs_z {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    let u_axis = normal.cross(&reference).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    let points_2d = points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(&u_axis), v.dot(&v_axis))
        })
        .collect();

    (points_2d, u_axis, v_axis, origin)
}

/// Calculate the normal of a polygon from its vertices (Newell's method)
///
/// Robust to collinear runs and concave corners; falls back to +Z for a
/// loop without area.
#[inline]
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();

    if n < 3 {
        return Vector3::new(0.0, 0.0, 1.0);
    }

    let mut normal = Vector3::<f64>::zeros();

    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    let len = normal.norm();
    if len > 1e-10 && len.is_finite() {
        normal / len
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    }
}
