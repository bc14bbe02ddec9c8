// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitive solids

use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};

/// Create a box mesh from AABB min/max bounds
///
/// 8 shared vertices and 12 triangles, counter-clockwise when viewed from
/// outside.
pub fn cuboid(min: Point3<f64>, max: Point3<f64>) -> Mesh {
    let mut mesh = Mesh::with_capacity(8, 12);

    let v0 = mesh.add_vertex(Point3::new(min.x, min.y, min.z)); // front-bottom-left
    let v1 = mesh.add_vertex(Point3::new(max.x, min.y, min.z)); // front-bottom-right
    let v2 = mesh.add_vertex(Point3::new(max.x, max.y, min.z)); // front-top-right
    let v3 = mesh.add_vertex(Point3::new(min.x, max.y, min.z)); // front-top-left
    let v4 = mesh.add_vertex(Point3::new(min.x, min.y, max.z)); // back-bottom-left
    let v5 = mesh.add_vertex(Point3::new(max.x, min.y, max.z)); // back-bottom-right
    let v6 = mesh.add_vertex(Point3::new(max.x, max.y, max.z)); // back-top-right
    let v7 = mesh.add_vertex(Point3::new(min.x, max.y, max.z)); // back-top-left

    // Front face (z = min.z), -Z
    mesh.add_triangle(v0, v2, v1);
    mesh.add_triangle(v0, v3, v2);

    // Back face (z = max.z), +Z
    mesh.add_triangle(v4, v5, v6);
    mesh.add_triangle(v4, v6, v7);

    // Left face (x = min.x), -X
    mesh.add_triangle(v0, v4, v7);
    mesh.add_triangle(v0, v7, v3);

    // Right face (x = max.x), +X
    mesh.add_triangle(v1, v2, v6);
    mesh.add_triangle(v1, v6, v5);

    // Bottom face (y = min.y), -Y
    mesh.add_triangle(v0, v1, v5);
    mesh.add_triangle(v0, v5, v4);

    // Top face (y = max.y), +Y
    mesh.add_triangle(v3, v7, v6);
    mesh.add_triangle(v3, v6, v2);

    mesh
}

/// Box with the given full extents, centred at the origin
pub fn centered_box(extents: Vector3<f64>) -> Mesh {
    let half = extents * 0.5;
    cuboid(Point3::from(-half), Point3::from(half))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_topology() {
        let mesh = cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh.is_watertight());
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let mesh = cuboid(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let center = mesh.vertex_mean();
        for tri in mesh.triangles() {
            let outward = tri.centroid() - center;
            assert!(tri.normal().dot(&outward) > 0.0);
        }
    }

    #[test]
    fn test_centered_box() {
        let mesh = centered_box(Vector3::new(600.0, 1600.0, 600.0));
        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3::new(-300.0, -800.0, -300.0));
        assert_eq!(max, Point3::new(300.0, 800.0, 300.0));
    }
}
