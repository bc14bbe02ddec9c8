// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rigid placement transforms
//!
//! A placement is a yaw about +Y (right-hand rule) followed by a
//! translation, combined into one homogeneous matrix.

use crate::mesh::Mesh;
use nalgebra::{Matrix4, Rotation3, Vector3};

/// Yaw-then-translate placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Rotation about +Y in degrees
    pub yaw_degrees: f64,
    /// Translation applied after the rotation
    pub translation: Vector3<f64>,
}

impl Placement {
    pub fn new(yaw_degrees: f64, translation: Vector3<f64>) -> Self {
        Self {
            yaw_degrees,
            translation,
        }
    }

    /// Combined matrix `T * R_y`
    pub fn to_matrix(&self) -> Matrix4<f64> {
        yaw_translation_matrix(self.yaw_degrees, &self.translation)
    }

    /// Copy of `mesh` moved into place
    pub fn apply(&self, mesh: &Mesh) -> Mesh {
        mesh.transformed(&self.to_matrix())
    }
}

/// Rotation about +Y by `yaw_degrees`, then translation
pub fn yaw_translation_matrix(yaw_degrees: f64, translation: &Vector3<f64>) -> Matrix4<f64> {
    let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), yaw_degrees.to_radians());
    let mut matrix = rotation.to_homogeneous();
    matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_quarter_turn_about_y() {
        let placement = Placement::new(90.0, Vector3::new(10.0, 20.0, 30.0));
        let p = placement.to_matrix().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 20.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 29.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_happens_before_translation() {
        let placement = Placement::new(180.0, Vector3::new(5.0, 0.0, 0.0));
        let p = placement.to_matrix().transform_point(&Point3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(p.x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_placement() {
        let matrix = Placement::new(0.0, Vector3::zeros()).to_matrix();
        assert_eq!(matrix, Matrix4::identity());
    }
}
