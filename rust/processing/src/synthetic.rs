// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placeholder boxes for pieces without a usable scan

use crate::plan::PiecePlan;
use rebuild_geometry::{centered_box, Mesh, Vector3};

/// Box width (X) in millimetres
pub const SYNTHETIC_WIDTH_MM: f64 = 600.0;
/// Box depth (Z) in millimetres
pub const SYNTHETIC_DEPTH_MM: f64 = 600.0;
/// Height range in millimetres
pub const SYNTHETIC_MIN_HEIGHT_MM: f64 = 200.0;
pub const SYNTHETIC_MAX_HEIGHT_MM: f64 = 2500.0;
/// Height per kilogram of mass
pub const MILLIMETERS_PER_KG: f64 = 4.0;

/// Box height for a mass, clamped to the height range
///
/// Negative or NaN masses count as zero.
pub fn synthetic_height(mass_kg: f64) -> f64 {
    (mass_kg.max(0.0) * MILLIMETERS_PER_KG).clamp(SYNTHETIC_MIN_HEIGHT_MM, SYNTHETIC_MAX_HEIGHT_MM)
}

/// Axis-aligned box centred at the origin, sized from the plan's mass
pub fn synthetic_box(plan: &PiecePlan) -> Mesh {
    centered_box(Vector3::new(
        SYNTHETIC_WIDTH_MM,
        synthetic_height(plan.mass_kg),
        SYNTHETIC_DEPTH_MM,
    ))
}
