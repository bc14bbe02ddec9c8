// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assembly layout: where each piece goes

use crate::plan::PiecePlan;
use rebuild_geometry::{Placement, Vector3};

/// Row position in millimetres for a piece without a declared centre
pub fn fallback_center(index: usize) -> Vector3<f64> {
    let i = index as f64;
    Vector3::new(i * 650.0 - 1500.0, 500.0 + i * 50.0, i * 120.0)
}

/// Translation from the declared centre of mass, axis by axis, falling
/// back to the row position for missing axes
pub fn plan_translation(plan: &PiecePlan, index: usize) -> Vector3<f64> {
    let fallback = fallback_center(index);
    match plan.center_of_mass {
        Some(center) => Vector3::new(
            center.x.unwrap_or(fallback.x),
            center.y.unwrap_or(fallback.y),
            center.z.unwrap_or(fallback.z),
        ),
        None => fallback,
    }
}

/// Yaw by the cut angle, then move to the plan's position
pub fn plan_placement(plan: &PiecePlan, index: usize) -> Placement {
    Placement::new(plan.optimal_cut_angle, plan_translation(plan, index))
}
