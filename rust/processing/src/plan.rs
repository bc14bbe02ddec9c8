// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Piece plans and finished piece geometry

use rebuild_geometry::Mesh;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Metadata key for the cut angle in degrees
pub const META_CUT_ANGLE: &str = "cut_angle";
/// Metadata key for the piece mass in kilograms
pub const META_MASS_KG: &str = "mass_kg";

/// Declared centre of mass; each axis may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CenterOfMass {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
}

impl CenterOfMass {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }
}

/// One salvaged component as planned upstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PiecePlan {
    #[serde(default)]
    pub piece_id: String,
    #[serde(default)]
    pub mass_kg: f64,
    #[serde(default)]
    pub center_of_mass: Option<CenterOfMass>,
    /// Cut angle in degrees
    #[serde(default)]
    pub optimal_cut_angle: f64,
    #[serde(default)]
    pub waste_reduction: f64,
    #[serde(default)]
    pub reuse_score: f64,
}

impl PiecePlan {
    pub fn new(piece_id: impl Into<String>, mass_kg: f64, optimal_cut_angle: f64) -> Self {
        Self {
            piece_id: piece_id.into(),
            mass_kg,
            optimal_cut_angle,
            ..Self::default()
        }
    }

    pub fn with_center_of_mass(mut self, center: CenterOfMass) -> Self {
        self.center_of_mass = Some(center);
        self
    }

    /// The declared id, or `piece-{index + 1}` when it is empty
    pub fn display_name(&self, index: usize) -> String {
        if self.piece_id.is_empty() {
            format!("piece-{}", index + 1)
        } else {
            self.piece_id.clone()
        }
    }

    /// Lowercase, hyphenated id used for output files
    pub fn sanitized_id(&self, index: usize) -> String {
        sanitize_piece_id(&self.display_name(index))
    }
}

/// Replace spaces with hyphens and lowercase
pub fn sanitize_piece_id(piece_id: &str) -> String {
    piece_id.replace(' ', "-").to_lowercase()
}

/// Parse a JSON array of plans
pub fn plans_from_json(json: &str) -> serde_json::Result<Vec<PiecePlan>> {
    serde_json::from_str(json)
}

/// Finished, watertight mesh for one plan
#[derive(Debug, Clone)]
pub struct PieceGeometry {
    pub piece_id: String,
    pub mesh: Mesh,
    /// Scan the mesh came from; `None` for synthetic boxes
    pub source_path: Option<PathBuf>,
    /// `cut_angle` and `mass_kg` copied from the plan
    pub metadata: BTreeMap<String, f64>,
    /// Source strategy that produced the mesh (`scan` or `synthetic`)
    pub source_strategy: &'static str,
    /// Repair strategy that closed the mesh (`cleanup` or `convex_hull`)
    pub repair_strategy: &'static str,
}

impl PieceGeometry {
    pub fn is_synthetic(&self) -> bool {
        self.source_path.is_none()
    }
}
