// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ReBuild Processing
//!
//! Turns piece plans and candidate scans into placed, watertight meshes,
//! and packages them as OBJ files.

pub mod archive;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod pipeline;
pub mod plan;
pub mod scans;
pub mod synthetic;

pub use archive::{build_geometry_archive, ProcessedProject, ProjectSession, LAYOUT_ENTRY};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use export::{geometries_to_obj, mesh_to_obj, pieces_to_obj, write_pieces_obj};
pub use pipeline::GeometryPipeline;
pub use plan::{plans_from_json, sanitize_piece_id, CenterOfMass, PieceGeometry, PiecePlan};
pub use scans::ScanCatalog;
pub use synthetic::{synthetic_box, synthetic_height};
