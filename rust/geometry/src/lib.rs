// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ReBuild Geometry
//!
//! Mesh kernel for salvaged building components: scan import, unit
//! normalization, half-space clipping, rigid placement and watertight
//! repair, built on nalgebra with earcutr triangulation.

pub mod adjacency;
pub mod analysis;
pub mod csg;
pub mod error;
pub mod fallback;
pub mod holes;
pub mod hull;
pub mod io;
pub mod mesh;
pub mod primitives;
pub mod repair;
pub mod transform;
pub mod triangulation;
pub mod units;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use analysis::{analyze, facets, MeshReport};
pub use csg::{ClipOutcome, ClippedMesh, ClippingProcessor, Plane, Triangle};
pub use error::{Error, Result};
pub use fallback::{FallbackChain, Resolved, ResolvingChain};
pub use holes::{detect_holes, fill_holes, BoundaryLoop};
pub use hull::convex_hull;
pub use io::{is_supported_extension, load_mesh, MeshFormat};
pub use mesh::{Mesh, MERGE_TOLERANCE};
pub use primitives::{centered_box, cuboid};
pub use repair::{repair_watertight, RepairParams};
pub use transform::{yaw_translation_matrix, Placement};
pub use triangulation::{triangulate_loop, triangulate_polygon};
pub use units::normalize_units;
