// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Piece geometry pipeline
//!
//! Each plan is turned into a watertight mesh on its own: pick a source
//! (cycled scan, else synthetic box), cut it through its centroid at the
//! plan's angle, move it into the layout, repair it. Pieces share nothing
//! but the read-only scan catalog, so they can run on the rayon pool.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::layout::plan_placement;
use crate::plan::{PieceGeometry, PiecePlan, META_CUT_ANGLE, META_MASS_KG};
use crate::scans::ScanCatalog;
use crate::synthetic::synthetic_box;
use rayon::prelude::*;
use rebuild_geometry::fallback::{FallbackChain, ResolvingChain};
use rebuild_geometry::{
    load_mesh, normalize_units, repair_watertight, ClippingProcessor, Mesh, RepairParams,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Source strategy name for a loaded scan
pub const SCAN: &str = "scan";
/// Source strategy name for the placeholder box
pub const SYNTHETIC: &str = "synthetic";

/// What the source chain sees for one piece
struct SourceRequest<'r> {
    plan: &'r PiecePlan,
    index: usize,
    piece_id: &'r str,
    scan: Option<&'r Path>,
}

struct SourceMesh {
    mesh: Mesh,
    path: Option<PathBuf>,
}

/// Load the cycled scan; decline when there is none or it cannot be decoded
fn load_scan(request: &SourceRequest<'_>) -> Result<Option<SourceMesh>> {
    let Some(path) = request.scan else {
        return Ok(None);
    };

    info!(piece_id = request.piece_id, path = %path.display(), "Loading scan mesh");
    match load_mesh(path) {
        Ok(mesh) => Ok(Some(SourceMesh {
            mesh: normalize_units(&mesh),
            path: Some(path.to_path_buf()),
        })),
        Err(rebuild_geometry::Error::UnsupportedFormat { .. }) => {
            warn!(path = %path.display(), "No decoder for scan format; treating as missing");
            Ok(None)
        }
        Err(source) => Err(Error::Piece {
            index: request.index,
            piece_id: request.piece_id.to_string(),
            source,
        }),
    }
}

fn source_chain<'r>() -> ResolvingChain<'r, SourceRequest<'r>, SourceMesh, Error> {
    FallbackChain::new()
        .attempt(SCAN, load_scan)
        .finally(SYNTHETIC, |request: &SourceRequest<'r>| {
            info!(piece_id = request.piece_id, "Using synthetic geometry");
            Ok(SourceMesh {
                mesh: synthetic_box(request.plan),
                path: None,
            })
        })
}

/// Turns piece plans into finished meshes
#[derive(Debug, Clone, Default)]
pub struct GeometryPipeline {
    clipper: ClippingProcessor,
    repair: RepairParams,
    parallel: bool,
}

impl GeometryPipeline {
    /// Pipeline with default tolerances, running sequentially
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut clipper = ClippingProcessor::with_epsilon(config.clip_tolerance);
        clipper.max_hole_edges = config.max_hole_edges;
        Self {
            clipper,
            repair: RepairParams {
                max_hole_edges: config.max_hole_edges,
                ..RepairParams::default()
            },
            parallel: config.parallel,
        }
    }

    /// Fan pieces out over the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build the geometry for the plan at `index`
    pub fn build_piece(
        &self,
        plan: &PiecePlan,
        index: usize,
        scans: &ScanCatalog,
    ) -> Result<PieceGeometry> {
        let piece_id = plan.sanitized_id(index);
        let request = SourceRequest {
            plan,
            index,
            piece_id: &piece_id,
            scan: scans.scan_for(index),
        };
        let source = source_chain().run(&request)?;

        let cut = self
            .clipper
            .slice_at_angle(&source.value.mesh, plan.optimal_cut_angle);
        let placement = plan_placement(plan, index);
        let placed = placement.apply(&cut);
        debug!(
            piece_id = %piece_id,
            yaw = placement.yaw_degrees,
            x = placement.translation.x,
            y = placement.translation.y,
            z = placement.translation.z,
            "Placed piece"
        );

        let repaired = repair_watertight(&placed, &self.repair);

        let mut metadata = BTreeMap::new();
        metadata.insert(META_CUT_ANGLE.to_string(), plan.optimal_cut_angle);
        metadata.insert(META_MASS_KG.to_string(), plan.mass_kg);

        Ok(PieceGeometry {
            piece_id,
            mesh: repaired.value,
            source_path: source.value.path,
            metadata,
            source_strategy: source.strategy,
            repair_strategy: repaired.strategy,
        })
    }

    /// Build every piece in plan order; the first failing piece fails the
    /// whole batch
    pub fn build_piece_meshes(
        &self,
        plans: &[PiecePlan],
        scans: &ScanCatalog,
    ) -> Result<Vec<PieceGeometry>> {
        if self.parallel {
            plans
                .par_iter()
                .enumerate()
                .map(|(index, plan)| self.build_piece(plan, index, scans))
                .collect()
        } else {
            plans
                .iter()
                .enumerate()
                .map(|(index, plan)| self.build_piece(plan, index, scans))
                .collect()
        }
    }

    /// Build every piece in plan order, one result per plan, so a corrupt
    /// scan only fails its own piece
    pub fn build_piece_meshes_isolated(
        &self,
        plans: &[PiecePlan],
        scans: &ScanCatalog,
    ) -> Vec<Result<PieceGeometry>> {
        let build = |(index, plan): (usize, &PiecePlan)| {
            let result = self.build_piece(plan, index, scans);
            if let Err(err) = &result {
                warn!(index, error = %err, "Piece failed; continuing with the rest");
            }
            result
        };

        if self.parallel {
            plans.par_iter().enumerate().map(build).collect()
        } else {
            plans.iter().enumerate().map(build).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::CenterOfMass;
    use std::fs;

    const CUBE_OBJ: &str = "\
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
f 1 2 6
f 1 6 5
f 4 8 7
f 4 7 3
";

    #[test]
    fn test_synthetic_piece_metadata() {
        let plan = PiecePlan::new("Beam 7", 250.0, 30.0);
        let geometry = GeometryPipeline::new()
            .build_piece(&plan, 0, &ScanCatalog::empty())
            .unwrap();

        assert_eq!(geometry.piece_id, "beam-7");
        assert!(geometry.is_synthetic());
        assert_eq!(geometry.source_strategy, SYNTHETIC);
        assert_eq!(geometry.metadata[META_CUT_ANGLE], 30.0);
        assert_eq!(geometry.metadata[META_MASS_KG], 250.0);
        assert!(geometry.mesh.is_watertight());
    }

    #[test]
    fn test_scan_is_loaded_and_rescaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.obj");
        fs::write(&path, CUBE_OBJ).unwrap();

        let plan = PiecePlan::new("scan", 10.0, 0.0)
            .with_center_of_mass(CenterOfMass::new(0.0, 0.0, 0.0));
        let geometry = GeometryPipeline::new()
            .build_piece(&plan, 0, &ScanCatalog::from_paths([path.clone()]))
            .unwrap();

        assert_eq!(geometry.source_strategy, SCAN);
        assert_eq!(geometry.source_path.as_deref(), Some(path.as_path()));
        // metre cube scaled to millimetres, then halved by the cut at 0 degrees
        let (min, max) = geometry.mesh.bounds();
        assert!((min.x - 0.0).abs() < 1e-6);
        assert!((max.x - 500.0).abs() < 1e-6);
        assert!((max.y - 500.0).abs() < 1e-6);
        assert!(geometry.mesh.is_watertight());
    }

    #[test]
    fn test_fbx_scan_falls_back_to_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.fbx");
        fs::write(&path, b"Kaydara FBX Binary").unwrap();

        let plan = PiecePlan::new("p", 100.0, 0.0);
        let geometry = GeometryPipeline::new()
            .build_piece(&plan, 0, &ScanCatalog::from_paths([path]))
            .unwrap();
        assert_eq!(geometry.source_strategy, SYNTHETIC);
        assert!(geometry.source_path.is_none());
    }

    #[test]
    fn test_corrupt_scan_is_reported_per_piece() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.obj");
        let bad = dir.path().join("bad.obj");
        fs::write(&good, CUBE_OBJ).unwrap();
        fs::write(&bad, "v 0 0 0\nf 1 2 3\n").unwrap();

        let plans = vec![PiecePlan::new("a", 1.0, 0.0), PiecePlan::new("b", 1.0, 0.0)];
        let scans = ScanCatalog::from_paths([good, bad]);
        let pipeline = GeometryPipeline::new();

        let strict = pipeline.build_piece_meshes(&plans, &scans);
        assert!(matches!(strict, Err(Error::Piece { index: 1, .. })));

        let isolated = pipeline.build_piece_meshes_isolated(&plans, &scans);
        assert_eq!(isolated.len(), 2);
        assert!(isolated[0].is_ok());
        match &isolated[1] {
            Err(Error::Piece { piece_id, .. }) => assert_eq!(piece_id, "b"),
            other => panic!("expected piece error, got {other:?}"),
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let plans: Vec<_> = (0..6)
            .map(|i| PiecePlan::new(format!("P {i}"), 50.0 * i as f64, 30.0 * i as f64))
            .collect();
        let scans = ScanCatalog::empty();

        let sequential = GeometryPipeline::new().build_piece_meshes(&plans, &scans).unwrap();
        let parallel = GeometryPipeline::new()
            .with_parallel(true)
            .build_piece_meshes(&plans, &scans)
            .unwrap();

        assert_eq!(sequential.len(), parallel.len());
        for (s, p) in sequential.iter().zip(&parallel) {
            assert_eq!(s.piece_id, p.piece_id);
            assert_eq!(s.mesh, p.mesh);
        }
    }
}
