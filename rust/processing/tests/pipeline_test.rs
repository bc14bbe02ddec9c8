// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end runs of the piece pipeline

use approx::assert_relative_eq;
use rebuild_geometry::{ClippingProcessor, Placement, Point3, Vector3};
use rebuild_processing::layout::fallback_center;
use rebuild_processing::pipeline::{SCAN, SYNTHETIC};
use rebuild_processing::{
    synthetic_box, GeometryPipeline, PiecePlan, PipelineConfig, ScanCatalog,
};
use std::fs;

const TETRA_OBJ: &str = "\
v 0 0 0
v 1000 0 0
v 0 1000 0
v 0 0 1000
f 1 3 2
f 1 2 4
f 1 4 3
f 2 3 4
";

#[test]
fn test_three_synthetic_pieces() {
    let plans = vec![
        PiecePlan::new("", 100.0, 0.0),
        PiecePlan::new("", 200.0, 90.0),
        PiecePlan::new("", 300.0, 180.0),
    ];
    let pieces = GeometryPipeline::new()
        .build_piece_meshes(&plans, &ScanCatalog::empty())
        .unwrap();

    let ids: Vec<_> = pieces.iter().map(|p| p.piece_id.as_str()).collect();
    assert_eq!(ids, ["piece-1", "piece-2", "piece-3"]);

    let clipper = ClippingProcessor::new();
    for (index, (piece, plan)) in pieces.iter().zip(&plans).enumerate() {
        assert_eq!(piece.source_strategy, SYNTHETIC);
        assert!(piece.mesh.is_watertight());

        // Each box is cut through its own centroid at its own angle
        let half = clipper.slice_at_angle(&synthetic_box(plan), plan.optimal_cut_angle);
        let expected = fallback_center(index);
        let placed = Placement::new(plan.optimal_cut_angle, expected).apply(&half);
        let (min, max) = piece.mesh.bounds();
        let (emin, emax) = placed.bounds();
        assert_relative_eq!(min.coords, emin.coords, epsilon = 1e-6);
        assert_relative_eq!(max.coords, emax.coords, epsilon = 1e-6);
    }

    // Piece 1: 600 x 400 x 600 box cut at x = 0 keeps x in [0, 300]
    let (min, max) = pieces[0].mesh.bounds();
    let origin = fallback_center(0);
    assert_relative_eq!(min.x - origin.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(max.x - origin.x, 300.0, epsilon = 1e-6);
    assert_relative_eq!(max.y - min.y, 400.0, epsilon = 1e-6);
}

#[test]
fn test_scan_cycling_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.obj");
    let b = dir.path().join("b.obj");
    fs::write(&a, TETRA_OBJ).unwrap();
    fs::write(&b, TETRA_OBJ).unwrap();

    let plans: Vec<_> = (0..5).map(|i| PiecePlan::new(format!("p{i}"), 10.0, 0.0)).collect();
    let pieces = GeometryPipeline::new()
        .build_piece_meshes(&plans, &ScanCatalog::from_paths([a.clone(), b.clone()]))
        .unwrap();

    let sources: Vec<_> = pieces
        .iter()
        .map(|p| p.source_path.clone().unwrap())
        .collect();
    assert_eq!(sources, vec![a.clone(), b.clone(), a.clone(), b, a]);
    assert!(pieces.iter().all(|p| p.source_strategy == SCAN));
    assert!(pieces.iter().all(|p| p.mesh.is_watertight()));
}

#[test]
fn test_unsupported_scan_position_synthesizes() {
    let dir = tempfile::tempdir().unwrap();
    let scan = dir.path().join("scan.obj");
    let notes = dir.path().join("notes.txt");
    fs::write(&scan, TETRA_OBJ).unwrap();
    fs::write(&notes, "not a mesh").unwrap();

    let plans: Vec<_> = (0..3).map(|i| PiecePlan::new(format!("p{i}"), 10.0, 0.0)).collect();
    let pieces = GeometryPipeline::from_config(&PipelineConfig::default())
        .build_piece_meshes(&plans, &ScanCatalog::from_paths([scan, notes]))
        .unwrap();

    let strategies: Vec<_> = pieces.iter().map(|p| p.source_strategy).collect();
    assert_eq!(strategies, [SCAN, SYNTHETIC, SCAN]);
}

#[test]
fn test_declared_center_moves_piece() {
    let plan = PiecePlan::new("placed", 400.0, 0.0)
        .with_center_of_mass(rebuild_processing::CenterOfMass::new(1000.0, 2000.0, 3000.0));
    let piece = GeometryPipeline::new()
        .build_piece(&plan, 7, &ScanCatalog::empty())
        .unwrap();

    // 600 x 1600 x 600 box, cut at x = 0, then translated
    let (min, max) = piece.mesh.bounds();
    assert_relative_eq!(min.coords, Vector3::new(1000.0, 1200.0, 2700.0), epsilon = 1e-6);
    assert_relative_eq!(max.coords, Vector3::new(1300.0, 2800.0, 3300.0), epsilon = 1e-6);
    assert!(piece.mesh.vertices.contains(&Point3::new(1300.0, 2800.0, 3300.0)));
}
