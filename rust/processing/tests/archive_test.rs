// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry archive packaging through a project session

use rebuild_processing::{
    geometries_to_obj, mesh_to_obj, plans_from_json, Error, GeometryPipeline, ProjectSession,
    ScanCatalog, LAYOUT_ENTRY,
};
use std::fs;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const PLANS: &str = r#"[
    {"piece_id": "Steel Beam", "mass_kg": 400, "optimal_cut_angle": 45,
     "center_of_mass": {"x": 0, "y": 0, "z": 0}},
    {"piece_id": "", "mass_kg": 150, "optimal_cut_angle": 0}
]"#;

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut text = String::new();
    archive.by_name(name).unwrap().read_to_string(&mut text).unwrap();
    text
}

#[test]
fn test_archive_before_processing_fails() {
    let session = ProjectSession::new(GeometryPipeline::new());
    let err = session.build_geometry_archive().unwrap_err();
    assert!(matches!(err, Error::NoProcessedProject));
    assert!(err.to_string().contains("run processing at least once"));
}

#[test]
fn test_archive_holds_every_piece_and_layout() {
    let plans = plans_from_json(PLANS).unwrap();
    let mut session = ProjectSession::new(GeometryPipeline::new());
    let pieces = session.process(plans, ScanCatalog::empty()).unwrap().to_vec();
    assert!(session.has_processed_project());
    let project = session.last_project().unwrap();
    assert_eq!(project.plans.len(), 2);
    assert_eq!(project.geometries.len(), pieces.len());

    let bytes = session.build_geometry_archive().unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, ["layout.obj", "piece-2.obj", "steel-beam.obj"]);

    let beam = read_entry(&mut archive, "steel-beam.obj");
    assert!(beam.starts_with("# ReBuild Intelligence OBJ export\no steel-beam\n"));
    let vertex_lines = beam.lines().filter(|l| l.starts_with("v ")).count();
    let face_lines = beam.lines().filter(|l| l.starts_with("f ")).count();
    assert_eq!(vertex_lines, pieces[0].mesh.vertex_count());
    assert_eq!(face_lines, pieces[0].mesh.triangle_count());

    let layout = read_entry(&mut archive, LAYOUT_ENTRY);
    assert!(layout.contains("o Steel Beam\n"));
    assert!(layout.contains("o piece-2\n"));
    assert_eq!(layout.lines().filter(|l| l.starts_with("f ")).count(), 12);
}

#[test]
fn test_archive_packages_processed_meshes_without_rereading_scans() {
    let dir = tempfile::tempdir().unwrap();
    let scan = dir.path().join("tetra.obj");
    fs::write(
        &scan,
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 3 2\nf 1 2 4\nf 1 4 3\nf 2 3 4\n",
    )
    .unwrap();

    let plans = plans_from_json(r#"[{"piece_id": "a", "mass_kg": 10, "optimal_cut_angle": 0}]"#)
        .unwrap();
    let mut session = ProjectSession::new(GeometryPipeline::new());
    let processed = session
        .process(plans, ScanCatalog::from_paths([scan.clone()]))
        .unwrap()
        .to_vec();
    assert_eq!(processed[0].source_strategy, "scan");

    fs::remove_file(&scan).unwrap();

    let bytes = session.build_geometry_archive().unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(read_entry(&mut archive, "a.obj"), mesh_to_obj("a", &processed[0].mesh).unwrap());
}

#[test]
fn test_combined_obj_offsets_indices() {
    let plans = plans_from_json(PLANS).unwrap();
    let pieces = GeometryPipeline::new()
        .build_piece_meshes(&plans, &ScanCatalog::empty())
        .unwrap();
    let obj = geometries_to_obj(&pieces).unwrap();

    let total_vertices = pieces[0].mesh.vertex_count() + pieces[1].mesh.vertex_count();
    let max_index = obj
        .lines()
        .filter(|l| l.starts_with("f "))
        .flat_map(|l| l.split_whitespace().skip(1))
        .map(|i| i.parse::<usize>().unwrap())
        .max()
        .unwrap();
    assert_eq!(max_index, total_vertices);
}
