// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ReBuild CLI - build piece geometry from plans and scans.
//!
//! ```text
//! rebuild <plans.json> [scan files...]
//! ```
//!
//! Writes `layout.obj` (the proxy layout) and `pieces.zip` (one OBJ per
//! piece plus the layout) into `REBUILD_OUTPUT_DIR`, default `.`.
//! Pipeline settings come from the `REBUILD_*` variables read by
//! `PipelineConfig::from_env`.

use anyhow::{bail, Context, Result};
use rebuild_processing::{
    build_geometry_archive, pieces_to_obj, plans_from_json, GeometryPipeline, PieceGeometry,
    PipelineConfig, ScanCatalog,
};
use std::path::PathBuf;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(plans_path) = args.next().map(PathBuf::from) else {
        bail!("usage: rebuild <plans.json> [scan files...]");
    };
    let scan_paths: Vec<PathBuf> = args.map(PathBuf::from).collect();

    let output_dir = PathBuf::from(std::env::var("REBUILD_OUTPUT_DIR").unwrap_or_else(|_| ".".into()));
    let config = PipelineConfig::from_env();

    tracing::info!(
        plans = %plans_path.display(),
        scans = scan_paths.len(),
        output_dir = %output_dir.display(),
        parallel = config.parallel,
        best_effort = config.best_effort,
        "Starting ReBuild geometry run"
    );

    let json = std::fs::read_to_string(&plans_path)
        .with_context(|| format!("reading plans from {}", plans_path.display()))?;
    let plans = plans_from_json(&json).context("parsing plans")?;
    let scans = ScanCatalog::from_paths(scan_paths);
    let pipeline = GeometryPipeline::from_config(&config);

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let layout_path = output_dir.join("layout.obj");
    std::fs::write(&layout_path, pieces_to_obj(&plans)?)
        .with_context(|| format!("writing {}", layout_path.display()))?;

    let pieces: Vec<PieceGeometry> = if config.best_effort {
        let results = pipeline.build_piece_meshes_isolated(&plans, &scans);
        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!(failed, "Some pieces failed and are left out of the archive");
        }
        results.into_iter().filter_map(|r| r.ok()).collect()
    } else {
        pipeline.build_piece_meshes(&plans, &scans)?
    };

    for piece in &pieces {
        tracing::info!(
            piece_id = %piece.piece_id,
            source = piece.source_strategy,
            repair = piece.repair_strategy,
            faces = piece.mesh.triangle_count(),
            "Piece ready"
        );
    }

    let archive = build_geometry_archive(&plans, &pieces)?;
    let archive_path = output_dir.join("pieces.zip");
    std::fs::write(&archive_path, &archive)
        .with_context(|| format!("writing {}", archive_path.display()))?;
    tracing::info!(
        path = %archive_path.display(),
        bytes = archive.len(),
        pieces = pieces.len(),
        "Wrote geometry archive"
    );

    Ok(())
}
