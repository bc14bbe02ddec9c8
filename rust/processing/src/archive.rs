// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Project session and zip packaging of finished pieces

use crate::error::{Error, Result};
use crate::export::{mesh_to_obj, pieces_to_obj};
use crate::pipeline::GeometryPipeline;
use crate::plan::{PieceGeometry, PiecePlan};
use crate::scans::ScanCatalog;
use rustc_hash::FxHashSet;
use std::io::{Cursor, Write};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive entry holding the layout proxy
pub const LAYOUT_ENTRY: &str = "layout.obj";

/// Inputs and finished pieces of the last processed project
#[derive(Debug, Clone)]
pub struct ProcessedProject {
    pub plans: Vec<PiecePlan>,
    pub scans: ScanCatalog,
    pub geometries: Vec<PieceGeometry>,
}

/// Remembers the last processed project so its geometry can be exported
/// on a later request
#[derive(Debug, Default)]
pub struct ProjectSession {
    pipeline: GeometryPipeline,
    last: Option<ProcessedProject>,
}

impl ProjectSession {
    pub fn new(pipeline: GeometryPipeline) -> Self {
        Self {
            pipeline,
            last: None,
        }
    }

    pub fn has_processed_project(&self) -> bool {
        self.last.is_some()
    }

    pub fn last_project(&self) -> Option<&ProcessedProject> {
        self.last.as_ref()
    }

    /// Build all pieces and remember the project on success
    pub fn process(
        &mut self,
        plans: Vec<PiecePlan>,
        scans: ScanCatalog,
    ) -> Result<&[PieceGeometry]> {
        let geometries = self.pipeline.build_piece_meshes(&plans, &scans)?;
        let project = self.last.insert(ProcessedProject {
            plans,
            scans,
            geometries,
        });
        Ok(&project.geometries)
    }

    /// Zip of `<piece_id>.obj` per processed piece plus the layout proxy
    ///
    /// The meshes are the ones [`ProjectSession::process`] returned; scans
    /// are not read again.
    ///
    /// # Errors
    ///
    /// `NoProcessedProject` when [`ProjectSession::process`] has not
    /// succeeded yet.
    pub fn build_geometry_archive(&self) -> Result<Vec<u8>> {
        let project = self.last.as_ref().ok_or(Error::NoProcessedProject)?;
        build_geometry_archive(&project.plans, &project.geometries)
    }
}

/// Zip finished pieces together with the layout proxy of their plans
///
/// Entry names follow the piece ids; repeated ids get a numeric suffix.
pub fn build_geometry_archive(plans: &[PiecePlan], geometries: &[PieceGeometry]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut used: FxHashSet<String> = FxHashSet::default();
    used.insert(LAYOUT_ENTRY.to_string());

    for geometry in geometries {
        let name = unique_entry_name(&geometry.piece_id, &mut used);
        zip.start_file(name.as_str(), options)?;
        zip.write_all(mesh_to_obj(&geometry.piece_id, &geometry.mesh)?.as_bytes())?;
    }

    zip.start_file(LAYOUT_ENTRY, options)?;
    zip.write_all(pieces_to_obj(plans)?.as_bytes())?;

    let bytes = zip.finish()?.into_inner();
    info!(pieces = geometries.len(), bytes = bytes.len(), "Built geometry archive");
    Ok(bytes)
}

fn unique_entry_name(piece_id: &str, used: &mut FxHashSet<String>) -> String {
    let mut name = format!("{piece_id}.obj");
    let mut n = 2;
    while !used.insert(name.clone()) {
        name = format!("{piece_id}-{n}.obj");
        n += 1;
    }
    name
}
