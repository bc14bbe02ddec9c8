// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ reader
//!
//! Only `v` and `f` records matter. Face corners may be written as `v`,
//! `v/vt`, `v//vn` or `v/vt/vn`, and indices may be negative (relative to
//! the vertices read so far). Polygons are fan-triangulated and all
//! objects and groups end up in one mesh.

use super::{finite_point, push_fan};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use smallvec::SmallVec;
use std::io::BufRead;

/// Parse OBJ text into a mesh
pub fn parse_obj<R: BufRead>(reader: R) -> Result<Mesh> {
    let mut mesh = Mesh::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let mut coords = [0.0f64; 3];
                for coord in &mut coords {
                    *coord = parts
                        .next()
                        .and_then(|s| s.parse().ok())
                        .ok_or_else(|| {
                            Error::invalid_content(format!(
                                "line {}: malformed vertex",
                                line_no + 1
                            ))
                        })?;
                }
                let [x, y, z] = coords;
                mesh.add_vertex(finite_point(x, y, z, || format!("line {}", line_no + 1))?);
            }
            Some("f") => {
                let polygon = parts
                    .map(|corner| resolve_index(corner, mesh.vertex_count(), line_no + 1))
                    .collect::<Result<SmallVec<[u32; 4]>>>()?;
                if polygon.len() < 3 {
                    return Err(Error::invalid_content(format!(
                        "line {}: face needs at least 3 vertices",
                        line_no + 1
                    )));
                }
                push_fan(&mut mesh, &polygon);
            }
            _ => {}
        }
    }

    Ok(mesh)
}

/// Zero-based vertex index for one face corner
fn resolve_index(corner: &str, vertex_count: usize, line: usize) -> Result<u32> {
    let invalid = || Error::invalid_content(format!("line {line}: bad face index '{corner}'"));

    let raw: i64 = corner
        .split('/')
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(invalid)?;

    let index = match raw {
        0 => return Err(invalid()),
        i if i > 0 => i - 1,
        i => vertex_count as i64 + i,
    };

    if index < 0 || index >= vertex_count as i64 {
        return Err(invalid());
    }
    Ok(index as u32)
}
