// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STL reader, ASCII and binary
//!
//! A file is binary when its length matches the 80-byte header, the
//! triangle count and 50 bytes per triangle. Otherwise it must be ASCII and
//! start with `solid`. Binary files whose header happens to begin with
//! `solid` are still read as binary.

use super::finite_point;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use nalgebra::Point3;
use std::io::Read;

const HEADER_SIZE: usize = 80;
const TRIANGLE_SIZE: usize = 50;

/// Read an STL stream into an unwelded triangle soup
pub fn read_stl<R: Read>(mut reader: R) -> Result<Mesh> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    if let Some(count) = binary_triangle_count(&bytes) {
        return read_binary(&bytes[HEADER_SIZE + 4..], count);
    }

    let text = std::str::from_utf8(&bytes)
        .map_err(|_| Error::invalid_content("STL is neither binary nor ASCII"))?;
    if !text.trim_start().starts_with("solid") {
        return Err(Error::invalid_content("STL is neither binary nor ASCII"));
    }
    read_ascii(text)
}

fn binary_triangle_count(bytes: &[u8]) -> Option<usize> {
    let count_bytes: [u8; 4] = bytes.get(HEADER_SIZE..HEADER_SIZE + 4)?.try_into().ok()?;
    let count = u32::from_le_bytes(count_bytes) as usize;
    let expected = count.checked_mul(TRIANGLE_SIZE)?.checked_add(HEADER_SIZE + 4)?;
    (expected == bytes.len()).then_some(count)
}

fn read_binary(body: &[u8], count: usize) -> Result<Mesh> {
    let mut mesh = Mesh::with_capacity(count * 3, count);
    for (n, record) in body.chunks_exact(TRIANGLE_SIZE).enumerate() {
        // Skip the stored normal
        let base = mesh.vertex_count() as u32;
        for offset in [12, 24, 36] {
            mesh.add_vertex(read_point(&record[offset..offset + 12], n)?);
        }
        mesh.add_triangle(base, base + 1, base + 2);
    }
    Ok(mesh)
}

fn read_point(buf: &[u8], triangle: usize) -> Result<Point3<f64>> {
    let f = |i: usize| f64::from(f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]));
    finite_point(f(0), f(4), f(8), || format!("triangle {triangle}"))
}

fn read_ascii(text: &str) -> Result<Mesh> {
    let mut mesh = Mesh::new();
    let mut pending: Vec<u32> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("vertex") => {
                let coords: Vec<f64> = parts.filter_map(|s| s.parse().ok()).collect();
                if coords.len() != 3 {
                    return Err(Error::invalid_content(format!(
                        "line {}: malformed vertex",
                        line_no + 1
                    )));
                }
                let point = finite_point(coords[0], coords[1], coords[2], || {
                    format!("line {}", line_no + 1)
                })?;
                pending.push(mesh.add_vertex(point));
            }
            Some("endloop") => {
                if pending.len() != 3 {
                    return Err(Error::invalid_content(format!(
                        "line {}: facet has {} vertices",
                        line_no + 1,
                        pending.len()
                    )));
                }
                mesh.add_triangle(pending[0], pending[1], pending[2]);
                pending.clear();
            }
            _ => {}
        }
    }

    Ok(mesh)
}
