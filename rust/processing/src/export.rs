// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OBJ text export
//!
//! Two independent writers share the same header:
//!
//! - [`pieces_to_obj`] is a layout proxy built from plans alone: one
//!   8-vertex box per piece in metres, written as quads.
//! - [`geometries_to_obj`] writes the finished triangle meshes.
//!
//! The proxy rotates boxes with `x' = x cos a - z sin a`, `z' = x sin a +
//! z cos a`, the opposite yaw sense to the pipeline's placement transform.
//! Consumers of the layout file rely on that convention, so it is kept.

use crate::error::Result;
use crate::plan::{PieceGeometry, PiecePlan};
use rebuild_geometry::{Mesh, Point3};
use std::fmt::{self, Write};

/// First line of every exported file
pub const OBJ_HEADER: &str = "# ReBuild Intelligence OBJ export";

const PROXY_WIDTH: f64 = 0.6;
const PROXY_DEPTH: f64 = 0.6;
const PROXY_MIN_HEIGHT: f64 = 0.25;
const PROXY_MAX_HEIGHT: f64 = 2.5;
/// Height used when the plan has no mass
const PROXY_MASSLESS_HEIGHT: f64 = 0.4;
const PROXY_KG_PER_METER: f64 = 120.0;

/// Quads over the 8 box corners, 1-based
const PROXY_FACES: [[usize; 4]; 6] = [
    [1, 2, 3, 4],
    [5, 6, 7, 8],
    [1, 5, 8, 4],
    [2, 6, 7, 3],
    [4, 3, 7, 8],
    [1, 2, 6, 5],
];

/// Proxy box height in metres
pub fn proxy_height(mass_kg: f64) -> f64 {
    let height = if mass_kg != 0.0 {
        mass_kg / PROXY_KG_PER_METER
    } else {
        PROXY_MASSLESS_HEIGHT
    };
    height.clamp(PROXY_MIN_HEIGHT, PROXY_MAX_HEIGHT)
}

/// Proxy box centre in metres, falling back per axis
pub fn proxy_center(plan: &PiecePlan, index: usize) -> Point3<f64> {
    let i = index as f64;
    let center = plan.center_of_mass.unwrap_or_default();
    Point3::new(
        center.x.unwrap_or(i * 0.65 - 2.0),
        center.y.unwrap_or(0.6 + i * 0.05),
        center.z.unwrap_or(0.0),
    )
}

/// The 8 corners of a plan's proxy box, in export order
pub fn proxy_vertices(plan: &PiecePlan, index: usize) -> [Point3<f64>; 8] {
    let hw = PROXY_WIDTH / 2.0;
    let hh = proxy_height(plan.mass_kg) / 2.0;
    let hd = PROXY_DEPTH / 2.0;
    let base = [
        (-hw, -hh, -hd),
        (hw, -hh, -hd),
        (hw, hh, -hd),
        (-hw, hh, -hd),
        (-hw, -hh, hd),
        (hw, -hh, hd),
        (hw, hh, hd),
        (-hw, hh, hd),
    ];

    let (sin, cos) = plan.optimal_cut_angle.to_radians().sin_cos();
    let c = proxy_center(plan, index);
    base.map(|(x, y, z)| {
        Point3::new(
            x * cos - z * sin + c.x,
            y + c.y,
            x * sin + z * cos + c.z,
        )
    })
}

/// Layout proxy for a set of plans
pub fn pieces_to_obj(plans: &[PiecePlan]) -> Result<String> {
    let mut out = String::new();
    write_pieces_obj(&mut out, plans)?;
    Ok(out)
}

/// One finished mesh as a standalone OBJ file
pub fn mesh_to_obj(name: &str, mesh: &Mesh) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{OBJ_HEADER}")?;
    write_object(&mut out, name, mesh, 0)?;
    Ok(out)
}

/// All finished meshes in one OBJ file, one object per piece
pub fn geometries_to_obj(geometries: &[PieceGeometry]) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{OBJ_HEADER}")?;

    let mut offset = 0usize;
    for geometry in geometries {
        write_object(&mut out, &geometry.piece_id, &geometry.mesh, offset)?;
        offset += geometry.mesh.vertex_count();
    }
    Ok(out)
}

/// Write the layout proxy to any text sink
pub fn write_pieces_obj<W: Write>(out: &mut W, plans: &[PiecePlan]) -> fmt::Result {
    writeln!(out, "{OBJ_HEADER}")?;

    let mut offset = 0usize;
    for (index, plan) in plans.iter().enumerate() {
        let vertices = proxy_vertices(plan, index);
        writeln!(out, "o {}", plan.display_name(index))?;
        for v in &vertices {
            write_vertex(out, v)?;
        }
        for [a, b, c, d] in PROXY_FACES {
            writeln!(
                out,
                "f {} {} {} {}",
                offset + a,
                offset + b,
                offset + c,
                offset + d
            )?;
        }
        offset += vertices.len();
    }
    Ok(())
}

fn write_object<W: Write>(out: &mut W, name: &str, mesh: &Mesh, offset: usize) -> fmt::Result {
    writeln!(out, "o {name}")?;
    for v in &mesh.vertices {
        write_vertex(out, v)?;
    }
    for [a, b, c] in &mesh.faces {
        writeln!(
            out,
            "f {} {} {}",
            offset + *a as usize + 1,
            offset + *b as usize + 1,
            offset + *c as usize + 1
        )?;
    }
    Ok(())
}

fn write_vertex<W: Write>(out: &mut W, v: &Point3<f64>) -> fmt::Result {
    writeln!(out, "v {:.6} {:.6} {:.6}", v.x, v.y, v.z)
}
