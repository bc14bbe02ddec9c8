// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PLY reader (ASCII and binary, via ply-rs)

use super::{finite_point, push_fan};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use std::io::BufRead;

/// Read a PLY stream into a mesh, fanning polygonal faces
pub fn read_ply<R: BufRead>(mut reader: R) -> Result<Mesh> {
    let parser = Parser::<DefaultElement>::new();
    let header = parser
        .read_header(&mut reader)
        .map_err(|e| Error::invalid_content(format!("failed to parse PLY header: {e}")))?;
    let payload = parser
        .read_payload(&mut reader, &header)
        .map_err(|e| Error::invalid_content(format!("failed to read PLY payload: {e}")))?;

    let mut mesh = Mesh::new();

    if let Some(vertices) = payload.get("vertex") {
        mesh.vertices.reserve(vertices.len());
        for element in vertices {
            let coord = |key: &str| {
                float_property(element, key).ok_or_else(|| {
                    Error::invalid_content(format!("PLY vertex missing '{key}'"))
                })
            };
            let point = finite_point(coord("x")?, coord("y")?, coord("z")?, || {
                format!("PLY vertex {}", mesh.vertex_count())
            })?;
            mesh.add_vertex(point);
        }
    }

    if let Some(faces) = payload.get("face") {
        let vertex_count = mesh.vertex_count();
        for element in faces {
            let indices = index_list(element)
                .ok_or_else(|| Error::invalid_content("PLY face has no vertex index list"))?;
            if let Some(&bad) = indices.iter().find(|&&i| i < 0 || i >= vertex_count as i64) {
                return Err(Error::invalid_content(format!(
                    "PLY face index {bad} out of range for {vertex_count} vertices"
                )));
            }
            let polygon: Vec<u32> = indices.iter().map(|&i| i as u32).collect();
            push_fan(&mut mesh, &polygon);
        }
    }

    Ok(mesh)
}

fn float_property(element: &DefaultElement, key: &str) -> Option<f64> {
    match element.get(key)? {
        Property::Float(v) => Some(f64::from(*v)),
        Property::Double(v) => Some(*v),
        Property::Char(v) => Some(f64::from(*v)),
        Property::UChar(v) => Some(f64::from(*v)),
        Property::Short(v) => Some(f64::from(*v)),
        Property::UShort(v) => Some(f64::from(*v)),
        Property::Int(v) => Some(f64::from(*v)),
        Property::UInt(v) => Some(f64::from(*v)),
        _ => None,
    }
}

fn index_list(element: &DefaultElement) -> Option<Vec<i64>> {
    ["vertex_indices", "vertex_index"]
        .iter()
        .find_map(|key| match element.get(*key)? {
            Property::ListInt(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            Property::ListUInt(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            Property::ListShort(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            Property::ListUShort(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            Property::ListChar(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            Property::ListUChar(v) => Some(v.iter().map(|&i| i64::from(i)).collect()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ply_rs::ply::{
        Addable, ElementDef, Encoding, Ply, PropertyDef, PropertyType, ScalarType,
    };
    use ply_rs::writer::Writer;

    fn binary_tetrahedron() -> Vec<u8> {
        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = Encoding::BinaryLittleEndian;

        let mut vertex_def = ElementDef::new("vertex".to_string());
        for key in ["x", "y", "z"] {
            vertex_def.properties.add(PropertyDef::new(
                key.to_string(),
                PropertyType::Scalar(ScalarType::Double),
            ));
        }
        vertex_def.count = 4;
        ply.header.elements.add(vertex_def);

        let mut face_def = ElementDef::new("face".to_string());
        face_def.properties.add(PropertyDef::new(
            "vertex_index".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::UInt),
        ));
        face_def.count = 4;
        ply.header.elements.add(face_def);

        let corners = [[0.0, 0.0, 0.0], [1.5, 0.0, 0.0], [0.0, 1.5, 0.0], [0.0, 0.0, 1.5]];
        let vertices = corners
            .iter()
            .map(|&[x, y, z]| {
                let mut element = DefaultElement::new();
                element.insert("x".to_string(), Property::Double(x));
                element.insert("y".to_string(), Property::Double(y));
                element.insert("z".to_string(), Property::Double(z));
                element
            })
            .collect();
        ply.payload.insert("vertex".to_string(), vertices);

        let faces = [[0u32, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]
            .iter()
            .map(|f| {
                let mut element = DefaultElement::new();
                element.insert("vertex_index".to_string(), Property::ListUInt(f.to_vec()));
                element
            })
            .collect();
        ply.payload.insert("face".to_string(), faces);

        let mut bytes = Vec::new();
        Writer::new().write_ply(&mut bytes, &mut ply).unwrap();
        bytes
    }

    const SQUARE: &str = "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
4 0 1 2 3
";

    #[test]
    fn test_read_ascii_quad() {
        let mesh = read_ply(SQUARE.as_bytes()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_out_of_range_face_is_invalid() {
        let src = SQUARE.replace("4 0 1 2 3", "3 0 1 7");
        assert!(matches!(
            read_ply(src.as_bytes()),
            Err(Error::InvalidContent { .. })
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(matches!(
            read_ply("not a ply file".as_bytes()),
            Err(Error::InvalidContent { .. })
        ));
    }

    #[test]
    fn test_read_binary_little_endian() {
        let mesh = read_ply(binary_tetrahedron().as_slice()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]);
        assert_eq!(mesh.vertices[3].z, 1.5);
        assert!(mesh.is_watertight());
    }

    #[test]
    fn test_integer_coordinate_types() {
        let src = "\
ply
format ascii 1.0
element vertex 3
property uchar x
property char y
property ushort z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
200 -5 0
0 7 60000
3 0 1 2
";
        let mesh = read_ply(src.as_bytes()).unwrap();
        assert_eq!(mesh.vertices[1].x, 200.0);
        assert_eq!(mesh.vertices[1].y, -5.0);
        assert_eq!(mesh.vertices[2].z, 60000.0);

        let uint = src.replace("property ushort z", "property uint z");
        assert_eq!(read_ply(uint.as_bytes()).unwrap().vertices[2].z, 60000.0);
    }

    #[test]
    fn test_non_finite_vertex_is_invalid() {
        let src = SQUARE.replace("1 1 0", "1 inf 0");
        assert!(matches!(
            read_ply(src.as_bytes()),
            Err(Error::InvalidContent { .. })
        ));
    }
}
