//! STL export of tessellated parts.
//!
//! Binary layout: an 80-byte header, a little-endian `u32` triangle count,
//! then 50 bytes per triangle (normal, three vertices as `f32` triples and
//! a zero `u16` attribute). Facet normals are recomputed from the winding.

use std::io::Write;

use csg_kernel::RenderMesh;

use crate::errors::ExportError;

const HEADER_SIZE: usize = 80;

type Triangle = [[f32; 3]; 3];

/// Binary STL bytes for `mesh`. `name` goes into the header.
pub fn export_binary_stl(mesh: &RenderMesh, name: &str) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::with_capacity(HEADER_SIZE + 4 + 50 * mesh.triangle_count());
    write_binary_stl(mesh, name, &mut out)?;
    Ok(out)
}

/// ASCII STL text for `mesh`, as `solid <name>` … `endsolid <name>`.
pub fn export_ascii_stl(mesh: &RenderMesh, name: &str) -> Result<String, ExportError> {
    let mut out = Vec::new();
    write_ascii_stl(mesh, name, &mut out)?;
    String::from_utf8(out).map_err(|e| ExportError::MalformedMesh(e.to_string()))
}

pub fn write_binary_stl<W: Write>(
    mesh: &RenderMesh,
    name: &str,
    mut writer: W,
) -> Result<(), ExportError> {
    let triangles = triangles(mesh)?;
    let count =
        u32::try_from(triangles.len()).map_err(|_| ExportError::TooManyTriangles(triangles.len()))?;

    let mut header = [b' '; HEADER_SIZE];
    let text = name.as_bytes();
    let n = text.len().min(HEADER_SIZE);
    header[..n].copy_from_slice(&text[..n]);
    writer.write_all(&header)?;
    writer.write_all(&count.to_le_bytes())?;

    for tri in &triangles {
        for c in facet_normal(tri) {
            writer.write_all(&c.to_le_bytes())?;
        }
        for v in tri {
            for c in v {
                writer.write_all(&c.to_le_bytes())?;
            }
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    Ok(())
}

pub fn write_ascii_stl<W: Write>(
    mesh: &RenderMesh,
    name: &str,
    mut writer: W,
) -> Result<(), ExportError> {
    let triangles = triangles(mesh)?;
    // Solid names end at the first whitespace.
    let name: String = name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    writeln!(writer, "solid {name}")?;
    for tri in &triangles {
        let [nx, ny, nz] = facet_normal(tri);
        writeln!(writer, "  facet normal {nx:.6e} {ny:.6e} {nz:.6e}")?;
        writeln!(writer, "    outer loop")?;
        for [x, y, z] in tri {
            writeln!(writer, "      vertex {x:.6e} {y:.6e} {z:.6e}")?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;
    Ok(())
}

/// Resolve the index buffer into triangles, checking every index.
fn triangles(mesh: &RenderMesh) -> Result<Vec<Triangle>, ExportError> {
    if mesh.indices.is_empty() {
        return Err(ExportError::EmptyMesh);
    }
    if mesh.indices.len() % 3 != 0 {
        return Err(ExportError::MalformedMesh(format!(
            "index count {} is not a multiple of 3",
            mesh.indices.len()
        )));
    }
    if mesh.vertices.len() % 3 != 0 {
        return Err(ExportError::MalformedMesh(format!(
            "vertex buffer length {} is not a multiple of 3",
            mesh.vertices.len()
        )));
    }
    let vertex = |i: u32| -> Result<[f32; 3], ExportError> {
        let at = i as usize * 3;
        mesh.vertices
            .get(at..at + 3)
            .map(|v| [v[0], v[1], v[2]])
            .ok_or_else(|| ExportError::MalformedMesh(format!("index {i} out of range")))
    };
    mesh.indices
        .chunks(3)
        .map(|t| Ok([vertex(t[0])?, vertex(t[1])?, vertex(t[2])?]))
        .collect()
}

/// Unit normal by the right-hand rule; zero for a degenerate triangle.
fn facet_normal(tri: &Triangle) -> [f32; 3] {
    let [a, b, c] = tri.map(|v| v.map(f64::from));
    let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = [
        e1[1] * e2[2] - e1[2] * e2[1],
        e1[2] * e2[0] - e1[0] * e2[2],
        e1[0] * e2[1] - e1[1] * e2[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > f64::EPSILON {
        n.map(|c| (c / len) as f32)
    } else {
        [0.0; 3]
    }
}
