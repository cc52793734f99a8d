//! Wavefront OBJ reader.
//!
//! Only geometry is read:
//! - `v x y z [w]` appends a vertex position (`w` is ignored)
//! - `f a b c ...` appends a polygon, fan-triangulated around its first
//!   corner
//!
//! Face corners may be written `i`, `i/t`, `i/t/n` or `i//n`; only the
//! position index `i` is used. Indices are 1-based, and negative indices
//! count back from the most recent vertex. Every other directive
//! (`vn`, `vt`, `o`, `g`, `usemtl`, `mtllib`, ...) and comments are
//! skipped.

use std::path::Path;

use frustum_types::{FrustumError, FrustumResult, Scalar};

use crate::mesh::Mesh;

/// Parses OBJ text into a validated [`Mesh`].
pub fn parse_obj(source: &str) -> FrustumResult<Mesh> {
    let mut mesh = Mesh::default();

    for (number, raw) in source.lines().enumerate() {
        let line_no = number + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let position = parse_vertex(tokens, line_no)?;
                mesh.positions.push(position);
            }
            Some("f") => {
                let corners = tokens
                    .map(|token| parse_corner(token, mesh.positions.len(), line_no))
                    .collect::<FrustumResult<Vec<u32>>>()?;
                if corners.len() < 3 {
                    return Err(malformed(line_no, "face needs at least three vertices"));
                }
                for i in 1..corners.len() - 1 {
                    mesh.triangles.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if mesh.triangles.is_empty() {
        tracing::warn!(vertices = mesh.vertex_count(), "OBJ source contains no faces");
    }
    mesh.validate()?;
    Ok(mesh)
}

/// Reads and parses an OBJ file.
pub fn load_obj(path: impl AsRef<Path>) -> FrustumResult<Mesh> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let mesh = parse_obj(&source)?;
    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "loaded OBJ mesh"
    );
    Ok(mesh)
}

fn parse_vertex<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
    line_no: usize,
) -> FrustumResult<[Scalar; 3]> {
    let mut position = [0.0; 3];
    for slot in &mut position {
        let token = tokens
            .next()
            .ok_or_else(|| malformed(line_no, "vertex needs three coordinates"))?;
        *slot = token
            .parse::<Scalar>()
            .map_err(|_| malformed(line_no, &format!("bad coordinate '{token}'")))?;
    }
    Ok(position)
}

/// Resolves one face corner to a zero-based vertex index.
fn parse_corner(token: &str, vertex_count: usize, line_no: usize) -> FrustumResult<u32> {
    let index_text = token.split('/').next().unwrap_or("");
    let index: i64 = index_text
        .parse()
        .map_err(|_| malformed(line_no, &format!("bad face index '{token}'")))?;

    let resolved = match index {
        0 => None,
        i if i > 0 => Some(i - 1),
        i => (vertex_count as i64).checked_add(i).filter(|&r| r >= 0),
    };
    resolved
        .filter(|&r| (r as usize) < vertex_count)
        .and_then(|r| u32::try_from(r).ok())
        .ok_or_else(|| {
            malformed(
                line_no,
                &format!("face index {index} does not name one of {vertex_count} vertices"),
            )
        })
}

fn malformed(line_no: usize, detail: &str) -> FrustumError {
    FrustumError::InvalidMesh(format!("line {line_no}: {detail}"))
}
