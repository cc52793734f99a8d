//! Built-in meshes.
//!
//! Deterministic shapes used when no mesh file is supplied, and as
//! fixtures in tests.

use crate::mesh::Mesh;

/// The unit cube spanning `[0, 1]³`.
///
/// Eight vertices and six quad faces, each split into two triangles.
///
/// # Example
/// ```
/// use frustum_mesh::generators::unit_cube;
/// let mesh = unit_cube();
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.triangle_count(), 12);
/// ```
pub fn unit_cube() -> Mesh {
    let positions = vec![
        [0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 1.0, 1.0],
        [1.0, 1.0, 1.0],
        [1.0, 0.0, 1.0],
    ];
    let quads: [[u32; 4]; 6] = [
        [0, 1, 2, 3],
        [4, 5, 6, 7],
        [0, 4, 5, 1],
        [2, 3, 7, 6],
        [1, 2, 6, 5],
        [0, 3, 7, 4],
    ];

    let mut mesh = Mesh::with_capacity(positions.len(), quads.len() * 2);
    mesh.positions = positions;
    for [a, b, c, d] in quads {
        mesh.triangles.push([a, b, c]);
        mesh.triangles.push([a, c, d]);
    }
    mesh
}
