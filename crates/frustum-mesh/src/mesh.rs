//! Core triangle mesh type.
//!
//! Positions are kept as plain `[x, y, z]` triples on the host. The
//! homogeneous `w = 1` column is only added when the mesh is uploaded,
//! because that is the layout every transform in the pipeline expects.

use serde::{Deserialize, Serialize};

use frustum_gpu::DeviceContext;
use frustum_math::DynamicMatrix;
use frustum_types::{FrustumError, FrustumResult, Scalar};

/// A triangle mesh: vertex positions and index triples into them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<[Scalar; 3]>,
    /// Triangle vertex indices, zero-based.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_capacity),
            triangles: Vec::with_capacity(triangle_capacity),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns the position of vertex `i`.
    #[inline]
    pub fn position(&self, i: usize) -> [Scalar; 3] {
        self.positions[i]
    }

    /// Returns the three vertex indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        self.triangles[t]
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - All coordinates are finite
    /// - Triangle indices are within bounds
    /// - No degenerate triangles (repeated vertex indices)
    pub fn validate(&self) -> FrustumResult<()> {
        let n = self.positions.len();

        if let Some(i) = self
            .positions
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(FrustumError::InvalidMesh(format!(
                "Vertex {i} has a non-finite coordinate"
            )));
        }

        for (t, &[a, b, c]) in self.triangles.iter().enumerate() {
            if let Some(&idx) = [a, b, c].iter().find(|&&idx| idx as usize >= n) {
                return Err(FrustumError::InvalidMesh(format!(
                    "Triangle {t} references vertex {idx} (vertex count: {n})"
                )));
            }
            if a == b || b == c || a == c {
                return Err(FrustumError::InvalidMesh(format!(
                    "Triangle {t} has repeated vertex indices: [{a}, {b}, {c}]"
                )));
            }
        }

        Ok(())
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([Scalar; 3], [Scalar; 3])> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(mut lo, mut hi), p| {
            for k in 0..3 {
                lo[k] = lo[k].min(p[k]);
                hi[k] = hi[k].max(p[k]);
            }
            (lo, hi)
        }))
    }

    /// Uploads the positions as homogeneous `(x, y, z, 1)` rows.
    ///
    /// Rows are appended one at a time, as a loader would, and the
    /// matrix is finalized before it is returned.
    pub fn to_device(&self, ctx: &DeviceContext) -> FrustumResult<DynamicMatrix> {
        self.validate()?;
        let mut matrix = DynamicMatrix::with_cols(ctx, 4)?;
        for &[x, y, z] in &self.positions {
            matrix.append_row(&[x, y, z, 1.0])?;
        }
        matrix.finalize()?;
        tracing::debug!(
            vertices = self.vertex_count(),
            triangles = self.triangle_count(),
            "mesh uploaded"
        );
        Ok(matrix)
    }
}
