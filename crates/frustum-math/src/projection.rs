//! Double-buffered projection pipeline.
//!
//! A [`ProjectionBuffer`] carries a vertex set through the per-frame
//! stages without allocating:
//!
//! ```text
//! Loaded ─multiply_and_assign(camera)→ CameraApplied
//!        ─multiply(projection)→ Projected
//!        ─normalize_and_cutoff()→ Normalized
//!        ─multiply(screen)→ ScreenMapped
//! ```
//!
//! Each `multiply` writes into the swap buffer and then exchanges the
//! primary and swap handles. The host-readable screen mirror is filled
//! at most once per dirty period, on the first element read.

use std::fmt;

use frustum_gpu::{GemmShape, Operand, Output, PooledBuffer};
use frustum_types::{FrustumError, FrustumResult, Scalar};

use crate::dynamic::DynamicMatrix;
use crate::fixed::{ensure_same_device, FixedMatrix};

/// The last operation applied to a [`ProjectionBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionStage {
    /// Source data only.
    Loaded,
    /// A multiply outside the frame pipeline (object transforms).
    Transformed,
    /// Vertices multiplied by the camera transform.
    CameraApplied,
    /// Camera-space vertices multiplied by the perspective transform.
    Projected,
    /// Perspective divide and clip cutoff applied.
    Normalized,
    /// Normalized vertices mapped to pixel space.
    ScreenMapped,
}

impl ProjectionStage {
    pub fn name(self) -> &'static str {
        match self {
            ProjectionStage::Loaded => "loaded",
            ProjectionStage::Transformed => "transformed",
            ProjectionStage::CameraApplied => "camera_applied",
            ProjectionStage::Projected => "projected",
            ProjectionStage::Normalized => "normalized",
            ProjectionStage::ScreenMapped => "screen_mapped",
        }
    }

    /// Stage reached by a square multiply from this stage.
    fn after_multiply(self) -> Self {
        match self {
            ProjectionStage::CameraApplied => ProjectionStage::Projected,
            ProjectionStage::Normalized => ProjectionStage::ScreenMapped,
            _ => ProjectionStage::Transformed,
        }
    }
}

impl fmt::Display for ProjectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A [`DynamicMatrix`] with a swap buffer and a lazily filled host mirror.
pub struct ProjectionBuffer {
    matrix: DynamicMatrix,
    swap: Option<PooledBuffer>,
    screen: Vec<Scalar>,
    dirty: bool,
    stage: ProjectionStage,
}

impl ProjectionBuffer {
    /// Wraps a matrix, trimming it and allocating a matching swap buffer.
    pub fn from_matrix(mut matrix: DynamicMatrix) -> FrustumResult<Self> {
        if matrix.cols() == 0 {
            return Err(FrustumError::ShapeMismatch(
                "projection buffer needs a fixed column count".into(),
            ));
        }
        matrix.finalize()?;
        let swap = if matrix.is_empty() {
            None
        } else {
            Some(matrix.context().acquire(matrix.len())?)
        };
        Ok(Self {
            screen: vec![0.0; matrix.len()],
            matrix,
            swap,
            dirty: true,
            stage: ProjectionStage::Loaded,
        })
    }

    /// A zero-filled `rows × cols` buffer, typically a per-frame target.
    pub fn zeros(ctx: &frustum_gpu::DeviceContext, rows: usize, cols: usize) -> FrustumResult<Self> {
        Self::from_matrix(DynamicMatrix::zeros(ctx, rows, cols)?)
    }

    /// Writes `vertices · transform` straight into the primary buffer.
    ///
    /// Entry point of the frame pipeline. The swap buffer is untouched.
    pub fn multiply_and_assign<const K: usize>(
        &mut self,
        vertices: &DynamicMatrix,
        transform: &FixedMatrix<K, K>,
    ) -> FrustumResult<()> {
        ensure_same_device(self.matrix.context(), vertices.context())?;
        ensure_same_device(self.matrix.context(), transform.context())?;
        vertices.check_inner(K)?;
        self.matrix.check_inner(K)?;
        if vertices.rows() != self.rows() {
            return Err(FrustumError::ShapeMismatch(format!(
                "source has {} rows, projection buffer has {}",
                vertices.rows(),
                self.rows()
            )));
        }

        if self.rows() > 0 {
            let (left, right, out) = (vertices.live_ptr()?, transform.ptr(), self.matrix.live_ptr()?);
            let shape = GemmShape::new(self.rows(), K, K);
            self.matrix.context().with_backend(|b| {
                b.multiply(shape, Operand::Device(left), Operand::Device(right), Output::Device(out))
            })?;
        }
        self.mark(ProjectionStage::CameraApplied);
        Ok(())
    }

    /// In-place `self = self · transform` by ping-pong.
    pub fn multiply<const K: usize>(&mut self, transform: &FixedMatrix<K, K>) -> FrustumResult<()> {
        ensure_same_device(self.matrix.context(), transform.context())?;
        self.matrix.check_inner(K)?;

        if self.rows() > 0 {
            let swap = self
                .swap
                .as_ref()
                .map(PooledBuffer::ptr)
                .ok_or_else(|| FrustumError::Device("projection buffer has no swap storage".into()))?;
            let (left, right) = (self.matrix.live_ptr()?, transform.ptr());
            let shape = GemmShape::new(self.rows(), K, K);
            self.matrix.context().with_backend(|b| {
                b.multiply(shape, Operand::Device(left), Operand::Device(right), Output::Device(swap))
            })?;
            self.matrix.swap_storage(&mut self.swap);
        }
        let next = self.stage.after_multiply();
        self.mark(next);
        Ok(())
    }

    /// Per-row perspective divide with the fixed clip cutoff.
    pub fn normalize_and_cutoff(&mut self) -> FrustumResult<()> {
        if self.rows() > 0 {
            let (rows, cols, mat) = (self.rows(), self.cols(), self.matrix.live_ptr()?);
            self.matrix
                .context()
                .with_backend(|b| b.normalize_and_cutoff(rows, cols, mat))?;
        }
        self.mark(ProjectionStage::Normalized);
        Ok(())
    }

    /// Runs the whole frame pipeline in its fixed order.
    pub fn project(
        &mut self,
        vertices: &DynamicMatrix,
        camera: &FixedMatrix<4, 4>,
        projection: &FixedMatrix<4, 4>,
        screen: &FixedMatrix<4, 4>,
    ) -> FrustumResult<()> {
        self.multiply_and_assign(vertices, camera)?;
        self.multiply(projection)?;
        self.normalize_and_cutoff()?;
        self.multiply(screen)
    }

    /// Element at (`row`, `col`), synchronizing the screen mirror if dirty.
    pub fn at(&mut self, row: usize, col: usize) -> FrustumResult<Scalar> {
        if row >= self.rows() || col >= self.cols() {
            return Err(FrustumError::IndexOutOfBounds {
                index: row.saturating_mul(self.cols()).saturating_add(col),
                len: self.matrix.len(),
            });
        }
        self.sync()?;
        Ok(self.screen[row * self.cols() + col])
    }

    /// The whole synchronized screen mirror, row-major.
    pub fn to_host(&mut self) -> FrustumResult<&[Scalar]> {
        self.sync()?;
        Ok(&self.screen)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn stage(&self) -> ProjectionStage {
        self.stage
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.matrix.cols()
    }

    /// The live data as a plain matrix, e.g. as the source of another pipeline.
    #[inline]
    pub fn matrix(&self) -> &DynamicMatrix {
        &self.matrix
    }

    fn mark(&mut self, stage: ProjectionStage) {
        tracing::trace!(stage = stage.name(), rows = self.rows(), "projection stage");
        self.stage = stage;
        self.dirty = true;
    }

    fn sync(&mut self) -> FrustumResult<()> {
        if self.dirty {
            self.matrix.download_into(&mut self.screen)?;
            self.dirty = false;
        }
        Ok(())
    }
}

impl fmt::Debug for ProjectionBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionBuffer")
            .field("matrix", &self.matrix)
            .field("swap", &self.swap)
            .field("dirty", &self.dirty)
            .field("stage", &self.stage)
            .finish()
    }
}
