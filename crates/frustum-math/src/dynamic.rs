//! Runtime-sized, row-growable device matrices.
//!
//! Vertex sets arrive one row at a time from a loader. Appending grows
//! the row capacity by doubling (first growth to
//! [`INITIAL_ROW_CAPACITY`]), moving only the live `rows × cols`
//! elements into the new buffer. [`DynamicMatrix::finalize`] trims the
//! slack once loading is done.

use frustum_gpu::{DeviceContext, DevicePtr, GemmShape, Operand, Output, PooledBuffer};
use frustum_types::constants::INITIAL_ROW_CAPACITY;
use frustum_types::{FrustumError, FrustumResult, Scalar};

use crate::fixed::{ensure_same_device, FixedMatrix};

/// Row-major `rows × cols` matrix in device memory with spare row capacity.
///
/// The column count is fixed by [`with_cols`](Self::with_cols) or by the
/// first [`append_row`](Self::append_row) and never changes afterwards.
pub struct DynamicMatrix {
    ctx: DeviceContext,
    buffer: Option<PooledBuffer>,
    rows: usize,
    cols: usize,
    capacity: usize,
}

impl DynamicMatrix {
    /// Creates an empty matrix whose width is set by the first append.
    pub fn new(ctx: &DeviceContext) -> Self {
        Self {
            ctx: ctx.clone(),
            buffer: None,
            rows: 0,
            cols: 0,
            capacity: 0,
        }
    }

    /// Creates an empty matrix with a fixed width.
    pub fn with_cols(ctx: &DeviceContext, cols: usize) -> FrustumResult<Self> {
        if cols == 0 {
            return Err(FrustumError::ShapeMismatch(
                "matrix width must be at least one column".into(),
            ));
        }
        let mut matrix = Self::new(ctx);
        matrix.cols = cols;
        Ok(matrix)
    }

    /// Creates an exact-capacity matrix from row-major values.
    pub fn from_rows(ctx: &DeviceContext, cols: usize, values: &[Scalar]) -> FrustumResult<Self> {
        let mut matrix = Self::with_cols(ctx, cols)?;
        if values.len() % cols != 0 {
            return Err(FrustumError::ShapeMismatch(format!(
                "{} values do not form rows of {cols}",
                values.len()
            )));
        }
        let rows = values.len() / cols;
        if rows > 0 {
            let buffer = ctx.acquire(values.len())?;
            let dst = buffer.ptr();
            ctx.with_backend(|b| b.upload(dst, 0, values))?;
            matrix.buffer = Some(buffer);
        }
        matrix.rows = rows;
        matrix.capacity = rows;
        Ok(matrix)
    }

    /// Creates an exact-capacity zero matrix.
    pub fn zeros(ctx: &DeviceContext, rows: usize, cols: usize) -> FrustumResult<Self> {
        Self::from_rows(ctx, cols, &vec![0.0; rows * cols])
    }

    /// Appends one row, growing the buffer if it is full.
    ///
    /// The first append on a matrix without a fixed width sets the width.
    /// A row of any other width is rejected.
    pub fn append_row(&mut self, row: &[Scalar]) -> FrustumResult<()> {
        if self.cols == 0 {
            if row.is_empty() {
                return Err(FrustumError::ShapeMismatch(
                    "cannot append an empty row".into(),
                ));
            }
            self.cols = row.len();
        } else if row.len() != self.cols {
            return Err(FrustumError::ShapeMismatch(format!(
                "row has {} values, matrix has {} columns",
                row.len(),
                self.cols
            )));
        }

        if self.rows == self.capacity {
            let capacity = if self.capacity == 0 {
                INITIAL_ROW_CAPACITY
            } else {
                self.capacity * 2
            };
            tracing::debug!(rows = self.rows, from = self.capacity, to = capacity, "growing matrix");
            self.move_to_capacity(capacity)?;
        }

        let dst = self.live_ptr()?;
        let offset = self.rows * self.cols;
        self.ctx.with_backend(|b| b.upload(dst, offset, row))?;
        self.rows += 1;
        Ok(())
    }

    /// Trims capacity to exactly `rows`.
    ///
    /// Call once after the last append; a later append grows again.
    pub fn finalize(&mut self) -> FrustumResult<()> {
        if self.capacity > self.rows {
            tracing::debug!(rows = self.rows, capacity = self.capacity, "trimming matrix");
            self.move_to_capacity(self.rows)?;
        }
        Ok(())
    }

    /// `self · fixed` as one device GEMM into a new exact-capacity matrix.
    pub fn multiply<const N: usize, const K: usize>(
        &self,
        fixed: &FixedMatrix<N, K>,
    ) -> FrustumResult<DynamicMatrix> {
        ensure_same_device(&self.ctx, fixed.context())?;
        self.check_inner(N)?;
        let mut result = Self::with_cols(&self.ctx, K)?;
        if self.rows == 0 {
            return Ok(result);
        }

        let buffer = self.ctx.acquire(self.rows * K)?;
        let (left, right, out) = (self.live_ptr()?, fixed.ptr(), buffer.ptr());
        self.ctx.with_backend(|b| {
            b.multiply(
                GemmShape::new(self.rows, N, K),
                Operand::Device(left),
                Operand::Device(right),
                Output::Device(out),
            )
        })?;
        result.buffer = Some(buffer);
        result.rows = self.rows;
        result.capacity = self.rows;
        Ok(result)
    }

    /// Downloads the live `rows × cols` elements.
    pub fn to_host(&self) -> FrustumResult<Vec<Scalar>> {
        let mut host = vec![0.0; self.len()];
        self.download_into(&mut host)?;
        Ok(host)
    }

    /// Downloads one row.
    pub fn row(&self, index: usize) -> FrustumResult<Vec<Scalar>> {
        if index >= self.rows {
            return Err(FrustumError::IndexOutOfBounds {
                index,
                len: self.rows,
            });
        }
        let mut host = vec![0.0; self.cols];
        let src = self.live_ptr()?;
        let offset = index * self.cols;
        self.ctx.with_backend(|b| b.download(src, offset, &mut host))?;
        Ok(host)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Width, or 0 while still unset.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Allocated rows.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live element count, `rows × cols`.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[inline]
    pub fn context(&self) -> &DeviceContext {
        &self.ctx
    }

    pub(crate) fn live_ptr(&self) -> FrustumResult<DevicePtr> {
        self.buffer
            .as_ref()
            .map(PooledBuffer::ptr)
            .ok_or_else(|| FrustumError::Device("matrix has no device storage".into()))
    }

    pub(crate) fn check_inner(&self, inner: usize) -> FrustumResult<()> {
        if self.cols != inner {
            return Err(FrustumError::ShapeMismatch(format!(
                "left operand has {} columns, right operand has {inner} rows",
                self.cols
            )));
        }
        Ok(())
    }

    /// Exchanges the primary storage with `other` without copying.
    pub(crate) fn swap_storage(&mut self, other: &mut Option<PooledBuffer>) {
        std::mem::swap(&mut self.buffer, other);
    }

    pub(crate) fn download_into(&self, host: &mut [Scalar]) -> FrustumResult<()> {
        if self.rows == 0 {
            return Ok(());
        }
        let src = self.live_ptr()?;
        let len = self.len();
        self.ctx
            .with_backend(|b| b.download(src, 0, &mut host[..len]))
    }

    /// Acquire, copy live rows, release old.
    fn move_to_capacity(&mut self, capacity: usize) -> FrustumResult<()> {
        let fresh = if capacity == 0 {
            None
        } else {
            Some(self.ctx.acquire(capacity * self.cols)?)
        };
        let live = self.len();
        if let (Some(old), Some(new)) = (&self.buffer, &fresh) {
            if live > 0 {
                let (src, dst) = (old.ptr(), new.ptr());
                self.ctx.with_backend(|b| b.copy(dst, 0, src, 0, live))?;
            }
        }
        self.buffer = fresh;
        self.capacity = capacity;
        Ok(())
    }
}

impl std::fmt::Debug for DynamicMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicMatrix")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("capacity", &self.capacity)
            .field("buffer", &self.buffer)
            .finish()
    }
}
