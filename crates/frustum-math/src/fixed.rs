//! Compile-time-sized device matrices.
//!
//! A [`FixedMatrix<R, C>`] owns one pooled device buffer of `R × C`
//! scalars and a host mirror that is only trusted while the matrix is
//! clean. Every device-side write marks the matrix dirty; the next
//! element read downloads the whole matrix once and clears the flag.
//! Writes never go through the mirror.

use glam::{DMat4, DVec4};

use frustum_gpu::{DeviceContext, DevicePtr, GemmShape, Operand, Output, PooledBuffer};
use frustum_types::{FrustumError, FrustumResult, Scalar};

/// Row-major `R × C` matrix resident in device memory.
///
/// Used for 4×4 homogeneous transforms, 1×4 points and camera basis
/// vectors. Dropping the matrix returns its buffer to the pool.
pub struct FixedMatrix<const R: usize, const C: usize> {
    buffer: PooledBuffer,
    mirror: Vec<Scalar>,
    dirty: bool,
}

impl<const R: usize, const C: usize> FixedMatrix<R, C> {
    /// Number of scalar elements.
    pub const LEN: usize = R * C;

    /// Creates a matrix from rows of values.
    pub fn new(ctx: &DeviceContext, values: [[Scalar; C]; R]) -> FrustumResult<Self> {
        let flat: Vec<Scalar> = values.iter().flatten().copied().collect();
        Self::from_slice(ctx, &flat)
    }

    /// Creates a matrix from `R × C` row-major values.
    pub fn from_slice(ctx: &DeviceContext, values: &[Scalar]) -> FrustumResult<Self> {
        check_len::<R, C>(values.len())?;
        let buffer = ctx.acquire(Self::LEN)?;
        let mut matrix = Self {
            buffer,
            mirror: Vec::new(),
            dirty: true,
        };
        matrix.upload(values)?;
        Ok(matrix)
    }

    /// Creates a zero-filled matrix.
    ///
    /// Pooled buffers keep whatever the previous owner wrote, so the
    /// zeros are uploaded explicitly.
    pub fn zeros(ctx: &DeviceContext) -> FrustumResult<Self> {
        Self::from_slice(ctx, &vec![0.0; Self::LEN])
    }

    /// Overwrites every element in place.
    pub fn fill(&mut self, values: [[Scalar; C]; R]) -> FrustumResult<()> {
        let flat: Vec<Scalar> = values.iter().flatten().copied().collect();
        self.upload(&flat)
    }

    /// Overwrites every element from `R × C` row-major values.
    pub fn fill_slice(&mut self, values: &[Scalar]) -> FrustumResult<()> {
        check_len::<R, C>(values.len())?;
        self.upload(values)
    }

    /// Copies another matrix's device contents into this one.
    pub fn assign(&mut self, other: &FixedMatrix<R, C>) -> FrustumResult<()> {
        let (dst, src) = (self.ptr(), other.ptr());
        self.context()
            .with_backend(|b| b.copy(dst, 0, src, 0, Self::LEN))?;
        self.dirty = true;
        Ok(())
    }

    /// Returns an independent copy in a freshly acquired buffer.
    pub fn try_clone(&self) -> FrustumResult<Self> {
        let buffer = self.context().acquire(Self::LEN)?;
        let (dst, src) = (buffer.ptr(), self.ptr());
        self.context()
            .with_backend(|b| b.copy(dst, 0, src, 0, Self::LEN))?;
        Ok(Self {
            buffer,
            mirror: Vec::new(),
            dirty: true,
        })
    }

    /// `self · other` as one device GEMM into a new matrix.
    pub fn multiply<const K: usize>(&self, other: &FixedMatrix<C, K>) -> FrustumResult<FixedMatrix<R, K>> {
        ensure_same_device(self.context(), other.context())?;
        let buffer = self.context().acquire(R * K)?;
        let out = buffer.ptr();
        let (left, right) = (self.ptr(), other.ptr());
        self.context().with_backend(|b| {
            b.multiply(
                GemmShape::new(R, C, K),
                Operand::Device(left),
                Operand::Device(right),
                Output::Device(out),
            )
        })?;
        Ok(FixedMatrix {
            buffer,
            mirror: Vec::new(),
            dirty: true,
        })
    }

    /// In-place `self += other * scalar`.
    pub fn multiply_add(&mut self, other: &FixedMatrix<R, C>, scalar: Scalar) -> FrustumResult<()> {
        ensure_same_device(self.context(), other.context())?;
        let (a, b) = (self.ptr(), other.ptr());
        self.context()
            .with_backend(|backend| backend.scale_add(a, b, scalar, Self::LEN))?;
        self.dirty = true;
        Ok(())
    }

    /// In-place `self -= other * scalar`.
    pub fn multiply_sub(&mut self, other: &FixedMatrix<R, C>, scalar: Scalar) -> FrustumResult<()> {
        self.multiply_add(other, -scalar)
    }

    /// Element at flat row-major `index`.
    pub fn at_flat(&mut self, index: usize) -> FrustumResult<Scalar> {
        if index >= Self::LEN {
            return Err(FrustumError::IndexOutOfBounds {
                index,
                len: Self::LEN,
            });
        }
        self.sync()?;
        Ok(self.mirror[index])
    }

    /// Element at (`row`, `col`).
    pub fn at(&mut self, row: usize, col: usize) -> FrustumResult<Scalar> {
        if row >= R || col >= C {
            return Err(FrustumError::IndexOutOfBounds {
                index: row.saturating_mul(C).saturating_add(col),
                len: Self::LEN,
            });
        }
        self.at_flat(row * C + col)
    }

    /// The whole host mirror, synchronized.
    pub fn to_host(&mut self) -> FrustumResult<&[Scalar]> {
        self.sync()?;
        Ok(&self.mirror)
    }

    /// Returns true while the host mirror is stale.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Raw device address, for pipeline GEMMs.
    #[inline]
    pub fn ptr(&self) -> DevicePtr {
        self.buffer.ptr()
    }

    /// The context the matrix was allocated from.
    #[inline]
    pub fn context(&self) -> &DeviceContext {
        self.buffer.context()
    }

    fn upload(&mut self, values: &[Scalar]) -> FrustumResult<()> {
        let dst = self.ptr();
        self.context().with_backend(|b| b.upload(dst, 0, values))?;
        self.dirty = true;
        Ok(())
    }

    fn sync(&mut self) -> FrustumResult<()> {
        if self.dirty {
            self.mirror.resize(Self::LEN, 0.0);
            let src = self.buffer.ptr();
            let mirror = &mut self.mirror;
            self.buffer
                .context()
                .with_backend(|b| b.download(src, 0, mirror))?;
            self.dirty = false;
        }
        Ok(())
    }
}

impl FixedMatrix<4, 4> {
    /// Converts to a `glam` matrix.
    ///
    /// The result transforms column vectors the way this matrix
    /// transforms row vectors: `m.to_dmat4() * p == (p · m)ᵀ`.
    pub fn to_dmat4(&mut self) -> FrustumResult<DMat4> {
        let values = self.to_host()?;
        let mut cols = [0.0; 16];
        cols.copy_from_slice(values);
        Ok(DMat4::from_cols_array(&cols))
    }

    /// Inverse of [`to_dmat4`](Self::to_dmat4).
    pub fn from_dmat4(ctx: &DeviceContext, mat: &DMat4) -> FrustumResult<Self> {
        Self::from_slice(ctx, &mat.to_cols_array())
    }
}

impl FixedMatrix<1, 4> {
    /// Converts a homogeneous row point to a `glam` vector.
    pub fn to_dvec4(&mut self) -> FrustumResult<DVec4> {
        let v = self.to_host()?;
        Ok(DVec4::new(v[0], v[1], v[2], v[3]))
    }
}

impl<const R: usize, const C: usize> std::fmt::Debug for FixedMatrix<R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedMatrix")
            .field("shape", &(R, C))
            .field("buffer", &self.buffer)
            .field("dirty", &self.dirty)
            .finish()
    }
}

fn check_len<const R: usize, const C: usize>(len: usize) -> FrustumResult<()> {
    if len != R * C {
        return Err(FrustumError::ShapeMismatch(format!(
            "{}×{} matrix needs {} values, got {}",
            R,
            C,
            R * C,
            len
        )));
    }
    Ok(())
}

pub(crate) fn ensure_same_device(a: &DeviceContext, b: &DeviceContext) -> FrustumResult<()> {
    if !a.same_device(b) {
        return Err(FrustumError::Device(
            "operands were allocated from different device contexts".into(),
        ));
    }
    Ok(())
}
