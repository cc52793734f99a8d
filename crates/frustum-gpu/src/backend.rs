//! Device backend trait and CPU implementation.
//!
//! The [`DeviceBackend`] trait is the whole accelerator contract the
//! matrix layer consumes: raw allocation, transfers, a row-major GEMM
//! with per-operand locations, fused scale-add, and the perspective
//! divide with clip cutoff. Every call is blocking; there are no queues
//! or streams.
//!
//! [`CpuBackend`] executes the same contract on host memory. It is the
//! reference implementation and the backend used by tests and headless
//! runs.

use std::collections::HashMap;

use frustum_types::constants::CLIP_SENTINEL;
use frustum_types::{BufferId, FrustumError, FrustumResult, Scalar};

use crate::buffers::DevicePtr;

/// Dimensions of a dense multiply: `(rows × inner) · (inner × cols)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GemmShape {
    pub rows: usize,
    pub inner: usize,
    pub cols: usize,
}

impl GemmShape {
    pub fn new(rows: usize, inner: usize, cols: usize) -> Self {
        Self { rows, inner, cols }
    }

    /// Element count of the left operand.
    #[inline]
    pub fn left_len(&self) -> usize {
        self.rows * self.inner
    }

    /// Element count of the right operand.
    #[inline]
    pub fn right_len(&self) -> usize {
        self.inner * self.cols
    }

    /// Element count of the result.
    #[inline]
    pub fn out_len(&self) -> usize {
        self.rows * self.cols
    }
}

/// A GEMM input and where it lives.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    Device(DevicePtr),
    Host(&'a [Scalar]),
}

impl Operand<'_> {
    fn device_id(&self) -> Option<BufferId> {
        match self {
            Operand::Device(ptr) => Some(ptr.id()),
            Operand::Host(_) => None,
        }
    }
}

/// A GEMM destination and where it lives.
#[derive(Debug)]
pub enum Output<'a> {
    Device(DevicePtr),
    Host(&'a mut [Scalar]),
}

/// Counters a backend keeps about the calls it has served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    /// Successful `allocate` calls.
    pub allocations: u64,
    /// Successful `reallocate` calls.
    pub reallocations: u64,
    /// Successful `free` calls.
    pub frees: u64,
    /// Upload, download and device-to-device copy calls.
    pub transfers: u64,
    /// GEMM, scale-add and normalize calls.
    pub kernel_calls: u64,
    /// Elements currently allocated.
    pub resident_elements: usize,
}

/// The accelerator contract consumed by the matrix layer.
///
/// All lengths and offsets are in scalar elements. All matrices are
/// row-major.
///
/// # Implementations
/// - [`CpuBackend`]: host-memory reference (always available)
pub trait DeviceBackend {
    /// Returns the backend name (e.g., "cpu").
    fn name(&self) -> &str;

    /// Returns true if buffers live in accelerator memory.
    fn is_gpu(&self) -> bool;

    /// Allocates a block of `len` elements.
    fn allocate(&mut self, len: usize) -> FrustumResult<DevicePtr>;

    /// Resizes a block, preserving the first `min(old, new)` elements.
    fn reallocate(&mut self, ptr: DevicePtr, new_len: usize) -> FrustumResult<DevicePtr>;

    /// Returns a block to the device.
    fn free(&mut self, ptr: DevicePtr) -> FrustumResult<()>;

    /// Host → device copy of `src` into `dst[offset..]`.
    fn upload(&mut self, dst: DevicePtr, offset: usize, src: &[Scalar]) -> FrustumResult<()>;

    /// Device → host copy of `src[offset..offset + dst.len()]` into `dst`.
    fn download(&mut self, src: DevicePtr, offset: usize, dst: &mut [Scalar]) -> FrustumResult<()>;

    /// Device → device copy of `len` elements.
    fn copy(
        &mut self,
        dst: DevicePtr,
        dst_offset: usize,
        src: DevicePtr,
        src_offset: usize,
        len: usize,
    ) -> FrustumResult<()>;

    /// Dense multiply `out = left · right`.
    ///
    /// The output must not alias either input.
    fn multiply(
        &mut self,
        shape: GemmShape,
        left: Operand<'_>,
        right: Operand<'_>,
        out: Output<'_>,
    ) -> FrustumResult<()>;

    /// Fused `a[i] += b[i] * scalar` for `i in 0..len`.
    fn scale_add(&mut self, a: DevicePtr, b: DevicePtr, scalar: Scalar, len: usize) -> FrustumResult<()>;

    /// Per-row perspective divide with clip cutoff.
    ///
    /// Every column but the last is divided by the last (`w`). A quotient
    /// outside `[-1, 1]` (including the non-finite results of `w == 0`)
    /// is replaced by [`CLIP_SENTINEL`]. `w` becomes `1`.
    fn normalize_and_cutoff(&mut self, rows: usize, cols: usize, mat: DevicePtr) -> FrustumResult<()>;

    /// Returns call counters.
    fn stats(&self) -> BackendStats;
}

/// Host-memory backend.
///
/// Blocks are plain `Vec<Scalar>` keyed by id. An optional element
/// budget makes allocation failure reproducible.
#[derive(Debug, Default)]
pub struct CpuBackend {
    memory: HashMap<BufferId, Vec<Scalar>>,
    next_id: u64,
    budget: Option<usize>,
    stats: BackendStats,
}

impl CpuBackend {
    /// Creates a backend with unbounded memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that refuses to hold more than `max_elements` at once.
    pub fn with_budget(max_elements: usize) -> Self {
        Self {
            budget: Some(max_elements),
            ..Self::default()
        }
    }

    /// Number of live blocks.
    pub fn block_count(&self) -> usize {
        self.memory.len()
    }

    fn reserve(&self, extra: usize) -> FrustumResult<()> {
        if let Some(budget) = self.budget {
            let available = budget.saturating_sub(self.stats.resident_elements);
            if extra > available {
                return Err(FrustumError::OutOfDeviceMemory {
                    requested: extra,
                    available,
                });
            }
        }
        Ok(())
    }

    fn block(&self, ptr: DevicePtr) -> FrustumResult<&Vec<Scalar>> {
        self.memory
            .get(&ptr.id())
            .ok_or(FrustumError::InvalidHandle(ptr.id().0))
    }

    fn block_mut(&mut self, ptr: DevicePtr) -> FrustumResult<&mut Vec<Scalar>> {
        self.memory
            .get_mut(&ptr.id())
            .ok_or(FrustumError::InvalidHandle(ptr.id().0))
    }

    fn range(&self, ptr: DevicePtr, offset: usize, len: usize) -> FrustumResult<&[Scalar]> {
        let block = self.block(ptr)?;
        let end = checked_end(offset, len, block.len())?;
        Ok(&block[offset..end])
    }

    fn range_mut(&mut self, ptr: DevicePtr, offset: usize, len: usize) -> FrustumResult<&mut [Scalar]> {
        let block = self.block_mut(ptr)?;
        let end = checked_end(offset, len, block.len())?;
        Ok(&mut block[offset..end])
    }

    fn operand<'s>(&'s self, op: &'s Operand<'_>, len: usize) -> FrustumResult<&'s [Scalar]> {
        match op {
            Operand::Device(ptr) => self.range(*ptr, 0, len),
            Operand::Host(data) => {
                if data.len() < len {
                    return Err(FrustumError::ShapeMismatch(format!(
                        "host operand holds {} elements, GEMM needs {len}",
                        data.len()
                    )));
                }
                Ok(&data[..len])
            }
        }
    }
}

fn checked_end(offset: usize, len: usize, capacity: usize) -> FrustumResult<usize> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(end),
        _ => Err(FrustumError::IndexOutOfBounds {
            index: offset.saturating_add(len),
            len: capacity,
        }),
    }
}

/// Row-major `left (rows × inner) · right (inner × cols)`.
fn gemm(shape: GemmShape, left: &[Scalar], right: &[Scalar]) -> Vec<Scalar> {
    let GemmShape { rows, inner, cols } = shape;
    let mut out = vec![0.0; rows * cols];
    for i in 0..rows {
        let out_row = &mut out[i * cols..(i + 1) * cols];
        for k in 0..inner {
            let a = left[i * inner + k];
            if a == 0.0 {
                continue;
            }
            let right_row = &right[k * cols..(k + 1) * cols];
            for (o, b) in out_row.iter_mut().zip(right_row) {
                *o += a * b;
            }
        }
    }
    out
}

impl DeviceBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn is_gpu(&self) -> bool {
        false
    }

    fn allocate(&mut self, len: usize) -> FrustumResult<DevicePtr> {
        self.reserve(len)?;
        self.next_id += 1;
        let id = BufferId(self.next_id);
        self.memory.insert(id, vec![0.0; len]);
        self.stats.allocations += 1;
        self.stats.resident_elements += len;
        Ok(DevicePtr::new(id, len))
    }

    fn reallocate(&mut self, ptr: DevicePtr, new_len: usize) -> FrustumResult<DevicePtr> {
        let old_len = self.block(ptr)?.len();
        if new_len > old_len {
            self.reserve(new_len - old_len)?;
        }
        let block = self.block_mut(ptr)?;
        block.resize(new_len, 0.0);
        block.shrink_to_fit();
        self.stats.reallocations += 1;
        self.stats.resident_elements = self.stats.resident_elements - old_len + new_len;
        Ok(DevicePtr::new(ptr.id(), new_len))
    }

    fn free(&mut self, ptr: DevicePtr) -> FrustumResult<()> {
        let block = self
            .memory
            .remove(&ptr.id())
            .ok_or(FrustumError::InvalidHandle(ptr.id().0))?;
        self.stats.frees += 1;
        self.stats.resident_elements -= block.len();
        Ok(())
    }

    fn upload(&mut self, dst: DevicePtr, offset: usize, src: &[Scalar]) -> FrustumResult<()> {
        self.range_mut(dst, offset, src.len())?.copy_from_slice(src);
        self.stats.transfers += 1;
        Ok(())
    }

    fn download(&mut self, src: DevicePtr, offset: usize, dst: &mut [Scalar]) -> FrustumResult<()> {
        dst.copy_from_slice(self.range(src, offset, dst.len())?);
        self.stats.transfers += 1;
        Ok(())
    }

    fn copy(
        &mut self,
        dst: DevicePtr,
        dst_offset: usize,
        src: DevicePtr,
        src_offset: usize,
        len: usize,
    ) -> FrustumResult<()> {
        if dst.id() == src.id() {
            let block = self.block_mut(src)?;
            let src_end = checked_end(src_offset, len, block.len())?;
            checked_end(dst_offset, len, block.len())?;
            block.copy_within(src_offset..src_end, dst_offset);
        } else {
            let data = self.range(src, src_offset, len)?.to_vec();
            self.range_mut(dst, dst_offset, len)?.copy_from_slice(&data);
        }
        self.stats.transfers += 1;
        Ok(())
    }

    fn multiply(
        &mut self,
        shape: GemmShape,
        left: Operand<'_>,
        right: Operand<'_>,
        out: Output<'_>,
    ) -> FrustumResult<()> {
        if let Output::Device(out_ptr) = &out {
            let out_id = Some(out_ptr.id());
            if left.device_id() == out_id || right.device_id() == out_id {
                return Err(FrustumError::Device(
                    "GEMM output aliases an input operand".into(),
                ));
            }
        }

        let result = {
            let a = self.operand(&left, shape.left_len())?;
            let b = self.operand(&right, shape.right_len())?;
            gemm(shape, a, b)
        };

        match out {
            Output::Device(ptr) => {
                self.range_mut(ptr, 0, result.len())?.copy_from_slice(&result);
            }
            Output::Host(dst) => {
                if dst.len() < result.len() {
                    return Err(FrustumError::ShapeMismatch(format!(
                        "host output holds {} elements, GEMM produces {}",
                        dst.len(),
                        result.len()
                    )));
                }
                dst[..result.len()].copy_from_slice(&result);
            }
        }

        self.stats.kernel_calls += 1;
        Ok(())
    }

    fn scale_add(&mut self, a: DevicePtr, b: DevicePtr, scalar: Scalar, len: usize) -> FrustumResult<()> {
        let addend = self.range(b, 0, len)?.to_vec();
        let target = self.range_mut(a, 0, len)?;
        for (x, y) in target.iter_mut().zip(&addend) {
            *x += y * scalar;
        }
        self.stats.kernel_calls += 1;
        Ok(())
    }

    fn normalize_and_cutoff(&mut self, rows: usize, cols: usize, mat: DevicePtr) -> FrustumResult<()> {
        if cols == 0 {
            return Err(FrustumError::ShapeMismatch(
                "cannot normalize a matrix with zero columns".into(),
            ));
        }
        let data = self.range_mut(mat, 0, rows * cols)?;
        for row in data.chunks_exact_mut(cols) {
            let (coords, w) = row.split_at_mut(cols - 1);
            let w = &mut w[0];
            for value in coords.iter_mut() {
                let normalized = *value / *w;
                *value = if (-1.0..=1.0).contains(&normalized) {
                    normalized
                } else {
                    CLIP_SENTINEL
                };
            }
            *w = 1.0;
        }
        self.stats.kernel_calls += 1;
        Ok(())
    }

    fn stats(&self) -> BackendStats {
        self.stats
    }
}
