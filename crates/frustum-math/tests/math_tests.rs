//! Integration tests for frustum-math.

use std::f64::consts::FRAC_PI_2;

use frustum_gpu::{CpuBackend, DeviceContext};
use frustum_math::format::format_rows;
use frustum_math::transform::{self, Transform};
use frustum_math::{DMat4, DVec4, DynamicMatrix, FixedMatrix, ProjectionBuffer, ProjectionStage};
use frustum_types::constants::EPSILON;
use frustum_types::FrustumError;

fn ctx() -> DeviceContext {
    DeviceContext::cpu()
}

/// Deterministic, well-spread test values.
fn pseudo_random(seed: f64) -> [[f64; 4]; 4] {
    let mut out = [[0.0; 4]; 4];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, v) in row.iter_mut().enumerate() {
            *v = ((seed + (i * 4 + j) as f64) * 12.9898).sin() * 3.0;
        }
    }
    out
}

fn point(ctx: &DeviceContext, x: f64, y: f64, z: f64) -> FixedMatrix<1, 4> {
    FixedMatrix::new(ctx, [[x, y, z, 1.0]]).unwrap()
}

// ─── FixedMatrix Tests ────────────────────────────────────────

#[test]
fn fixed_fill_round_trip() {
    let ctx = ctx();
    let mut m = FixedMatrix::<2, 2>::zeros(&ctx).unwrap();
    m.fill([[1.5, -2.0], [3.25, 4.0]]).unwrap();
    assert!(m.is_dirty());
    assert_eq!(m.at(1, 0).unwrap(), 3.25);
    assert!(!m.is_dirty());
    assert_eq!(m.at_flat(1).unwrap(), -2.0);
}

#[test]
fn fixed_reads_sync_once() {
    let ctx = ctx();
    let mut m = FixedMatrix::<4, 4>::new(&ctx, transform::identity()).unwrap();
    let before = ctx.backend_stats().transfers;
    for i in 0..16 {
        m.at_flat(i).unwrap();
    }
    assert_eq!(ctx.backend_stats().transfers, before + 1);
}

#[test]
fn fixed_fill_slice_overwrites() {
    let ctx = ctx();
    let mut m = FixedMatrix::<1, 4>::zeros(&ctx).unwrap();
    m.fill_slice(&[4.0, 3.0, 2.0, 1.0]).unwrap();
    assert_eq!(m.to_host().unwrap(), &[4.0, 3.0, 2.0, 1.0]);
    assert!(m.fill_slice(&[1.0; 3]).is_err());
}

#[test]
fn fixed_from_slice_checks_len() {
    let ctx = ctx();
    let err = FixedMatrix::<4, 4>::from_slice(&ctx, &[1.0; 15]).unwrap_err();
    assert!(matches!(err, FrustumError::ShapeMismatch(_)));
}

#[test]
fn fixed_at_out_of_bounds() {
    let ctx = ctx();
    let mut m = FixedMatrix::<1, 4>::zeros(&ctx).unwrap();
    assert!(matches!(m.at(0, 4), Err(FrustumError::IndexOutOfBounds { .. })));
}

#[test]
fn fixed_at_huge_row_is_an_error() {
    let ctx = ctx();
    let mut m = FixedMatrix::<4, 4>::zeros(&ctx).unwrap();
    match m.at(usize::MAX, 0) {
        Err(FrustumError::IndexOutOfBounds { index, len }) => {
            assert_eq!(index, usize::MAX);
            assert_eq!(len, 16);
        }
        other => panic!("expected IndexOutOfBounds, got {other:?}"),
    }
}

#[test]
fn fixed_zeros_clears_recycled_buffer() {
    let ctx = ctx();
    {
        let _m = FixedMatrix::<4, 4>::new(&ctx, [[9.0; 4]; 4]).unwrap();
    }
    let mut z = FixedMatrix::<4, 4>::zeros(&ctx).unwrap();
    assert_eq!(ctx.backend_stats().allocations, 1);
    assert!(z.to_host().unwrap().iter().all(|&v| v == 0.0));
}

#[test]
fn fixed_multiply_add_and_sub() {
    let ctx = ctx();
    let mut position = point(&ctx, 1.0, 2.0, 3.0);
    let forward = FixedMatrix::new(&ctx, [[0.0, 0.0, 1.0, 1.0]]).unwrap();

    position.multiply_add(&forward, 1.5).unwrap();
    assert!(position.is_dirty());
    assert_eq!(position.to_host().unwrap(), &[1.0, 2.0, 4.5, 2.5]);

    position.multiply_sub(&forward, 1.5).unwrap();
    assert_eq!(position.to_host().unwrap(), &[1.0, 2.0, 3.0, 1.0]);
}

#[test]
fn fixed_assign_and_clone() {
    let ctx = ctx();
    let a = FixedMatrix::<2, 2>::new(&ctx, [[1.0, 2.0], [3.0, 4.0]]).unwrap();
    let mut b = FixedMatrix::<2, 2>::zeros(&ctx).unwrap();
    b.assign(&a).unwrap();
    assert_eq!(b.to_host().unwrap(), &[1.0, 2.0, 3.0, 4.0]);

    let mut c = a.try_clone().unwrap();
    assert_ne!(c.ptr().id(), a.ptr().id());
    assert_eq!(c.at(1, 1).unwrap(), 4.0);
}

#[test]
fn fixed_multiply_rectangular() {
    let ctx = ctx();
    let a = FixedMatrix::<1, 2>::new(&ctx, [[1.0, 2.0]]).unwrap();
    let b = FixedMatrix::<2, 3>::new(&ctx, [[1.0, 0.0, 2.0], [0.0, 1.0, 3.0]]).unwrap();
    let mut c = a.multiply(&b).unwrap();
    assert_eq!(c.to_host().unwrap(), &[1.0, 2.0, 8.0]);
}

#[test]
fn fixed_multiply_rejects_foreign_context() {
    let a = FixedMatrix::<4, 4>::new(&ctx(), transform::identity()).unwrap();
    let b = FixedMatrix::<4, 4>::new(&ctx(), transform::identity()).unwrap();
    assert!(matches!(a.multiply(&b), Err(FrustumError::Device(_))));
}

#[test]
fn fixed_multiply_associative() {
    let ctx = ctx();
    let a = FixedMatrix::new(&ctx, pseudo_random(1.0)).unwrap();
    let b = FixedMatrix::new(&ctx, pseudo_random(2.0)).unwrap();
    let c = FixedMatrix::new(&ctx, pseudo_random(3.0)).unwrap();

    let mut left = a.multiply(&b).unwrap().multiply(&c).unwrap();
    let mut right = a.multiply(&b.multiply(&c).unwrap()).unwrap();
    let left = left.to_host().unwrap().to_vec();
    let right = right.to_host().unwrap();
    for (l, r) in left.iter().zip(right) {
        assert!((l - r).abs() < EPSILON, "{l} vs {r}");
    }
}

#[test]
fn fixed_multiply_matches_glam() {
    let ctx = ctx();
    let mut a = FixedMatrix::new(&ctx, pseudo_random(4.0)).unwrap();
    let mut b = FixedMatrix::new(&ctx, pseudo_random(5.0)).unwrap();
    let mut product = a.multiply(&b).unwrap();

    // Row-vector convention: (A·B)ᵀ = Bᵀ·Aᵀ.
    let expected: DMat4 = b.to_dmat4().unwrap() * a.to_dmat4().unwrap();
    let actual = product.to_dmat4().unwrap();
    assert!(actual.abs_diff_eq(expected, EPSILON));
}

#[test]
fn fixed_dmat4_round_trip() {
    let ctx = ctx();
    let m = DMat4::from_cols_array(&[
        1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
    ]);
    let mut fixed = FixedMatrix::from_dmat4(&ctx, &m).unwrap();
    assert_eq!(fixed.to_dmat4().unwrap(), m);
}

#[test]
fn fixed_drop_returns_buffer() {
    let ctx = ctx();
    let id = FixedMatrix::<4, 4>::zeros(&ctx).unwrap().ptr().id();
    let again = FixedMatrix::<4, 4>::zeros(&ctx).unwrap();
    assert_eq!(again.ptr().id(), id);
    assert_eq!(ctx.pool_stats().reuses, 1);
}

// ─── Transform Tests ─────────────────────────────────────────

#[test]
fn translate_origin() {
    let ctx = ctx();
    let p = point(&ctx, 0.0, 0.0, 0.0);
    let t = Transform::translate(&ctx, 1.0, 2.0, 3.0).unwrap();
    let mut moved = p.multiply(&t).unwrap();
    assert_eq!(moved.to_host().unwrap(), &[1.0, 2.0, 3.0, 1.0]);
}

#[test]
fn rotate_y_quarter_turn() {
    let ctx = ctx();
    let p = point(&ctx, 1.0, 0.0, 0.0);
    let r = Transform::rotate_y(&ctx, FRAC_PI_2).unwrap();
    let mut rotated = p.multiply(&r).unwrap().to_dvec4().unwrap();
    rotated -= DVec4::new(0.0, 0.0, -1.0, 1.0);
    assert!(rotated.abs().max_element() < EPSILON);
}

#[test]
fn rotate_x_and_z_quarter_turn() {
    let ctx = ctx();
    let rx = Transform::rotate_x(&ctx, FRAC_PI_2).unwrap();
    let rz = Transform::rotate_z(&ctx, FRAC_PI_2).unwrap();

    let mut y_axis = point(&ctx, 0.0, 1.0, 0.0).multiply(&rx).unwrap();
    let v = y_axis.to_dvec4().unwrap();
    assert!((v - DVec4::new(0.0, 0.0, 1.0, 1.0)).abs().max_element() < EPSILON);

    let mut x_axis = point(&ctx, 1.0, 0.0, 0.0).multiply(&rz).unwrap();
    let v = x_axis.to_dvec4().unwrap();
    assert!((v - DVec4::new(0.0, 1.0, 0.0, 1.0)).abs().max_element() < EPSILON);
}

#[test]
fn scale_keeps_w() {
    let ctx = ctx();
    let s = Transform::scale(&ctx, 2.0).unwrap();
    let mut scaled = point(&ctx, 1.0, -2.0, 3.0).multiply(&s).unwrap();
    assert_eq!(scaled.to_host().unwrap(), &[2.0, -4.0, 6.0, 1.0]);
}

#[test]
fn perspective_coefficients() {
    let (near, far) = (0.1, 200.0);
    let m = transform::perspective(near, far, FRAC_PI_2, FRAC_PI_2);
    assert!((m[0][0] - 1.0).abs() < 1e-12);
    assert!((m[1][1] - 1.0).abs() < 1e-12);
    assert!((m[2][2] - (far + near) / (far - near)).abs() < 1e-12);
    assert!((m[3][2] - (-2.0 * far * near / (far - near))).abs() < 1e-12);
    assert_eq!(m[2][3], 1.0);
    assert_eq!(m[3][3], 0.0);
}

#[test]
fn screen_mapping_flips_vertical() {
    let ctx = ctx();
    let s = Transform::screen_mapping(&ctx, 512.0, 360.0).unwrap();
    let mut top_left = point(&ctx, -1.0, 1.0, 0.0).multiply(&s).unwrap();
    assert_eq!(top_left.to_host().unwrap(), &[0.0, 0.0, 0.0, 1.0]);
    let mut center = point(&ctx, 0.0, 0.0, 0.0).multiply(&s).unwrap();
    assert_eq!(center.to_host().unwrap(), &[512.0, 360.0, 0.0, 1.0]);
}

// ─── DynamicMatrix Tests ─────────────────────────────────────

#[test]
fn dynamic_capacity_doubles_on_overflow() {
    let ctx = ctx();
    let mut m = DynamicMatrix::new(&ctx);
    let mut capacities = Vec::new();
    for i in 0..5 {
        m.append_row(&[i as f64, 0.0, 0.0, 1.0]).unwrap();
        capacities.push(m.capacity());
    }
    assert_eq!(capacities, vec![2, 2, 4, 4, 8]);
    assert_eq!(m.rows(), 5);
    assert_eq!(m.cols(), 4);
}

#[test]
fn dynamic_growth_preserves_rows() {
    let ctx = ctx();
    let mut m = DynamicMatrix::new(&ctx);
    for i in 0..9 {
        m.append_row(&[i as f64, -(i as f64)]).unwrap();
    }
    let host = m.to_host().unwrap();
    for i in 0..9 {
        assert_eq!(host[i * 2], i as f64);
        assert_eq!(host[i * 2 + 1], -(i as f64));
    }
}

#[test]
fn dynamic_rejects_wrong_width() {
    let ctx = ctx();
    let mut m = DynamicMatrix::with_cols(&ctx, 4).unwrap();
    assert!(matches!(
        m.append_row(&[1.0, 2.0, 3.0]),
        Err(FrustumError::ShapeMismatch(_))
    ));
    m.append_row(&[1.0, 2.0, 3.0, 1.0]).unwrap();
    assert!(m.append_row(&[1.0; 5]).is_err());
    assert_eq!(m.rows(), 1);
}

#[test]
fn dynamic_finalize_trims_capacity() {
    let ctx = ctx();
    let mut m = DynamicMatrix::new(&ctx);
    for i in 0..5 {
        m.append_row(&[i as f64, 1.0, 2.0, 1.0]).unwrap();
    }
    m.finalize().unwrap();
    assert_eq!(m.capacity(), 5);
    assert_eq!(m.rows(), 5);
    for i in 0..5 {
        assert_eq!(m.row(i).unwrap(), vec![i as f64, 1.0, 2.0, 1.0]);
    }
}

#[test]
fn dynamic_finalize_is_noop_when_exact() {
    let ctx = ctx();
    let mut m = DynamicMatrix::new(&ctx);
    m.append_row(&[1.0, 2.0]).unwrap();
    m.append_row(&[3.0, 4.0]).unwrap();
    let allocations = ctx.backend_stats().allocations;
    m.finalize().unwrap();
    assert_eq!(m.capacity(), 2);
    assert_eq!(ctx.backend_stats().allocations, allocations);
}

#[test]
fn dynamic_growth_releases_old_buffers() {
    let ctx = ctx();
    let mut m = DynamicMatrix::new(&ctx);
    for _ in 0..8 {
        m.append_row(&[0.0; 4]).unwrap();
    }
    // Buffers of 2, 4 rows were released; only the 8-row buffer is held.
    let stats = ctx.pool_stats();
    assert_eq!(stats.in_use, 1);
    assert_eq!(stats.free_buffers, 2);
}

#[test]
fn dynamic_multiply() {
    let ctx = ctx();
    let m = DynamicMatrix::from_rows(&ctx, 4, &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
    let t = Transform::translate(&ctx, 1.0, 2.0, 3.0).unwrap();
    let moved = m.multiply(&t).unwrap();
    assert_eq!(moved.rows(), 2);
    assert_eq!(moved.to_host().unwrap(), vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 4.0, 1.0]);
}

#[test]
fn dynamic_multiply_checks_inner_dimension() {
    let ctx = ctx();
    let m = DynamicMatrix::from_rows(&ctx, 3, &[1.0, 2.0, 3.0]).unwrap();
    let t = Transform::identity(&ctx).unwrap();
    assert!(matches!(m.multiply(&t), Err(FrustumError::ShapeMismatch(_))));
}

#[test]
fn dynamic_out_of_memory_propagates() {
    let ctx = DeviceContext::new(CpuBackend::with_budget(8));
    let mut m = DynamicMatrix::new(&ctx);
    m.append_row(&[0.0; 4]).unwrap();
    m.append_row(&[0.0; 4]).unwrap();
    let err = m.append_row(&[0.0; 4]).unwrap_err();
    assert!(matches!(err, FrustumError::OutOfDeviceMemory { .. }));
    assert_eq!(m.rows(), 2);
}

// ─── ProjectionBuffer Tests ──────────────────────────────────

fn cube_corner_rows() -> Vec<f64> {
    vec![
        0.0, 0.0, 5.0, 1.0, //
        1.0, 1.0, 5.0, 1.0, //
        -1.0, 0.5, 10.0, 1.0,
    ]
}

#[test]
fn projection_ping_pong_does_not_allocate() {
    let ctx = ctx();
    let mut buffer =
        ProjectionBuffer::from_matrix(DynamicMatrix::from_rows(&ctx, 4, &cube_corner_rows()).unwrap()).unwrap();
    let t = Transform::translate(&ctx, 1.0, 0.0, 0.0).unwrap();
    let allocations = ctx.backend_stats().allocations;

    buffer.multiply(&t).unwrap();
    buffer.multiply(&t).unwrap();
    assert_eq!(ctx.backend_stats().allocations, allocations);
    assert_eq!(buffer.stage(), ProjectionStage::Transformed);
    assert_eq!(buffer.at(0, 0).unwrap(), 2.0);
    assert_eq!(buffer.at(2, 0).unwrap(), 1.0);
}

#[test]
fn projection_screen_sync_once_per_dirty() {
    let ctx = ctx();
    let mut buffer =
        ProjectionBuffer::from_matrix(DynamicMatrix::from_rows(&ctx, 4, &cube_corner_rows()).unwrap()).unwrap();
    let transfers = ctx.backend_stats().transfers;
    for row in 0..3 {
        for col in 0..4 {
            buffer.at(row, col).unwrap();
        }
    }
    assert_eq!(ctx.backend_stats().transfers, transfers + 1);
    assert!(!buffer.is_dirty());

    buffer.normalize_and_cutoff().unwrap();
    assert!(buffer.is_dirty());
}

#[test]
fn projection_normalize_clips_to_sentinel() {
    let ctx = ctx();
    let rows = [2.0, -1.0, 4.0, 4.0, 3.0, 1.0, 1.0, 2.0];
    let mut buffer = ProjectionBuffer::from_matrix(DynamicMatrix::from_rows(&ctx, 4, &rows).unwrap()).unwrap();
    buffer.normalize_and_cutoff().unwrap();
    assert_eq!(buffer.stage(), ProjectionStage::Normalized);
    assert_eq!(buffer.to_host().unwrap(), &[0.5, -0.25, 1.0, 1.0, 0.0, 0.5, 0.5, 1.0]);
}

#[test]
fn projection_pipeline_stages_in_order() {
    let ctx = ctx();
    let vertices = DynamicMatrix::from_rows(&ctx, 4, &cube_corner_rows()).unwrap();
    let mut target = ProjectionBuffer::zeros(&ctx, 3, 4).unwrap();
    assert_eq!(target.stage(), ProjectionStage::Loaded);

    let camera = Transform::identity(&ctx).unwrap();
    let projection = Transform::perspective_projection(&ctx, 0.1, 200.0, FRAC_PI_2, FRAC_PI_2).unwrap();
    let screen = Transform::screen_mapping(&ctx, 100.0, 50.0).unwrap();

    target.multiply_and_assign(&vertices, &camera).unwrap();
    assert_eq!(target.stage(), ProjectionStage::CameraApplied);
    target.multiply(&projection).unwrap();
    assert_eq!(target.stage(), ProjectionStage::Projected);
    target.normalize_and_cutoff().unwrap();
    assert_eq!(target.stage(), ProjectionStage::Normalized);
    target.multiply(&screen).unwrap();
    assert_eq!(target.stage(), ProjectionStage::ScreenMapped);

    // (0,0,5) projects to the screen center.
    assert!((target.at(0, 0).unwrap() - 100.0).abs() < EPSILON);
    assert!((target.at(0, 1).unwrap() - 50.0).abs() < EPSILON);
    // (1,1,5): x/w = 0.2 → 120, y/w = 0.2 → 40.
    assert!((target.at(1, 0).unwrap() - 120.0).abs() < EPSILON);
    assert!((target.at(1, 1).unwrap() - 40.0).abs() < EPSILON);
}

#[test]
fn projection_project_matches_stepwise() {
    let ctx = ctx();
    let vertices = DynamicMatrix::from_rows(&ctx, 4, &cube_corner_rows()).unwrap();
    let camera = Transform::rotate_y(&ctx, 0.3).unwrap();
    let projection = Transform::perspective_projection(&ctx, 0.1, 200.0, 1.0, 0.8).unwrap();
    let screen = Transform::screen_mapping(&ctx, 512.0, 360.0).unwrap();

    let mut a = ProjectionBuffer::zeros(&ctx, 3, 4).unwrap();
    a.project(&vertices, &camera, &projection, &screen).unwrap();

    let mut b = ProjectionBuffer::zeros(&ctx, 3, 4).unwrap();
    b.multiply_and_assign(&vertices, &camera).unwrap();
    b.multiply(&projection).unwrap();
    b.normalize_and_cutoff().unwrap();
    b.multiply(&screen).unwrap();

    assert_eq!(a.to_host().unwrap(), b.to_host().unwrap());
}

#[test]
fn projection_rejects_row_mismatch() {
    let ctx = ctx();
    let vertices = DynamicMatrix::from_rows(&ctx, 4, &cube_corner_rows()).unwrap();
    let mut target = ProjectionBuffer::zeros(&ctx, 2, 4).unwrap();
    let camera = Transform::identity(&ctx).unwrap();
    assert!(matches!(
        target.multiply_and_assign(&vertices, &camera),
        Err(FrustumError::ShapeMismatch(_))
    ));
}

#[test]
fn projection_from_matrix_trims_slack() {
    let ctx = ctx();
    let mut m = DynamicMatrix::new(&ctx);
    for _ in 0..3 {
        m.append_row(&[0.0, 0.0, 1.0, 1.0]).unwrap();
    }
    assert_eq!(m.capacity(), 4);
    let buffer = ProjectionBuffer::from_matrix(m).unwrap();
    assert_eq!(buffer.matrix().capacity(), 3);
}

#[test]
fn projection_at_out_of_bounds() {
    let ctx = ctx();
    let mut buffer = ProjectionBuffer::zeros(&ctx, 3, 4).unwrap();
    assert!(matches!(buffer.at(3, 0), Err(FrustumError::IndexOutOfBounds { .. })));
    match buffer.at(usize::MAX, 0) {
        Err(FrustumError::IndexOutOfBounds { index, len }) => {
            assert_eq!(index, usize::MAX);
            assert_eq!(len, 12);
        }
        other => panic!("expected IndexOutOfBounds, got {other:?}"),
    }
}

// ─── Format Tests ────────────────────────────────────────────

#[test]
fn format_rows_one_line_per_row() {
    let text = format_rows(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].trim_start().starts_with("4.00000"));
    assert!(format_rows(&[1.0], 0).is_empty());
}
