//! Integration tests for frustum-mesh.

use frustum_gpu::DeviceContext;
use frustum_mesh::generators::unit_cube;
use frustum_mesh::obj::{load_obj, parse_obj};
use frustum_mesh::Mesh;
use frustum_types::FrustumError;

// ─── Mesh Tests ──────────────────────────────────────────────

fn make_single_triangle() -> Mesh {
    Mesh {
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        triangles: vec![[0, 1, 2]],
    }
}

#[test]
fn basic_counts() {
    let mesh = make_single_triangle();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.position(1), [1.0, 0.0, 0.0]);
    assert_eq!(mesh.triangle(0), [0, 1, 2]);
}

#[test]
fn validate_ok() {
    assert!(make_single_triangle().validate().is_ok());
}

#[test]
fn validate_catches_oob_index() {
    let mut mesh = make_single_triangle();
    mesh.triangles[0][2] = 99;
    assert!(matches!(mesh.validate(), Err(FrustumError::InvalidMesh(_))));
}

#[test]
fn validate_catches_degenerate() {
    let mut mesh = make_single_triangle();
    mesh.triangles = vec![[0, 0, 1]];
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_catches_nan() {
    let mut mesh = make_single_triangle();
    mesh.positions[1][2] = f64::NAN;
    assert!(mesh.validate().is_err());
}

#[test]
fn bounds_of_cube() {
    let (lo, hi) = unit_cube().bounds().unwrap();
    assert_eq!(lo, [0.0, 0.0, 0.0]);
    assert_eq!(hi, [1.0, 1.0, 1.0]);
    assert!(Mesh::default().bounds().is_none());
}

#[test]
fn to_device_homogeneous_rows() {
    let ctx = DeviceContext::cpu();
    let mesh = make_single_triangle();
    let matrix = mesh.to_device(&ctx).unwrap();
    assert_eq!(matrix.rows(), 3);
    assert_eq!(matrix.cols(), 4);
    assert_eq!(matrix.capacity(), 3);
    assert_eq!(matrix.row(1).unwrap(), vec![1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn to_device_rejects_invalid_mesh() {
    let ctx = DeviceContext::cpu();
    let mut mesh = make_single_triangle();
    mesh.triangles[0] = [0, 1, 7];
    assert!(mesh.to_device(&ctx).is_err());
}

#[test]
fn serde_round_trip() {
    let mesh = unit_cube();
    let json = serde_json::to_string(&mesh).unwrap();
    let back: Mesh = serde_json::from_str(&json).unwrap();
    assert_eq!(back, mesh);
}

// ─── Generator Tests ─────────────────────────────────────────

#[test]
fn unit_cube_counts() {
    let mesh = unit_cube();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    assert!(mesh.validate().is_ok());
}

#[test]
fn unit_cube_uses_every_vertex() {
    let mesh = unit_cube();
    let mut used = [false; 8];
    for tri in &mesh.triangles {
        for &v in tri {
            used[v as usize] = true;
        }
    }
    assert!(used.iter().all(|&u| u));
}

// ─── OBJ Tests ───────────────────────────────────────────────

const TRIANGLE_OBJ: &str = "\
# a single triangle
o tri
v 0 0 0
v 1.5 0 0
v 0 2 -1
vn 0 0 1
f 1 2 3
";

#[test]
fn obj_triangle() {
    let mesh = parse_obj(TRIANGLE_OBJ).unwrap();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.position(2), [0.0, 2.0, -1.0]);
    assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
}

#[test]
fn obj_corner_formats() {
    let source = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1/1 2/2/2 3//3\nf 1 3/7 4/1/1\n";
    let mesh = parse_obj(source).unwrap();
    assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3]]);
}

#[test]
fn obj_quad_fan_triangulated() {
    let source = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv -1 1 0\nf 1 2 3 4 5\n";
    let mesh = parse_obj(source).unwrap();
    assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
}

#[test]
fn obj_negative_indices() {
    let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
    let mesh = parse_obj(source).unwrap();
    assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
}

#[test]
fn obj_ignores_unknown_directives() {
    let source = "mtllib a.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\ns off\nusemtl red\nvt 0 0\nf 1 2 3 # trailing\n";
    let mesh = parse_obj(source).unwrap();
    assert_eq!(mesh.triangle_count(), 1);
}

#[test]
fn obj_malformed_vertex_reports_line() {
    let source = "v 0 0 0\nv 1 zero 0\n";
    match parse_obj(source) {
        Err(FrustumError::InvalidMesh(msg)) => assert!(msg.contains("line 2"), "{msg}"),
        other => panic!("expected InvalidMesh, got {other:?}"),
    }
}

#[test]
fn obj_short_face_rejected() {
    let source = "v 0 0 0\nv 1 0 0\nf 1 2\n";
    match parse_obj(source) {
        Err(FrustumError::InvalidMesh(msg)) => assert!(msg.contains("line 3"), "{msg}"),
        other => panic!("expected InvalidMesh, got {other:?}"),
    }
}

#[test]
fn obj_index_out_of_range_rejected() {
    let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n";
    assert!(matches!(parse_obj(source), Err(FrustumError::InvalidMesh(_))));
    let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n";
    assert!(parse_obj(source).is_err());
    let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -4 1 2\n";
    assert!(parse_obj(source).is_err());
}

#[test]
fn load_obj_from_file() {
    let path = std::env::temp_dir().join(format!("frustum_mesh_test_{}.obj", std::process::id()));
    std::fs::write(&path, TRIANGLE_OBJ).unwrap();
    let mesh = load_obj(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(mesh.triangle_count(), 1);
}

#[test]
fn load_obj_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("frustum_mesh_definitely_missing.obj");
    assert!(matches!(load_obj(path), Err(FrustumError::Io(_))));
}
