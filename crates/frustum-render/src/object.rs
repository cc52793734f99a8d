//! A renderable mesh and its per-frame projection.
//!
//! [`Object3D`] keeps two [`ProjectionBuffer`]s: the object's own vertices,
//! which object transforms update in place, and a per-frame target that
//! receives `vertices · camera · projection → normalize → screen`.

use serde::{Deserialize, Serialize};

use frustum_gpu::DeviceContext;
use frustum_math::{FixedMatrix, ProjectionBuffer, Transform};
use frustum_mesh::Mesh;
use frustum_types::{FrustumResult, Scalar, TriangleId, VertexId};

use crate::projection::Projection;

/// Face colors, assigned by triangle index.
const PALETTE: [[u8; 3]; 8] = [
    [230, 25, 75],
    [60, 180, 75],
    [255, 225, 25],
    [0, 130, 200],
    [245, 130, 48],
    [145, 30, 180],
    [70, 240, 240],
    [240, 50, 230],
];

/// Color of triangle `index`.
pub fn face_color(index: usize) -> [u8; 3] {
    PALETTE[index % PALETTE.len()]
}

/// One visible triangle in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenTriangle {
    pub id: TriangleId,
    /// Mesh vertices behind the three corners.
    pub corners: [VertexId; 3],
    pub points: [[Scalar; 2]; 3],
    pub color: [u8; 3],
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenFrame {
    pub frame: u64,
    pub triangles: Vec<ScreenTriangle>,
    /// Triangles dropped because a corner was clipped.
    pub culled: u32,
}

impl ScreenFrame {
    #[inline]
    pub fn drawn(&self) -> usize {
        self.triangles.len()
    }
}

/// A mesh resident on the device, ready to be projected every frame.
pub struct Object3D {
    vertices: ProjectionBuffer,
    triangles: Vec<[u32; 3]>,
    colors: Vec<[u8; 3]>,
    projected: ProjectionBuffer,
}

impl Object3D {
    /// Uploads a mesh.
    pub fn from_mesh(ctx: &DeviceContext, mesh: &Mesh) -> FrustumResult<Self> {
        let vertices = ProjectionBuffer::from_matrix(mesh.to_device(ctx)?)?;
        let projected = ProjectionBuffer::zeros(ctx, vertices.rows(), vertices.cols())?;
        let colors = (0..mesh.triangle_count()).map(face_color).collect();
        tracing::info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "object ready"
        );
        Ok(Self {
            vertices,
            triangles: mesh.triangles.clone(),
            colors,
            projected,
        })
    }

    pub fn translate(&mut self, dx: Scalar, dy: Scalar, dz: Scalar) -> FrustumResult<()> {
        let t = Transform::translate(self.context(), dx, dy, dz)?;
        self.vertices.multiply(&t)
    }

    pub fn scale(&mut self, factor: Scalar) -> FrustumResult<()> {
        let t = Transform::scale(self.context(), factor)?;
        self.vertices.multiply(&t)
    }

    pub fn rotate_x(&mut self, angle: Scalar) -> FrustumResult<()> {
        let t = Transform::rotate_x(self.context(), angle)?;
        self.vertices.multiply(&t)
    }

    pub fn rotate_y(&mut self, angle: Scalar) -> FrustumResult<()> {
        let t = Transform::rotate_y(self.context(), angle)?;
        self.vertices.multiply(&t)
    }

    pub fn rotate_z(&mut self, angle: Scalar) -> FrustumResult<()> {
        let t = Transform::rotate_z(self.context(), angle)?;
        self.vertices.multiply(&t)
    }

    /// Runs the frame pipeline into the projection target.
    pub fn project(&mut self, camera: &FixedMatrix<4, 4>, projection: &Projection) -> FrustumResult<()> {
        self.projected.project(
            self.vertices.matrix(),
            camera,
            projection.projection_matrix(),
            projection.screen_matrix(),
        )
    }

    /// Builds screen triangles from the last projection.
    ///
    /// A triangle with any corner at the image of the clip sentinel is
    /// culled as a whole.
    pub fn assemble(&mut self, frame: u64, projection: &Projection) -> FrustumResult<ScreenFrame> {
        let cols = self.projected.cols();
        let screen = self.projected.to_host()?;
        let mut out = ScreenFrame {
            frame,
            triangles: Vec::with_capacity(self.triangles.len()),
            culled: 0,
        };

        'faces: for (t, (tri, color)) in self.triangles.iter().zip(&self.colors).enumerate() {
            let mut points = [[0.0; 2]; 3];
            for (point, &v) in points.iter_mut().zip(tri) {
                let base = v as usize * cols;
                let (x, y) = (screen[base], screen[base + 1]);
                if projection.is_clipped(x, y) {
                    out.culled += 1;
                    continue 'faces;
                }
                *point = [x, y];
            }
            out.triangles.push(ScreenTriangle {
                id: TriangleId(t as u32),
                corners: tri.map(VertexId),
                points,
                color: *color,
            });
        }
        Ok(out)
    }

    /// [`project`](Self::project) followed by [`assemble`](Self::assemble).
    pub fn screen_projection(
        &mut self,
        frame: u64,
        camera: &FixedMatrix<4, 4>,
        projection: &Projection,
    ) -> FrustumResult<ScreenFrame> {
        self.project(camera, projection)?;
        self.assemble(frame, projection)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.rows()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// The object's current (transformed) vertices.
    #[inline]
    pub fn vertices(&self) -> &ProjectionBuffer {
        &self.vertices
    }

    /// Mutable access, e.g. to read vertices back on the host.
    #[inline]
    pub fn vertices_mut(&mut self) -> &mut ProjectionBuffer {
        &mut self.vertices
    }

    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    #[inline]
    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    #[inline]
    pub fn context(&self) -> &DeviceContext {
        self.vertices.matrix().context()
    }
}

impl std::fmt::Debug for Object3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object3D")
            .field("vertices", &self.vertices)
            .field("triangles", &self.triangles.len())
            .field("projected", &self.projected)
            .finish()
    }
}
