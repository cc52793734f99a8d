//! Headless frame loop.
//!
//! One [`FrameLoop::step`] is one frame: apply camera input, build the
//! camera matrix, project the object, assemble screen triangles, hand them
//! to the renderer, spin the object, and report telemetry.

use std::time::Instant;

use frustum_gpu::DeviceContext;
use frustum_mesh::Mesh;
use frustum_telemetry::{EventBus, EventKind, EventSink, FrameEvent};
use frustum_types::FrustumResult;

use crate::camera::{Camera, CameraMotion};
use crate::config::RendererConfig;
use crate::object::{Object3D, ScreenFrame};
use crate::projection::Projection;
use crate::renderer::Renderer;

/// Owns everything needed to produce frames.
pub struct FrameLoop {
    ctx: DeviceContext,
    config: RendererConfig,
    camera: Camera,
    projection: Projection,
    object: Object3D,
    renderer: Box<dyn Renderer>,
    bus: EventBus,
    frame: u64,
}

impl FrameLoop {
    /// Uploads `mesh` and prepares camera, projection and renderer.
    pub fn new(
        ctx: &DeviceContext,
        config: RendererConfig,
        mesh: &Mesh,
        mut renderer: Box<dyn Renderer>,
    ) -> FrustumResult<Self> {
        config.validate()?;
        let camera = Camera::new(ctx, &config)?;
        let projection = Projection::new(ctx, &config)?;
        let object = Object3D::from_mesh(ctx, mesh)?;
        renderer.init(mesh)?;

        let bus = EventBus::new();
        bus.emit(FrameEvent::new(
            0,
            EventKind::ObjectLoaded {
                vertices: object.vertex_count() as u32,
                triangles: object.triangle_count() as u32,
            },
        ));
        tracing::info!(
            renderer = renderer.name(),
            backend = %ctx.backend_name(),
            width = config.width,
            height = config.height,
            "frame loop ready"
        );

        Ok(Self {
            ctx: ctx.clone(),
            config,
            camera,
            projection,
            object,
            renderer,
            bus,
            frame: 0,
        })
    }

    /// Registers a telemetry sink.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.bus.add_sink(sink);
    }

    /// Produces one frame after applying `motions` in order.
    pub fn step(&mut self, motions: &[CameraMotion]) -> FrustumResult<ScreenFrame> {
        let frame = self.frame;
        let started = Instant::now();
        self.bus.emit(FrameEvent::new(frame, EventKind::FrameBegin));

        let t = Instant::now();
        for &motion in motions {
            self.camera.apply(motion)?;
        }
        let camera_matrix = self.camera.camera_matrix()?;
        self.stage(frame, "camera", t);

        let t = Instant::now();
        self.object.project(&camera_matrix, &self.projection)?;
        self.stage(frame, "project", t);

        let t = Instant::now();
        let screen = self.object.assemble(frame, &self.projection)?;
        self.stage(frame, "assemble", t);

        let t = Instant::now();
        self.renderer.submit_frame(&screen)?;
        self.stage(frame, "submit", t);

        if self.config.spin_speed != 0.0 {
            self.object.rotate_y(self.config.spin_speed)?;
        }

        let pool = self.ctx.pool_stats();
        self.bus.emit(FrameEvent::new(
            frame,
            EventKind::PoolStats {
                allocations: pool.allocations,
                reuses: pool.reuses,
                free_buffers: pool.free_buffers,
                in_use: pool.in_use,
            },
        ));
        self.bus.emit(FrameEvent::new(
            frame,
            EventKind::FrameEnd {
                wall_time: started.elapsed().as_secs_f64(),
                triangles_drawn: screen.drawn() as u32,
                triangles_culled: screen.culled,
            },
        ));
        self.bus.flush();

        self.frame += 1;
        Ok(screen)
    }

    /// Renders `frames` frames without camera input.
    pub fn run(&mut self, frames: u64) -> FrustumResult<()> {
        for _ in 0..frames {
            self.step(&[])?;
        }
        Ok(())
    }

    /// Finalizes the renderer and the telemetry sinks.
    pub fn finish(&mut self) -> FrustumResult<()> {
        self.renderer.finalize()?;
        self.bus.finalize();
        tracing::info!(frames = self.frame, "frame loop finished");
        Ok(())
    }

    /// Frames produced so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    #[inline]
    pub fn object_mut(&mut self) -> &mut Object3D {
        &mut self.object
    }

    #[inline]
    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    #[inline]
    pub fn context(&self) -> &DeviceContext {
        &self.ctx
    }

    fn stage(&self, frame: u64, stage: &str, started: Instant) {
        let micros = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.bus.emit(FrameEvent::new(
            frame,
            EventKind::StageTiming {
                stage: stage.to_string(),
                micros,
            },
        ));
    }
}
