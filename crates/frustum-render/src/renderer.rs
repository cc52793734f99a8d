//! Renderer trait and HeadlessRenderer stub.
//!
//! The renderer is called once per frame with the assembled screen
//! triangles. The headless renderer only counts, serving as a no-op for
//! benchmarks, CI and the `render` command without an output file.

use frustum_mesh::Mesh;
use frustum_types::FrustumResult;

use crate::object::ScreenFrame;

/// Trait for presenting projected frames.
///
/// # Implementations
/// - [`HeadlessRenderer`]: Counts frames and triangles
/// - [`JsonFrameExporter`](crate::JsonFrameExporter): Writes every frame to a JSON file
pub trait Renderer: Send {
    /// Initialize the renderer with the mesh being drawn.
    fn init(&mut self, mesh: &Mesh) -> FrustumResult<()>;

    /// Submit a frame for presentation.
    fn submit_frame(&mut self, frame: &ScreenFrame) -> FrustumResult<()>;

    /// Finalize rendering (flush buffers, close files, etc.).
    fn finalize(&mut self) -> FrustumResult<()>;

    /// Returns the renderer name.
    fn name(&self) -> &str;

    /// Returns the number of frames submitted.
    fn frame_count(&self) -> u32;
}

/// Headless renderer: discards frames after counting them.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u32,
    triangles_drawn: u64,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triangles submitted over all frames.
    pub fn triangles_drawn(&self) -> u64 {
        self.triangles_drawn
    }
}

impl Renderer for HeadlessRenderer {
    fn init(&mut self, _mesh: &Mesh) -> FrustumResult<()> {
        Ok(())
    }

    fn submit_frame(&mut self, frame: &ScreenFrame) -> FrustumResult<()> {
        self.frames += 1;
        self.triangles_drawn += frame.drawn() as u64;
        Ok(())
    }

    fn finalize(&mut self) -> FrustumResult<()> {
        tracing::debug!(frames = self.frames, triangles = self.triangles_drawn, "headless renderer finished");
        Ok(())
    }

    fn name(&self) -> &str {
        "headless"
    }

    fn frame_count(&self) -> u32 {
        self.frames
    }
}
