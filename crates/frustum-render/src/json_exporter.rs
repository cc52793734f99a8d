//! JSON frame exporter. Writes every projected frame for inspection.
//!
//! Implements the `Renderer` trait. Captures the screen triangles of each
//! frame, then serializes the whole run to a JSON file on `finalize()`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use frustum_mesh::Mesh;
use frustum_types::{FrustumError, FrustumResult};

use crate::object::ScreenFrame;
use crate::renderer::Renderer;

/// Complete run data as written to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportData {
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub frames: Vec<ScreenFrame>,
}

/// Exports frames to a JSON file.
///
/// Usage:
/// ```text
/// let mut exporter = JsonFrameExporter::new("frames.json");
/// exporter.init(&mesh)?;
/// // ... call submit_frame() each frame ...
/// exporter.finalize()?; // Writes the JSON file
/// ```
#[derive(Debug)]
pub struct JsonFrameExporter {
    output_path: PathBuf,
    data: ExportData,
}

impl JsonFrameExporter {
    /// Creates a new exporter that will write to the given path.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            data: ExportData::default(),
        }
    }
}

impl Renderer for JsonFrameExporter {
    fn init(&mut self, mesh: &Mesh) -> FrustumResult<()> {
        self.data.vertex_count = mesh.vertex_count();
        self.data.triangle_count = mesh.triangle_count();
        Ok(())
    }

    fn submit_frame(&mut self, frame: &ScreenFrame) -> FrustumResult<()> {
        self.data.frames.push(frame.clone());
        Ok(())
    }

    fn finalize(&mut self) -> FrustumResult<()> {
        let json = serde_json::to_string(&self.data)
            .map_err(|e| FrustumError::Serialization(format!("JSON serialization failed: {e}")))?;
        std::fs::write(&self.output_path, json)?;
        tracing::info!(
            path = %self.output_path.display(),
            frames = self.data.frames.len(),
            "frames exported"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "json_exporter"
    }

    fn frame_count(&self) -> u32 {
        self.data.frames.len() as u32
    }
}
