//! Renderer event types.
//!
//! Structured events emitted by the frame loop. Events are lightweight
//! value types that carry just enough data to be useful for monitoring
//! and debugging.

use serde::{Deserialize, Serialize};

/// A renderer event, tagged with the frame it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEvent {
    /// Frame number (0-indexed).
    pub frame: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Frame started.
    FrameBegin,

    /// One pipeline stage completed.
    StageTiming {
        /// Stage name: `camera`, `project`, `assemble` or `submit`.
        stage: String,
        /// Wall-clock duration in microseconds.
        micros: u64,
    },

    /// Frame completed.
    FrameEnd {
        /// Wall-clock time for the entire frame (seconds).
        wall_time: f64,
        /// Triangles handed to the renderer.
        triangles_drawn: u32,
        /// Triangles dropped because a vertex was clipped.
        triangles_culled: u32,
    },

    /// Buffer pool counters at the end of a frame.
    PoolStats {
        allocations: u64,
        reuses: u64,
        free_buffers: usize,
        in_use: usize,
    },

    /// A mesh was uploaded into an object.
    ObjectLoaded { vertices: u32, triangles: u32 },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl FrameEvent {
    /// Creates a new event for the given frame.
    pub fn new(frame: u64, kind: EventKind) -> Self {
        Self { frame, kind }
    }
}
