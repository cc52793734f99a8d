//! Pluggable event sinks.

use std::sync::{Arc, Mutex, PoisonError};

use crate::events::{EventKind, FrameEvent};

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &FrameEvent);

    /// Called when rendering ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events in memory.
///
/// Clones share the same storage, so a caller can keep one handle while
/// the bus owns another.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<FrameEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn events(&self) -> Vec<FrameEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &FrameEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
///
/// Stage timings go out at `debug`, everything else at `info`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &FrameEvent) {
        match &event.kind {
            EventKind::StageTiming { stage, micros } => {
                tracing::debug!(frame = event.frame, stage = %stage, micros, "stage_timing");
            }
            EventKind::FrameEnd {
                wall_time,
                triangles_drawn,
                triangles_culled,
            } => {
                tracing::info!(
                    frame = event.frame,
                    wall_time,
                    triangles_drawn,
                    triangles_culled,
                    "frame_end"
                );
            }
            kind => {
                tracing::info!(frame = event.frame, event = ?kind, "frame_event");
            }
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
