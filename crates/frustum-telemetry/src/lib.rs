//! # frustum-telemetry
//!
//! Event bus for renderer telemetry. Emits structured per-frame events
//! (stage timings, culling counts, buffer pool usage) that can be
//! consumed by pluggable sinks (tracing logs, in-memory capture).

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, FrameEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
