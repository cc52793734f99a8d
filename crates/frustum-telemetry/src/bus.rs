//! Per-frame telemetry queue.
//!
//! The frame loop `emit`s while a frame runs and calls `flush` once the
//! frame is done, so sinks see a whole frame at a time. Queued events are
//! delivered in emission order, each one to every sink.

use std::sync::mpsc;

use crate::events::FrameEvent;
use crate::sinks::EventSink;

/// Queues frame events and fans them out to sinks on `flush`.
pub struct EventBus {
    queue_tx: mpsc::Sender<FrameEvent>,
    queue_rx: mpsc::Receiver<FrameEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    enabled: bool,
}

impl EventBus {
    /// An enabled bus with no sinks.
    pub fn new() -> Self {
        let (queue_tx, queue_rx) = mpsc::channel();
        Self {
            queue_tx,
            queue_rx,
            sinks: Vec::new(),
            enabled: true,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// While disabled, `emit` discards events. Already queued events are
    /// still delivered by the next `flush`.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues `event` for the next `flush`.
    pub fn emit(&self, event: FrameEvent) {
        if self.enabled {
            // Both ends live in `self`; send only fails after a drop.
            let _ = self.queue_tx.send(event);
        }
    }

    /// Delivers every queued event.
    pub fn flush(&mut self) {
        let sinks = &mut self.sinks;
        for event in self.queue_rx.try_iter() {
            sinks.iter_mut().for_each(|sink| sink.handle(&event));
        }
    }

    /// Delivers what is queued, then finalizes every sink.
    pub fn finalize(&mut self) {
        self.flush();
        self.sinks.iter_mut().for_each(|sink| sink.finalize());
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
