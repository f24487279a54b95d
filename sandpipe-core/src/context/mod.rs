//! Per-instance plugin context.
//!
//! Responsibilities:
//! - Carry what every bridge needs at construction time: the host instance
//!   handle and the fixed output dimensions established at plugin attach.
//! - Own the shared [`EventQueue`] and expose the push entry point the host
//!   calls from its delivery thread.
//!
//! Notes:
//! - There is exactly one plugin instance per process; this type makes that
//!   single instance explicit instead of stashing it in module-level state.
//!   If no context exists, no bridges can be built, which is the whole
//!   "is this driver available?" story.
//! - The output dimensions never change for the life of the process; the
//!   composite image and host surface are sized from them once.

use std::sync::Arc;

use crate::host::HostInstance;
use crate::input::{EventQueue, RawEvent};

/// Handle to the one plugin instance, created at attach time.
///
/// Cloneable-by-`Arc` and thread-safe: the embedder typically keeps one
/// `Arc<PluginContext>` for the application thread and one for the host-side
/// event glue.
pub struct PluginContext {
    host: Arc<dyn HostInstance>,
    width: u32,
    height: u32,
    events: Arc<EventQueue>,
}

impl PluginContext {
    /// Establish the context: the host handle plus the output dimensions
    /// that stay fixed for the lifetime of the process.
    pub fn new(host: Arc<dyn HostInstance>, width: u32, height: u32) -> Self {
        Self {
            host,
            width,
            height,
            events: Arc::new(EventQueue::new()),
        }
    }

    pub fn host(&self) -> &Arc<dyn HostInstance> {
        &self.host
    }

    /// The fixed output dimensions, as (width, height).
    pub fn output_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn events(&self) -> &Arc<EventQueue> {
        &self.events
    }

    /// Entry point for the host's delivery thread: enqueue one raw input
    /// occurrence for the application's next pump. Never blocks beyond the
    /// queue lock, never fails.
    pub fn push_event(&self, event: RawEvent) {
        self.events.push(event);
    }
}
