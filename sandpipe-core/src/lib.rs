//! sandpipe-core: run a pull-model A/V library inside a push-model plugin host.
//!
//! The hosted library was written for a world where it owns the process:
//! - it polls input whenever it likes,
//! - it draws into its own buffer and presents whenever it likes,
//! - it hands the audio driver a callback and expects it invoked on time.
//!
//! A sandboxed plugin host inverts all three: input arrives as callbacks on a
//! host thread, presentation is an asynchronous flush with a completion
//! callback, and audio blocks are pulled on a host-owned thread. The bridges
//! in this crate sit between the two worlds:
//! - [`input`] queues host events for later synchronous pumping,
//! - [`av::DisplayBridge`] keeps a self-re-arming flush loop fed from a
//!   shared composite buffer,
//! - [`av::AudioBridge`] serves host block pulls from the library's sample
//!   producer, or silence when none is attached.
//!
//! The embedder implements [`host::HostInstance`] over the real plugin API
//! and wraps it in a [`PluginContext`]; the hosted library's driver layer
//! reaches the bridges through the traits in [`driver`].

pub mod av;
pub mod context;
pub mod driver;
pub mod host;
pub mod input;

pub use crate::av::{AudioBridge, DisplayBridge, VideoError};
pub use crate::context::PluginContext;
