//! wgpu-backed transport.
//!
//! The batching core only knows the [`FrameBufferAllocator`] contract; this
//! module provides the concrete per-frame buffer pool a wgpu renderer plugs
//! in.
//!
//! [`FrameBufferAllocator`]: crate::batch::backend::FrameBufferAllocator

mod arena;

pub use arena::{FrameArena, FrameArenaConfig};
