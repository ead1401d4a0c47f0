//! Ziggurat batching core.
//!
//! Turns a stream of independent 2D drawing requests (sprites, filled shapes,
//! glyph quads, textured meshes) into the minimum number of GPU draw packets
//! while preserving exact paint order, clip state and per-draw transform.
//!
//! The crate owns the flush/pack decisions only. Pipelines, descriptor sets,
//! texture atlases and window management belong to the surrounding renderer,
//! which plugs in through the traits in [`batch::backend`].

pub mod batch;
pub mod color;
pub mod geom;
pub mod gpu;
pub mod logging;
