//! Draw-batching core.
//!
//! Responsibilities:
//! - decide, per incoming [`BatchDescriptor`], whether it can join the
//!   pending accumulation or a flush must happen first
//! - pack heterogeneous vertex sources into one interleaved buffer and remap
//!   indices into the shared vertex space
//! - materialize the accumulation + pending render state into [`Packet`]s,
//!   in strict submission order (painter's algorithm)
//!
//! Producers drive this through [`BatchContext::begin_frame`] and the
//! returned [`BatchFrame`] guard; the GPU side plugs in via the traits in
//! [`backend`].

mod accum;
mod clip;
mod context;
mod descriptor;
mod packet;
mod state;

pub mod backend;

pub use accum::AccumulationBuffer;
pub use clip::ClipStack;
pub use context::{BatchContext, BatchFrame, FrameTarget};
pub use descriptor::{
    AttrSlice, BatchDescriptor, ColorSource, MaterialId, SamplerId, TextureBinding, TextureSetId,
    Topology,
};
pub use packet::{Packet, PacketGeometry, ScissorRect};
pub use state::{PendingState, VertexLayout, WorldTransform};

/// Hard capacity of the accumulation buffer, in vertices.
///
/// Indices are 16-bit and remapped by adding the running vertex count, so the
/// limit must keep every remapped index below `u16::MAX + 1`.
pub const MAX_VERTICES: u32 = 16_384;

/// Hard capacity of the accumulation buffer, in indices.
pub const MAX_INDICES: u32 = 49_152;
