//! External collaborator contracts.
//!
//! The batcher never talks to the GPU directly; it requests transport regions
//! from a [`FrameBufferAllocator`], binds materials through
//! [`MaterialBindings`] and appends finished packets to a [`PacketList`].
//! The renderer that owns the frame supplies all three via [`FrameBackend`].

use super::descriptor::MaterialId;
use super::packet::Packet;

/// Handle to a GPU vertex buffer owned by the external pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferId(pub u32);

/// Handle to a GPU index buffer owned by the external pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IndexBufferId(pub u32);

/// Handle to a shader-constant block written during material binding.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ConstantBlockId(pub u32);

/// A vertex-buffer region granted for one flush.
#[derive(Debug, Copy, Clone)]
pub struct VertexRegion {
    pub buffer: VertexBufferId,
    /// Byte offset of the region start within `buffer`.
    pub byte_offset: u32,
}

/// An index-buffer region granted for one flush.
#[derive(Debug, Copy, Clone)]
pub struct IndexRegion {
    pub buffer: IndexBufferId,
    /// Offset of the region start within `buffer`, in indices.
    pub first_index: u32,
}

/// Per-frame transport buffer pool.
///
/// The allocator copies the provided data into fresh regions of its pooled
/// buffers (write-once; the batcher never reads back or re-mutates a granted
/// region) and is responsible for fence-gated reuse across frames in flight.
/// Returning `None` means the pool is exhausted; the batcher drops the draw
/// with a warning rather than failing the frame.
pub trait FrameBufferAllocator {
    /// Grants a region for `bytes` of interleaved vertex data. The returned
    /// byte offset must be a multiple of `stride` so the batcher can derive
    /// a base vertex from it.
    fn alloc_vertex_region(&mut self, bytes: &[u8], stride: u32) -> Option<VertexRegion>;
    fn alloc_index_region(&mut self, indices: &[u16]) -> Option<IndexRegion>;
}

/// Append-only sink for finished packets. Submission order is paint order.
///
/// Recording is bracketed per frame: `begin` is called once when the frame
/// opens (allocate/open the render pass, start the packet list) and `end`
/// once after the terminal flush. Backends with no pass bookkeeping keep the
/// default no-op hooks.
pub trait PacketList {
    fn begin(&mut self) {}
    fn add(&mut self, packet: Packet);
    fn end(&mut self) {}
}

/// Material system hook.
pub trait MaterialBindings {
    /// Writes the shader-constant references for `material` into `packet`.
    /// Called exactly once per flush.
    fn bind_params(&mut self, material: MaterialId, packet: &mut Packet);
}

/// The three collaborators a frame needs, borrowed for the frame's duration.
pub struct FrameBackend<'a> {
    pub alloc: &'a mut dyn FrameBufferAllocator,
    pub packets: &'a mut dyn PacketList,
    pub materials: &'a mut dyn MaterialBindings,
}
