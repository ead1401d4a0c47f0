use crate::geom::Mat4;

use super::backend::{ConstantBlockId, IndexBufferId, VertexBufferId};
use super::descriptor::{MaterialId, TextureBinding, Topology};

/// Device-space scissor rectangle (physical pixels, clamped to the target).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a packet's geometry lives.
#[derive(Debug, Clone)]
pub enum PacketGeometry {
    /// Regions inside the per-frame buffer pool. The buffer handles are
    /// borrowed from the external allocator and become invalid once that
    /// frame's fence signals.
    Buffered {
        vertex_buffer: VertexBufferId,
        base_vertex: u32,
        index_buffer: IndexBufferId,
        base_index: u32,
    },
    /// Owned geometry for a batch too large for the accumulation buffer.
    /// The backend uploads it outside the frame pool (direct submit).
    Direct {
        vertices: Vec<u8>,
        indices: Vec<u16>,
    },
}

/// One GPU draw call, submitted to the external packet list.
///
/// Packets are emitted in exactly the order the batches that produced them
/// were pushed; the backend must not reorder them.
#[derive(Debug, Clone)]
pub struct Packet {
    pub geometry: PacketGeometry,
    pub vertex_count: u32,
    pub index_count: u32,
    pub primitive_count: u32,
    pub topology: Topology,
    /// Byte stride of the interleaved vertex records.
    pub vertex_stride: u32,
    pub scissor: ScissorRect,
    pub material: MaterialId,
    pub texture: Option<TextureBinding>,
    /// Per-draw world transform; `None` means identity.
    pub world: Option<Mat4>,
    /// Shader-constant block reference, written by
    /// [`MaterialBindings::bind_params`](super::backend::MaterialBindings::bind_params).
    pub constants: Option<ConstantBlockId>,
}
