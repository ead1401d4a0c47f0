use super::descriptor::BatchDescriptor;
use super::state::VertexLayout;
use super::{MAX_INDICES, MAX_VERTICES};

/// CPU-side staging area for batches sharing compatible render state.
///
/// Grows monotonically via [`append`](Self::append) until a flush drains it.
/// Invariants (checked after every append):
/// - `vertex_count <= MAX_VERTICES`
/// - `index_count <= MAX_INDICES`
/// - `vertices.len() == vertex_count * layout.stride()`
#[derive(Debug, Default)]
pub struct AccumulationBuffer {
    vertices: Vec<u8>,
    indices: Vec<u16>,
    vertex_count: u32,
    index_count: u32,
    primitive_count: u32,
    layout: VertexLayout,
}

impl AccumulationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all staged data and switches to `layout`. Keeps allocated
    /// capacity for reuse across flushes.
    pub fn reset(&mut self, layout: VertexLayout) {
        self.vertices.clear();
        self.indices.clear();
        self.vertex_count = 0;
        self.index_count = 0;
        self.primitive_count = 0;
        self.layout = layout;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0 && self.index_count == 0
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[inline]
    pub fn primitive_count(&self) -> u32 {
        self.primitive_count
    }

    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    #[inline]
    pub fn vertex_bytes(&self) -> &[u8] {
        &self.vertices
    }

    #[inline]
    pub fn index_data(&self) -> &[u16] {
        &self.indices
    }

    /// True if appending `desc` would exceed a capacity limit or requires a
    /// different vertex layout (uv-stream count) than the active one.
    pub fn would_overflow(&self, desc: &BatchDescriptor) -> bool {
        self.vertex_count + desc.vertex_count() > MAX_VERTICES
            || self.index_count + desc.index_count() > MAX_INDICES
            || self.layout != VertexLayout::for_descriptor(desc)
    }

    /// True if `desc` is too large to ever share the accumulation buffer
    /// with another batch. Such batches take the direct-submit path; a batch
    /// that would fill the entire buffer on its own gains nothing from
    /// staging.
    pub fn exceeds_capacity(desc: &BatchDescriptor) -> bool {
        desc.vertex_count() >= MAX_VERTICES || desc.index_count() >= MAX_INDICES
    }

    /// Appends `desc`'s geometry, packing vertices into the interleaved
    /// layout and remapping indices into the shared vertex numbering.
    ///
    /// Callers must have established compatibility first (no overflow, no
    /// layout mismatch).
    pub fn append(&mut self, desc: &BatchDescriptor) {
        debug_assert!(!self.would_overflow(desc));

        pack_vertices(desc, self.layout, &mut self.vertices);
        pack_indices(desc.indices, self.vertex_count, desc.vertex_count(), &mut self.indices);

        self.vertex_count += desc.vertex_count();
        self.index_count += desc.index_count();
        self.primitive_count += desc.topology.primitive_count(desc.index_count());
    }
}

/// Packs `desc`'s vertices into `out` as interleaved records of `layout`.
///
/// Record fields, in order: position, primary uv (zeros when the draw is
/// untextured), color, then each uv stream beyond the first. Extra streams
/// beyond the layout's count would indicate a reconcile bug upstream.
pub(super) fn pack_vertices(desc: &BatchDescriptor, layout: VertexLayout, out: &mut Vec<u8>) {
    debug_assert_eq!(VertexLayout::for_descriptor(desc), layout);

    let vcount = desc.positions.count();
    out.reserve(layout.stride() as usize * vcount);

    let primary = desc.uv_streams.first();
    for i in 0..vcount {
        let pos: [f32; 2] = desc.positions.get(i);
        out.extend_from_slice(bytemuck::bytes_of(&pos));

        let uv: [f32; 2] = match primary {
            Some(s) => s.get(i),
            None => [0.0, 0.0],
        };
        out.extend_from_slice(bytemuck::bytes_of(&uv));

        out.extend_from_slice(bytemuck::bytes_of(&desc.color.resolve(i)));

        for stream in desc.uv_streams.iter().skip(1) {
            let uv: [f32; 2] = stream.get(i);
            out.extend_from_slice(bytemuck::bytes_of(&uv));
        }
    }
}

/// Copies `indices` into `out`, offset by `base`. Index values must be local
/// to `[0, vertex_count)`.
pub(super) fn pack_indices(indices: &[u16], base: u32, vertex_count: u32, out: &mut Vec<u16>) {
    debug_assert!(base + vertex_count <= u16::MAX as u32 + 1);
    out.reserve(indices.len());
    for &ix in indices {
        debug_assert!((ix as u32) < vertex_count, "index {ix} out of range");
        out.push(base as u16 + ix);
    }
}
