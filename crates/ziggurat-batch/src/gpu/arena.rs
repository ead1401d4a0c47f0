use crate::batch::backend::{
    FrameBufferAllocator, IndexBufferId, IndexRegion, VertexBufferId, VertexRegion,
};

/// Arena configuration.
#[derive(Debug, Clone)]
pub struct FrameArenaConfig {
    /// Number of frame slots rotated through. Two covers FIFO presentation;
    /// raise it to match a higher surface frame-latency setting.
    pub frames_in_flight: usize,
    /// Minimum byte size of a freshly created buffer chunk.
    pub min_chunk_bytes: u64,
}

impl Default for FrameArenaConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            min_chunk_bytes: 256 * 1024,
        }
    }
}

/// One pooled GPU buffer plus a bump cursor.
struct Chunk {
    id: u32,
    buffer: wgpu::Buffer,
    capacity: u64,
    used: u64,
}

/// Buffers for one frame slot. Chunks persist across frames and are only
/// rewound, so steady-state frames allocate no new GPU memory.
#[derive(Default)]
struct Slot {
    vertex_chunks: Vec<Chunk>,
    index_chunks: Vec<Chunk>,
}

/// Per-frame transport buffer pool over wgpu.
///
/// Regions are bump-allocated out of growable vertex/index buffer chunks and
/// uploaded with `queue.write_buffer`. Slots rotate on
/// [`begin_frame`](Self::begin_frame); the caller's present pacing (at most
/// `frames_in_flight` frames queued) guarantees the GPU is done with a slot
/// before it is rewound, so no explicit fences are needed here.
pub struct FrameArena {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: FrameArenaConfig,
    slots: Vec<Slot>,
    current: usize,
    next_buffer_id: u32,
}

impl FrameArena {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, config: FrameArenaConfig) -> Self {
        let frames = config.frames_in_flight.max(1);
        let mut slots = Vec::with_capacity(frames);
        slots.resize_with(frames, Slot::default);
        Self {
            device,
            queue,
            config,
            slots,
            current: 0,
            next_buffer_id: 0,
        }
    }

    /// Advances to the next frame slot and rewinds its chunks for reuse.
    pub fn begin_frame(&mut self) {
        self.current = (self.current + 1) % self.slots.len();
        let slot = &mut self.slots[self.current];
        for chunk in slot.vertex_chunks.iter_mut().chain(slot.index_chunks.iter_mut()) {
            chunk.used = 0;
        }
    }

    /// Resolves a granted vertex-buffer handle for draw-call recording.
    pub fn vertex_buffer(&self, id: VertexBufferId) -> Option<&wgpu::Buffer> {
        self.slots
            .iter()
            .flat_map(|s| s.vertex_chunks.iter())
            .find(|c| c.id == id.0)
            .map(|c| &c.buffer)
    }

    /// Resolves a granted index-buffer handle for draw-call recording.
    pub fn index_buffer(&self, id: IndexBufferId) -> Option<&wgpu::Buffer> {
        self.slots
            .iter()
            .flat_map(|s| s.index_chunks.iter())
            .find(|c| c.id == id.0)
            .map(|c| &c.buffer)
    }

    fn create_chunk(&mut self, byte_size: u64, usage: wgpu::BufferUsages, label: &str) -> Chunk {
        let capacity = byte_size
            .next_power_of_two()
            .max(self.config.min_chunk_bytes);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let id = self.next_buffer_id;
        self.next_buffer_id += 1;
        Chunk {
            id,
            buffer,
            capacity,
            used: 0,
        }
    }

    /// Bump-allocates `size` bytes at `align` from the slot's chunk list,
    /// appending a new chunk when none has room. Returns chunk index and
    /// start offset. Never reallocates an existing chunk: regions granted
    /// earlier in the frame must stay valid.
    fn bump(
        &mut self,
        vertex: bool,
        size: u64,
        align: u64,
    ) -> (usize, u64) {
        let slot = &mut self.slots[self.current];
        let chunks = if vertex {
            &mut slot.vertex_chunks
        } else {
            &mut slot.index_chunks
        };

        for (i, chunk) in chunks.iter_mut().enumerate() {
            let offset = align_up(chunk.used, align);
            if offset + size <= chunk.capacity {
                chunk.used = offset + size;
                return (i, offset);
            }
        }

        let (usage, label) = if vertex {
            (wgpu::BufferUsages::VERTEX, "ziggurat frame vertex chunk")
        } else {
            (wgpu::BufferUsages::INDEX, "ziggurat frame index chunk")
        };
        let mut chunk = self.create_chunk(size, usage, label);
        chunk.used = size;

        let slot = &mut self.slots[self.current];
        let chunks = if vertex {
            &mut slot.vertex_chunks
        } else {
            &mut slot.index_chunks
        };
        chunks.push(chunk);
        (chunks.len() - 1, 0)
    }
}

impl FrameBufferAllocator for FrameArena {
    fn alloc_vertex_region(&mut self, bytes: &[u8], stride: u32) -> Option<VertexRegion> {
        if bytes.is_empty() {
            return None;
        }
        // Stride-aligned so the region start maps to a whole base vertex;
        // strides are multiples of 4, satisfying COPY_BUFFER_ALIGNMENT too.
        let (chunk_idx, offset) = self.bump(true, bytes.len() as u64, stride as u64);
        let chunk = &self.slots[self.current].vertex_chunks[chunk_idx];
        self.queue.write_buffer(&chunk.buffer, offset, bytes);
        Some(VertexRegion {
            buffer: VertexBufferId(chunk.id),
            byte_offset: offset as u32,
        })
    }

    fn alloc_index_region(&mut self, indices: &[u16]) -> Option<IndexRegion> {
        if indices.is_empty() {
            return None;
        }
        // write_buffer sizes must be 4-byte multiples; pad odd index counts
        // with one dead index that no draw references.
        let padded_len = indices.len().next_multiple_of(2);
        let size = (padded_len * 2) as u64;
        let (chunk_idx, offset) = self.bump(false, size, 4);
        let chunk = &self.slots[self.current].index_chunks[chunk_idx];

        if padded_len == indices.len() {
            self.queue
                .write_buffer(&chunk.buffer, offset, bytemuck::cast_slice(indices));
        } else {
            let mut padded = Vec::with_capacity(padded_len);
            padded.extend_from_slice(indices);
            padded.push(0u16);
            self.queue
                .write_buffer(&chunk.buffer, offset, bytemuck::cast_slice(&padded));
        }

        Some(IndexRegion {
            buffer: IndexBufferId(chunk.id),
            first_index: (offset / 2) as u32,
        })
    }
}

#[inline]
fn align_up(v: u64, align: u64) -> u64 {
    debug_assert!(align > 0);
    v.div_ceil(align) * align
}
