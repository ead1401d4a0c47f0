use bytemuck::Pod;
use smallvec::SmallVec;

use crate::color::Color;
use crate::geom::Mat4;

/// Opaque material identifier, owned by the external material system.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// Opaque texture-set identifier (e.g. an atlas page).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureSetId(pub u32);

/// Opaque sampler-state identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SamplerId(pub u32);

/// Texture binding for a draw.
///
/// A texture is never bound without a sampler (or vice versa); holding both
/// in one value makes the mismatched state unrepresentable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureBinding {
    pub texture_set: TextureSetId,
    pub sampler: SamplerId,
}

/// Primitive topology of a draw request.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Topology {
    #[default]
    TriangleList,
    LineList,
    TriangleStrip,
}

impl Topology {
    /// Number of primitives described by `index_count` indices.
    #[inline]
    pub fn primitive_count(self, index_count: u32) -> u32 {
        match self {
            Topology::TriangleList => index_count / 3,
            Topology::LineList => index_count / 2,
            Topology::TriangleStrip => index_count.saturating_sub(2),
        }
    }
}

/// Borrowed view over a strided vertex attribute stream.
///
/// Equivalent of a `(pointer, stride, count)` triple: `bytes` is the caller's
/// storage, `stride` the distance between consecutive elements. The batcher
/// copies out of the view synchronously during `push`; nothing is retained.
#[derive(Debug, Copy, Clone)]
pub struct AttrSlice<'a> {
    bytes: &'a [u8],
    stride: usize,
    count: usize,
}

impl<'a> AttrSlice<'a> {
    /// View over raw bytes with an explicit stride.
    ///
    /// `stride` may be zero only when `count` is zero.
    #[inline]
    pub fn from_bytes(bytes: &'a [u8], stride: usize, count: usize) -> Self {
        debug_assert!(count == 0 || stride > 0, "zero stride with nonzero count");
        Self { bytes, stride, count }
    }

    /// View over a tightly packed slice of `Pod` elements.
    #[inline]
    pub fn from_slice<T: Pod>(items: &'a [T]) -> Self {
        Self {
            bytes: bytemuck::cast_slice(items),
            stride: size_of::<T>(),
            count: items.len(),
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Reads element `i` as `T`, honoring the stride.
    ///
    /// The read is unaligned-safe; strided source data has no alignment
    /// guarantee.
    #[inline]
    pub fn get<T: Pod>(&self, i: usize) -> T {
        debug_assert!(i < self.count);
        let off = i * self.stride;
        bytemuck::pod_read_unaligned(&self.bytes[off..off + size_of::<T>()])
    }
}

/// Color source for a draw: one uniform color broadcast to every vertex, or
/// a per-vertex `[f32; 4]` stream.
#[derive(Debug, Copy, Clone)]
pub enum ColorSource<'a> {
    Uniform(Color),
    PerVertex(AttrSlice<'a>),
}

impl ColorSource<'_> {
    #[inline]
    pub fn resolve(&self, i: usize) -> [f32; 4] {
        match self {
            ColorSource::Uniform(c) => c.to_array(),
            ColorSource::PerVertex(s) => s.get::<[f32; 4]>(i),
        }
    }
}

/// One drawing request: borrowed geometry plus the render state it needs.
///
/// Value type; not retained beyond the `push` call that consumes it.
/// Positions are 2D (`[f32; 2]`), uv streams are `[f32; 2]`, indices are
/// local to `[0, vertex_count)`.
#[derive(Debug, Clone)]
pub struct BatchDescriptor<'a> {
    pub positions: AttrSlice<'a>,
    /// 0..N texture-coordinate streams. An empty list draws untextured; the
    /// packed record then carries a constant `(0, 0)` primary uv so the
    /// vertex layout stays uniform.
    pub uv_streams: SmallVec<[AttrSlice<'a>; 2]>,
    pub color: ColorSource<'a>,
    pub indices: &'a [u16],
    pub material: MaterialId,
    pub texture: Option<TextureBinding>,
    /// Per-draw world transform. `None` means identity.
    pub world: Option<&'a Mat4>,
    pub topology: Topology,
}

impl<'a> BatchDescriptor<'a> {
    pub fn new(positions: AttrSlice<'a>, indices: &'a [u16], material: MaterialId) -> Self {
        Self {
            positions,
            uv_streams: SmallVec::new(),
            color: ColorSource::Uniform(Color::WHITE),
            indices,
            material,
            texture: None,
            world: None,
            topology: Topology::TriangleList,
        }
    }

    pub fn with_uv_stream(mut self, uvs: AttrSlice<'a>) -> Self {
        self.uv_streams.push(uvs);
        self
    }

    pub fn with_color(mut self, color: ColorSource<'a>) -> Self {
        self.color = color;
        self
    }

    pub fn with_uniform_color(mut self, color: Color) -> Self {
        self.color = ColorSource::Uniform(color);
        self
    }

    pub fn with_texture(mut self, texture: TextureBinding) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_world(mut self, world: &'a Mat4) -> Self {
        self.world = Some(world);
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.positions.count() as u32
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Debug-only contract checks for producer input.
    ///
    /// Violations are programmer errors in the producer, not runtime
    /// conditions; release builds skip the checks entirely.
    pub fn validate(&self) {
        let vcount = self.positions.count();
        for (i, uvs) in self.uv_streams.iter().enumerate() {
            debug_assert!(
                uvs.count() >= vcount,
                "uv stream {i} has {} elements for {vcount} vertices",
                uvs.count(),
            );
        }
        if let ColorSource::PerVertex(colors) = &self.color {
            debug_assert!(
                colors.count() >= vcount,
                "per-vertex color stream has {} elements for {vcount} vertices",
                colors.count(),
            );
        }
        debug_assert!(
            self.topology != Topology::TriangleStrip || self.indices.len() >= 3,
            "triangle strip needs at least 3 indices"
        );
    }
}
