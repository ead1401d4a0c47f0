use anyhow::{Result, ensure};

use crate::geom::{Mat4, Rect};

use super::accum::{self, AccumulationBuffer};
use super::backend::FrameBackend;
use super::clip::ClipStack;
use super::descriptor::{BatchDescriptor, Topology};
use super::packet::{Packet, PacketGeometry, ScissorRect};
use super::state::{PendingState, VertexLayout};

/// Render target the frame draws into.
///
/// `bounds` is in logical pixels; `scale` is the virtual-to-physical pixel
/// ratio used for scissor conversion and the projection matrix.
#[derive(Debug, Copy, Clone)]
pub struct FrameTarget {
    pub bounds: Rect,
    pub scale: f32,
}

impl FrameTarget {
    #[inline]
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, width, height),
            scale,
        }
    }
}

/// The batching engine's persistent state.
///
/// One context is constructed at renderer init and passed explicitly to every
/// producer; there is no ambient global. Across frames the context keeps only
/// allocation capacity — all batching state is reset by
/// [`begin_frame`](Self::begin_frame).
#[derive(Debug, Default)]
pub struct BatchContext {
    accum: AccumulationBuffer,
    clip: ClipStack,
    pending: PendingState,
    projection: Mat4,
    target: FrameTarget,
    /// Once-per-frame warning latches.
    warned_capacity: bool,
    warned_alloc: bool,
}

impl Default for FrameTarget {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

impl BatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Projection matrix rebuilt by the last [`begin_frame`](Self::begin_frame):
    /// logical pixels through the virtual-to-physical scale into NDC.
    #[inline]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Starts a frame, returning the guard all batching goes through.
    ///
    /// Resets the clip stack, rebuilds the projection from the target size
    /// and scale, and clears the per-frame warning latches. Batching outside
    /// a frame is unrepresentable: every operation lives on the returned
    /// [`BatchFrame`].
    pub fn begin_frame<'a>(
        &'a mut self,
        target: FrameTarget,
        backend: FrameBackend<'a>,
    ) -> Result<BatchFrame<'a>> {
        ensure!(
            target.bounds.is_finite() && !target.bounds.is_empty(),
            "render target has degenerate bounds {:?}",
            target.bounds
        );
        ensure!(
            target.scale.is_finite() && target.scale > 0.0,
            "render target scale must be positive, got {}",
            target.scale
        );

        let phys_w = target.bounds.size.x * target.scale;
        let phys_h = target.bounds.size.y * target.scale;
        self.projection = Mat4::ortho_2d(phys_w, phys_h).mul(&Mat4::scale_2d(target.scale));

        self.target = target;
        self.clip.reset();
        self.pending = PendingState::default();
        self.accum.reset(VertexLayout::default());
        self.warned_capacity = false;
        self.warned_alloc = false;

        backend.packets.begin();

        Ok(BatchFrame { ctx: self, backend })
    }
}

/// One frame's batching scope.
///
/// Producers push batches and manipulate the clip stack through this guard;
/// [`finish`](Self::finish) drains any pending accumulation. Packets reach
/// the backend in exactly the order batches were pushed.
pub struct BatchFrame<'a> {
    ctx: &'a mut BatchContext,
    backend: FrameBackend<'a>,
}

impl BatchFrame<'_> {
    // ── batching ──────────────────────────────────────────────────────────

    /// Submits one drawing request.
    ///
    /// Compatible requests accumulate into the pending packet; a render
    /// state change or capacity overflow flushes first. A request too large
    /// for the accumulation buffer is flushed through the direct path on its
    /// own (with a once-per-frame warning).
    pub fn push(&mut self, desc: &BatchDescriptor) {
        desc.validate();

        // Degenerate, not an error: fully clipped-away or empty producers
        // are common.
        if desc.vertex_count() == 0 || desc.index_count() == 0 {
            return;
        }

        if AccumulationBuffer::exceeds_capacity(desc) {
            self.flush();
            self.submit_direct(desc);
            return;
        }

        let active_clip = self.ctx.clip.active();
        // Strips never merge: concatenated strip indices would draw a
        // phantom primitive across the seam, and a summed primitive count
        // would disagree with the combined index count.
        let strip_break =
            desc.topology == Topology::TriangleStrip && !self.ctx.accum.is_empty();
        if strip_break
            || self.ctx.accum.would_overflow(desc)
            || self.ctx.pending.is_state_change(desc, active_clip)
        {
            self.flush();
            let ctx = &mut *self.ctx;
            ctx.pending.adopt(desc, active_clip);
            ctx.accum.reset(ctx.pending.layout);
        }

        self.ctx.accum.append(desc);
    }

    /// Materializes the pending accumulation into one packet and resets it.
    ///
    /// No-op when nothing is accumulated, so calling it repeatedly is safe
    /// (and allocator-silent).
    pub fn flush(&mut self) {
        let ctx = &mut *self.ctx;
        if ctx.accum.is_empty() {
            return;
        }

        let layout = ctx.accum.layout();

        // Zero-area clip: nothing can be visible. Deliberate silent drop of
        // the whole accumulation, not an error.
        let Some(scissor) = compute_scissor(ctx.pending.clip, &ctx.target) else {
            ctx.accum.reset(layout);
            ctx.pending.material = None;
            return;
        };

        let stride = layout.stride();
        let vertex_region = self
            .backend
            .alloc
            .alloc_vertex_region(ctx.accum.vertex_bytes(), stride);
        let index_region = self.backend.alloc.alloc_index_region(ctx.accum.index_data());

        let (Some(vr), Some(ir)) = (vertex_region, index_region) else {
            if !ctx.warned_alloc {
                log::warn!(
                    "frame buffer pool exhausted; dropping {} accumulated vertices",
                    ctx.accum.vertex_count()
                );
                ctx.warned_alloc = true;
            }
            ctx.accum.reset(layout);
            ctx.pending.material = None;
            return;
        };

        debug_assert_eq!(vr.byte_offset % stride, 0);

        let material = ctx
            .pending
            .material
            .expect("non-empty accumulation always has an adopted material");

        let mut packet = Packet {
            geometry: PacketGeometry::Buffered {
                vertex_buffer: vr.buffer,
                base_vertex: vr.byte_offset / stride,
                index_buffer: ir.buffer,
                base_index: ir.first_index,
            },
            vertex_count: ctx.accum.vertex_count(),
            index_count: ctx.accum.index_count(),
            primitive_count: ctx.accum.primitive_count(),
            topology: ctx.pending.topology,
            vertex_stride: stride,
            scissor,
            material,
            texture: ctx.pending.texture,
            world: ctx.pending.world.matrix(),
            constants: None,
        };

        self.backend.materials.bind_params(material, &mut packet);

        if packet.primitive_count > 0 {
            self.backend.packets.add(packet);
        }

        // Reset accumulation; dropping the material reference forces a
        // rebind on the next divergent state.
        ctx.accum.reset(layout);
        ctx.pending.material = None;
    }

    /// Unbuffered fallback for a batch that cannot fit the accumulation
    /// buffer. The packet owns its geometry and bypasses the frame pool.
    fn submit_direct(&mut self, desc: &BatchDescriptor) {
        let ctx = &mut *self.ctx;

        if !ctx.warned_capacity {
            log::warn!(
                "batch exceeds accumulation capacity ({} vertices, {} indices); submitting directly",
                desc.vertex_count(),
                desc.index_count()
            );
            ctx.warned_capacity = true;
        }

        // The direct path still emits 16-bit indices.
        debug_assert!(desc.vertex_count() <= u16::MAX as u32 + 1);

        let Some(scissor) = compute_scissor(ctx.clip.active(), &ctx.target) else {
            return;
        };

        let layout = VertexLayout::for_descriptor(desc);
        let mut vertices = Vec::new();
        accum::pack_vertices(desc, layout, &mut vertices);
        let mut indices = Vec::new();
        accum::pack_indices(desc.indices, 0, desc.vertex_count(), &mut indices);

        let mut packet = Packet {
            geometry: PacketGeometry::Direct { vertices, indices },
            vertex_count: desc.vertex_count(),
            index_count: desc.index_count(),
            primitive_count: desc.topology.primitive_count(desc.index_count()),
            topology: desc.topology,
            vertex_stride: layout.stride(),
            scissor,
            material: desc.material,
            texture: desc.texture,
            world: desc.world.copied(),
            constants: None,
        };

        self.backend.materials.bind_params(desc.material, &mut packet);

        if packet.primitive_count > 0 {
            self.backend.packets.add(packet);
        }
    }

    // ── clip stack ────────────────────────────────────────────────────────

    /// Replaces the active clip. Takes effect on the next `push`; setting an
    /// equal clip causes no packet split.
    pub fn set_clip(&mut self, rect: Rect) {
        self.ctx.clip.set(rect);
    }

    /// Intersects `rect` with the active clip (or the target bounds when
    /// unclipped) and makes the result active.
    pub fn intersect_clip(&mut self, rect: Rect) {
        self.ctx.clip.intersect(rect, self.ctx.target.bounds);
    }

    /// Removes the active clip.
    pub fn remove_clip(&mut self) {
        self.ctx.clip.remove();
    }

    /// Saves the active clip for a nested scope.
    pub fn push_clip(&mut self) {
        self.ctx.clip.push();
    }

    /// Saves the active clip, then replaces it with `rect`.
    pub fn push_clip_rect(&mut self, rect: Rect) {
        self.ctx.clip.push();
        self.ctx.clip.set(rect);
    }

    /// Restores the clip saved by the matching push. An unbalanced pop
    /// restores "no clip".
    pub fn pop_clip(&mut self) {
        self.ctx.clip.pop();
    }

    #[inline]
    pub fn active_clip(&self) -> Option<Rect> {
        self.ctx.clip.active()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Ends the frame: drains any pending accumulation, then closes the
    /// backend's packet recording.
    pub fn finish(mut self) {
        self.flush();
        self.backend.packets.end();
    }
}

/// Builds the device-space scissor rect for the given clip.
///
/// The clip is intersected with the target bounds, converted to physical
/// pixels and clamped. `None` means nothing would be visible (zero-area
/// result) and the draw should be dropped. No clip yields the full target.
fn compute_scissor(clip: Option<Rect>, target: &FrameTarget) -> Option<ScissorRect> {
    let scale = target.scale;
    let bounds = target.bounds;
    let phys_w = (bounds.size.x * scale).max(1.0) as u32;
    let phys_h = (bounds.size.y * scale).max(1.0) as u32;

    let r = match clip {
        None => {
            return Some(ScissorRect {
                x: 0,
                y: 0,
                width: phys_w,
                height: phys_h,
            });
        }
        Some(r) => r.intersect(bounds)?,
    };

    let x0 = (((r.origin.x - bounds.origin.x) * scale).max(0.0) as u32).min(phys_w);
    let y0 = (((r.origin.y - bounds.origin.y) * scale).max(0.0) as u32).min(phys_h);
    let x1 = (((r.origin.x - bounds.origin.x + r.size.x) * scale).max(0.0) as u32).min(phys_w);
    let y1 = (((r.origin.y - bounds.origin.y + r.size.y) * scale).max(0.0) as u32).min(phys_h);

    let w = x1.saturating_sub(x0);
    let h = y1.saturating_sub(y0);

    if w == 0 || h == 0 {
        None
    } else {
        Some(ScissorRect {
            x: x0,
            y: y0,
            width: w,
            height: h,
        })
    }
}
