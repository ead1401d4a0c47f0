use crate::geom::{Mat4, Rect};

use super::descriptor::{BatchDescriptor, MaterialId, TextureBinding, Topology};

/// Per-draw world transform as tracked by the pending snapshot.
///
/// The identity case is kept symbolic so two "no custom matrix" draws are
/// always compatible without comparing matrix values. Custom matrices are
/// compatible only when bit-for-bit equal (see [`Mat4::bitwise_eq`]);
/// switching between identity and custom always forces a flush.
#[derive(Debug, Copy, Clone, Default)]
pub enum WorldTransform {
    #[default]
    Identity,
    Custom(Mat4),
}

impl WorldTransform {
    #[inline]
    pub fn from_descriptor(world: Option<&Mat4>) -> Self {
        match world {
            None => WorldTransform::Identity,
            Some(m) => WorldTransform::Custom(*m),
        }
    }

    #[inline]
    pub fn compatible_with(&self, other: &WorldTransform) -> bool {
        match (self, other) {
            (WorldTransform::Identity, WorldTransform::Identity) => true,
            (WorldTransform::Custom(a), WorldTransform::Custom(b)) => a.bitwise_eq(b),
            _ => false,
        }
    }

    #[inline]
    pub fn matrix(&self) -> Option<Mat4> {
        match self {
            WorldTransform::Identity => None,
            WorldTransform::Custom(m) => Some(*m),
        }
    }
}

/// Interleaved vertex record format, determined by the uv-stream count.
///
/// Record: position `[f32; 2]`, primary uv `[f32; 2]`, color `[f32; 4]`,
/// then one `[f32; 2]` per stream beyond the first. Untextured draws share
/// the single-stream layout (the primary uv is filled with zeros), so only a
/// change in *extra* streams regenerates the buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    streams: u8,
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self { streams: 1 }
    }
}

impl VertexLayout {
    pub fn for_descriptor(desc: &BatchDescriptor) -> Self {
        Self {
            streams: desc.uv_streams.len().max(1) as u8,
        }
    }

    /// Effective uv-stream count (always >= 1).
    #[inline]
    pub fn streams(self) -> u8 {
        self.streams
    }

    /// Byte size of one interleaved vertex record.
    #[inline]
    pub fn stride(self) -> u32 {
        // pos (8) + primary uv (8) + color (16) + 8 per extra stream
        32 + 8 * (self.streams as u32 - 1)
    }
}

/// The "currently pending" render state: what the accumulation buffer was
/// filled under, and what the next flush will be submitted with.
#[derive(Debug, Clone, Default)]
pub struct PendingState {
    /// `None` until the first draw adopts a material, and again after every
    /// flush; any incoming descriptor then registers as a state change,
    /// forcing a rebind.
    pub material: Option<MaterialId>,
    pub texture: Option<TextureBinding>,
    pub topology: Topology,
    /// Clip active when the state was adopted. `None` = no clip.
    pub clip: Option<Rect>,
    pub world: WorldTransform,
    pub layout: VertexLayout,
}

impl PendingState {
    /// True if `desc` cannot share a packet with the pending accumulation.
    ///
    /// `active_clip` is the clip stack's current rectangle, which may have
    /// changed since this state was adopted. Layout divergence is handled by
    /// the overflow check, not here.
    pub fn is_state_change(&self, desc: &BatchDescriptor, active_clip: Option<Rect>) -> bool {
        if self.material != Some(desc.material) {
            return true;
        }
        if self.texture != desc.texture {
            return true;
        }
        if self.topology != desc.topology {
            return true;
        }
        if self.clip != active_clip {
            return true;
        }
        !self
            .world
            .compatible_with(&WorldTransform::from_descriptor(desc.world))
    }

    /// Adopts the descriptor's state as the new pending snapshot.
    pub fn adopt(&mut self, desc: &BatchDescriptor, active_clip: Option<Rect>) {
        self.material = Some(desc.material);
        self.texture = desc.texture;
        self.topology = desc.topology;
        self.clip = active_clip;
        self.world = WorldTransform::from_descriptor(desc.world);
        self.layout = VertexLayout::for_descriptor(desc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::descriptor::{AttrSlice, SamplerId, TextureSetId};
    use smallvec::smallvec;

    fn quad_positions() -> [[f32; 2]; 4] {
        [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
    }

    fn desc<'a>(positions: &'a [[f32; 2]], indices: &'a [u16]) -> BatchDescriptor<'a> {
        BatchDescriptor::new(AttrSlice::from_slice(positions), indices, MaterialId(1))
    }

    const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

    // ── world transform ───────────────────────────────────────────────────

    #[test]
    fn identity_always_compatible() {
        assert!(WorldTransform::Identity.compatible_with(&WorldTransform::Identity));
    }

    #[test]
    fn identity_vs_custom_incompatible() {
        let w = WorldTransform::Custom(Mat4::IDENTITY);
        // Even a custom matrix holding the identity value forces a split.
        assert!(!WorldTransform::Identity.compatible_with(&w));
        assert!(!w.compatible_with(&WorldTransform::Identity));
    }

    #[test]
    fn custom_requires_bit_equality() {
        let a = WorldTransform::Custom(Mat4::scale_2d(2.0));
        let b = WorldTransform::Custom(Mat4::scale_2d(2.0));
        let c = WorldTransform::Custom(Mat4::scale_2d(3.0));
        assert!(a.compatible_with(&b));
        assert!(!a.compatible_with(&c));
    }

    // ── vertex layout ─────────────────────────────────────────────────────

    #[test]
    fn untextured_shares_single_stream_layout() {
        let pos = quad_positions();
        let uvs = quad_positions();
        let plain = desc(&pos, &QUAD_INDICES);
        let textured = desc(&pos, &QUAD_INDICES).with_uv_stream(AttrSlice::from_slice(&uvs));

        assert_eq!(
            VertexLayout::for_descriptor(&plain),
            VertexLayout::for_descriptor(&textured)
        );
        assert_eq!(VertexLayout::for_descriptor(&plain).stride(), 32);
    }

    #[test]
    fn extra_streams_grow_stride() {
        let pos = quad_positions();
        let uvs = quad_positions();
        let mut d = desc(&pos, &QUAD_INDICES);
        d.uv_streams = smallvec![AttrSlice::from_slice(&uvs), AttrSlice::from_slice(&uvs)];
        let layout = VertexLayout::for_descriptor(&d);
        assert_eq!(layout.streams(), 2);
        assert_eq!(layout.stride(), 40);
    }

    // ── state change detection ────────────────────────────────────────────

    #[test]
    fn unbound_material_is_a_state_change() {
        let pos = quad_positions();
        let d = desc(&pos, &QUAD_INDICES);
        let state = PendingState::default();
        assert!(state.is_state_change(&d, None));
    }

    #[test]
    fn adopted_state_is_compatible() {
        let pos = quad_positions();
        let d = desc(&pos, &QUAD_INDICES);
        let mut state = PendingState::default();
        state.adopt(&d, None);
        assert!(!state.is_state_change(&d, None));
    }

    #[test]
    fn material_difference_splits() {
        let pos = quad_positions();
        let d = desc(&pos, &QUAD_INDICES);
        let mut state = PendingState::default();
        state.adopt(&d, None);

        let mut other = desc(&pos, &QUAD_INDICES);
        other.material = MaterialId(2);
        assert!(state.is_state_change(&other, None));
    }

    #[test]
    fn texture_binding_difference_splits() {
        let pos = quad_positions();
        let d = desc(&pos, &QUAD_INDICES);
        let mut state = PendingState::default();
        state.adopt(&d, None);

        let bound = desc(&pos, &QUAD_INDICES).with_texture(TextureBinding {
            texture_set: TextureSetId(7),
            sampler: SamplerId(0),
        });
        assert!(state.is_state_change(&bound, None));
    }

    #[test]
    fn clip_difference_splits() {
        let pos = quad_positions();
        let d = desc(&pos, &QUAD_INDICES);
        let mut state = PendingState::default();
        state.adopt(&d, None);

        assert!(state.is_state_change(&d, Some(Rect::new(0.0, 0.0, 5.0, 5.0))));
    }
}
