//! Quad geometry generators.
//!
//! Four shapes cover the sprite drawing needs of the UI and scene layers:
//! a plain quad, a nine-slice stretch, a tiled fill and a tiled fill with a
//! second uv stream for a detail layer. All of them emit triangle lists with
//! indices local to the generated vertex range.

use ziggurat_batch::batch::{AttrSlice, BatchDescriptor, MaterialId};
use ziggurat_batch::geom::{Rect, Vec2};

/// Largest number of quads one geometry can hold with `u16` indices.
const MAX_QUADS: usize = (u16::MAX as usize + 1) / 4;

/// Fixed pixel borders of a nine-slice sprite, measured in source pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Margins {
    pub const fn uniform(m: f32) -> Self {
        Self {
            left: m,
            right: m,
            top: m,
            bottom: m,
        }
    }
}

/// Owned tessellation output of one generator call.
///
/// Streams are tightly packed and parallel: `uvs` (and `detail_uvs` when
/// present) have one element per position. Lives in the producer, typically
/// inside a [`GeometryCache`](crate::cache::GeometryCache), and is borrowed
/// by [`descriptor`](Self::descriptor) for the duration of a push.
#[derive(Debug, Clone, Default)]
pub struct QuadGeometry {
    pub positions: Vec<[f32; 2]>,
    pub uvs: Vec<[f32; 2]>,
    pub detail_uvs: Option<Vec<[f32; 2]>>,
    pub indices: Vec<u16>,
}

impl QuadGeometry {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Builds a descriptor borrowing this geometry.
    ///
    /// Texture, color, world transform and topology are left at their
    /// defaults; chain the descriptor's builder methods to set them.
    pub fn descriptor(&self, material: MaterialId) -> BatchDescriptor<'_> {
        let mut desc = BatchDescriptor::new(
            AttrSlice::from_slice(&self.positions),
            &self.indices,
            material,
        )
        .with_uv_stream(AttrSlice::from_slice(&self.uvs));
        if let Some(detail) = &self.detail_uvs {
            desc = desc.with_uv_stream(AttrSlice::from_slice(detail));
        }
        desc
    }

    /// Appends one axis-aligned quad: four vertices, six indices.
    fn push_quad(&mut self, dst: Rect, uv: Rect) {
        let base = self.positions.len() as u16;
        let x0 = dst.origin.x;
        let y0 = dst.origin.y;
        let x1 = x0 + dst.size.x;
        let y1 = y0 + dst.size.y;
        self.positions
            .extend([[x0, y0], [x1, y0], [x0, y1], [x1, y1]]);

        let u0 = uv.origin.x;
        let v0 = uv.origin.y;
        let u1 = u0 + uv.size.x;
        let v1 = v0 + uv.size.y;
        self.uvs.extend([[u0, v0], [u1, v0], [u0, v1], [u1, v1]]);

        self.indices.extend([
            base,
            base + 1,
            base + 2,
            base + 2,
            base + 1,
            base + 3,
        ]);
    }
}

/// One quad covering `dst`, sampling the `uv` sub-rect.
///
/// `uv` is in normalized texture coordinates (an atlas region, typically).
pub fn plain(dst: Rect, uv: Rect) -> QuadGeometry {
    let mut g = QuadGeometry::default();
    g.push_quad(dst, uv);
    g
}

/// Nine-slice stretch of a sprite over `dst`.
///
/// The four corner cells keep their source pixel size, edge cells stretch
/// along one axis and the center stretches along both. `sprite_size` is the
/// source sprite's pixel size (the region `uv` maps to); `margins` are the
/// fixed borders in source pixels. When `dst` is smaller than the opposing
/// margins combined, the borders shrink proportionally so cells never invert.
///
/// Emits a 4x4 vertex grid: 16 vertices, 9 cells, 54 indices.
pub fn stretched(dst: Rect, uv: Rect, sprite_size: Vec2, margins: Margins) -> QuadGeometry {
    debug_assert!(
        sprite_size.x > 0.0 && sprite_size.y > 0.0,
        "nine-slice sprite size must be positive, got {sprite_size:?}"
    );

    let h_scale = if margins.left + margins.right > 0.0 {
        (dst.size.x / (margins.left + margins.right)).min(1.0)
    } else {
        1.0
    };
    let v_scale = if margins.top + margins.bottom > 0.0 {
        (dst.size.y / (margins.top + margins.bottom)).min(1.0)
    } else {
        1.0
    };
    let left = margins.left * h_scale;
    let right = margins.right * h_scale;
    let top = margins.top * v_scale;
    let bottom = margins.bottom * v_scale;

    let xs = [
        dst.origin.x,
        dst.origin.x + left,
        dst.origin.x + dst.size.x - right,
        dst.origin.x + dst.size.x,
    ];
    let ys = [
        dst.origin.y,
        dst.origin.y + top,
        dst.origin.y + dst.size.y - bottom,
        dst.origin.y + dst.size.y,
    ];

    // uv cuts stay proportional to the source sprite, not the destination.
    let us = [
        uv.origin.x,
        uv.origin.x + uv.size.x * (margins.left / sprite_size.x),
        uv.origin.x + uv.size.x * (1.0 - margins.right / sprite_size.x),
        uv.origin.x + uv.size.x,
    ];
    let vs = [
        uv.origin.y,
        uv.origin.y + uv.size.y * (margins.top / sprite_size.y),
        uv.origin.y + uv.size.y * (1.0 - margins.bottom / sprite_size.y),
        uv.origin.y + uv.size.y,
    ];

    let mut g = QuadGeometry::default();
    for row in 0..4 {
        for col in 0..4 {
            g.positions.push([xs[col], ys[row]]);
            g.uvs.push([us[col], vs[row]]);
        }
    }
    for row in 0..3u16 {
        for col in 0..3u16 {
            let tl = row * 4 + col;
            let tr = tl + 1;
            let bl = tl + 4;
            let br = bl + 1;
            g.indices.extend([tl, tr, bl, bl, tr, br]);
        }
    }
    g
}

/// Fills `dst` with a repeating tile of `tile_size` pixels.
///
/// Edge tiles that do not fit whole are clipped, with their uvs clamped to
/// the matching fraction of the tile so the pattern is cut rather than
/// squashed. Degenerate inputs (empty `dst` or non-positive tile size)
/// produce empty geometry.
pub fn tiled(dst: Rect, uv: Rect, tile_size: Vec2) -> QuadGeometry {
    tiled_grid(dst, uv, tile_size, None)
}

/// Tiled fill carrying a second uv stream for a detail layer.
///
/// The base layer repeats exactly as [`tiled`]; the detail layer's
/// `detail_uv` rect is mapped once across the whole of `dst`, so every
/// vertex's detail coordinate is its fractional position within `dst`.
pub fn tiled_multilayer(dst: Rect, uv: Rect, tile_size: Vec2, detail_uv: Rect) -> QuadGeometry {
    tiled_grid(dst, uv, tile_size, Some(detail_uv))
}

fn tiled_grid(dst: Rect, uv: Rect, tile_size: Vec2, detail_uv: Option<Rect>) -> QuadGeometry {
    let mut g = QuadGeometry::default();
    if dst.is_empty() || tile_size.x <= 0.0 || tile_size.y <= 0.0 {
        return g;
    }

    let cols = (dst.size.x / tile_size.x).ceil() as usize;
    let rows = (dst.size.y / tile_size.y).ceil() as usize;
    // checked: degenerate tile sizes can push the tile count past usize.
    if cols.checked_mul(rows).is_none_or(|quads| quads > MAX_QUADS) {
        log::warn!(
            "tiled geometry truncated: {}x{} tiles exceed the {} quad index range",
            cols,
            rows,
            MAX_QUADS,
        );
    }

    let mut quads = 0;
    'grid: for row in 0..rows {
        for col in 0..cols {
            if quads == MAX_QUADS {
                break 'grid;
            }
            let x = dst.origin.x + col as f32 * tile_size.x;
            let y = dst.origin.y + row as f32 * tile_size.y;
            let w = tile_size.x.min(dst.origin.x + dst.size.x - x);
            let h = tile_size.y.min(dst.origin.y + dst.size.y - y);

            // Partial edge tiles sample only the covered fraction.
            let tile_uv = Rect::new(
                uv.origin.x,
                uv.origin.y,
                uv.size.x * (w / tile_size.x),
                uv.size.y * (h / tile_size.y),
            );
            g.push_quad(Rect::new(x, y, w, h), tile_uv);
            quads += 1;
        }
    }

    if let Some(detail) = detail_uv {
        let detail_uvs = g
            .positions
            .iter()
            .map(|&[px, py]| {
                let fx = (px - dst.origin.x) / dst.size.x;
                let fy = (py - dst.origin.y) / dst.size.y;
                [
                    detail.origin.x + detail.size.x * fx,
                    detail.origin.y + detail.size.y * fy,
                ]
            })
            .collect();
        g.detail_uvs = Some(detail_uvs);
    }
    g
}
