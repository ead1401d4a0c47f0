/// Column-major 4x4 matrix.
///
/// Only the operations the batcher needs: identity, a 2D orthographic
/// projection for the frame, and exact bitwise comparison for deciding
/// whether two per-draw world transforms can share a packet.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Orthographic projection mapping `[0, w] x [0, h]` (top-left origin,
    /// +Y down) onto NDC `[-1, 1] x [-1, 1]` with Y flipped.
    pub fn ortho_2d(w: f32, h: f32) -> Self {
        let mut m = Mat4::IDENTITY;
        m.m[0] = 2.0 / w;
        m.m[5] = -2.0 / h;
        m.m[12] = -1.0;
        m.m[13] = 1.0;
        m
    }

    /// Uniform 2D scale (virtual-to-physical pixel mapping).
    pub fn scale_2d(s: f32) -> Self {
        let mut m = Mat4::IDENTITY;
        m.m[0] = s;
        m.m[5] = s;
        m
    }

    pub fn mul(&self, rhs: &Mat4) -> Mat4 {
        let mut out = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut acc = 0.0;
                for k in 0..4 {
                    acc += self.m[k * 4 + row] * rhs.m[col * 4 + k];
                }
                out[col * 4 + row] = acc;
            }
        }
        Mat4 { m: out }
    }

    /// Exact component-wise comparison.
    ///
    /// Batching compatibility must not merge transforms that merely compare
    /// float-equal (e.g. `0.0 == -0.0`); the original values are forwarded to
    /// the GPU, so only bit-identical matrices are interchangeable.
    #[inline]
    pub fn bitwise_eq(&self, other: &Mat4) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}
