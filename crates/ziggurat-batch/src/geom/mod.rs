//! Geometry primitives (logical pixels, top-left origin, +Y down).
//!
//! Kept deliberately small: the batcher only needs rectangles for clip math
//! and a 4x4 matrix for projection / per-draw world transforms.

mod matrix;
mod rect;
mod vec2;

pub use matrix::Mat4;
pub use rect::Rect;
pub use vec2::Vec2;
