//! Producer-side draw helpers.
//!
//! The batching core in `ziggurat-batch` accepts arbitrary indexed geometry;
//! this crate generates the common sprite shapes that feed it. Each generator
//! is a pure function from layout inputs to a [`QuadGeometry`], which owns its
//! vertex data and lends it to a `BatchDescriptor` at push time.
//!
//! [`GeometryCache`] lets a producer keep generated geometry across frames,
//! keyed on sprite identity and layout parameters, so unchanged widgets do not
//! re-tessellate every frame.
//!
//! [`GeometryCache`]: cache::GeometryCache

pub mod cache;
pub mod quad;

pub use cache::{GeometryCache, GeometryKey, GeometryParams, SpriteId};
pub use quad::{Margins, QuadGeometry};
