//! Cross-frame geometry cache.
//!
//! Re-tessellating a nine-slice or a large tiled fill every frame is wasted
//! work when the widget's sprite, size and mode have not changed. Producers
//! own one of these caches and key entries on exactly those inputs; the
//! batching core itself stays stateless across frames.

use std::collections::HashMap;

use crate::quad::QuadGeometry;

/// Opaque sprite identifier, owned by the producer's asset system.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u32);

/// Generator mode plus its integral parameters.
///
/// Parameters are stored in pixels as integers so the key stays `Eq + Hash`;
/// fractional layout inputs must be quantized by the caller before keying.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryParams {
    Plain,
    Stretched {
        left: u32,
        right: u32,
        top: u32,
        bottom: u32,
    },
    Tiled {
        tile_w: u32,
        tile_h: u32,
    },
    TiledMultilayer {
        tile_w: u32,
        tile_h: u32,
    },
}

/// Everything a generated geometry depends on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    pub sprite: SpriteId,
    /// Animation frame index within the sprite.
    pub frame: u32,
    /// Target size in whole pixels.
    pub size: (u32, u32),
    pub params: GeometryParams,
}

/// Producer-owned cache of generated quad geometry.
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: HashMap<GeometryKey, QuadGeometry>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached geometry for `key`, generating it with `build` on
    /// a miss.
    pub fn get_or_insert_with<F>(&mut self, key: GeometryKey, build: F) -> &QuadGeometry
    where
        F: FnOnce() -> QuadGeometry,
    {
        self.entries.entry(key).or_insert_with(build)
    }

    /// Drops every entry derived from `sprite`. Call when the sprite's asset
    /// is reloaded or its atlas placement changes.
    pub fn invalidate_sprite(&mut self, sprite: SpriteId) {
        self.entries.retain(|key, _| key.sprite != sprite);
    }

    /// Keeps only the entries whose key satisfies `pred`.
    pub fn retain<F>(&mut self, mut pred: F)
    where
        F: FnMut(&GeometryKey) -> bool,
    {
        self.entries.retain(|key, _| pred(key));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quad;
    use ziggurat_batch::geom::{Rect, Vec2};

    fn key(sprite: u32, size: (u32, u32)) -> GeometryKey {
        GeometryKey {
            sprite: SpriteId(sprite),
            frame: 0,
            size,
            params: GeometryParams::Tiled {
                tile_w: 16,
                tile_h: 16,
            },
        }
    }

    fn build(size: (u32, u32)) -> QuadGeometry {
        quad::tiled(
            Rect::new(0.0, 0.0, size.0 as f32, size.1 as f32),
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Vec2::new(16.0, 16.0),
        )
    }

    #[test]
    fn hit_skips_rebuild() {
        let mut cache = GeometryCache::new();
        let k = key(1, (32, 32));
        cache.get_or_insert_with(k, || build((32, 32)));
        assert_eq!(cache.len(), 1);

        // Second lookup must not invoke the builder.
        let g = cache.get_or_insert_with(k, || panic!("rebuilt on a cache hit"));
        assert_eq!(g.vertex_count(), 16);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_params_are_distinct_entries() {
        let mut cache = GeometryCache::new();
        cache.get_or_insert_with(key(1, (32, 32)), || build((32, 32)));
        cache.get_or_insert_with(key(1, (64, 32)), || build((64, 32)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalidate_sprite_drops_only_that_sprite() {
        let mut cache = GeometryCache::new();
        cache.get_or_insert_with(key(1, (32, 32)), || build((32, 32)));
        cache.get_or_insert_with(key(1, (64, 64)), || build((64, 64)));
        cache.get_or_insert_with(key(2, (32, 32)), || build((32, 32)));

        cache.invalidate_sprite(SpriteId(1));
        assert_eq!(cache.len(), 1);

        cache.get_or_insert_with(key(2, (32, 32)), || panic!("sprite 2 was evicted"));
    }

    #[test]
    fn retain_filters_by_predicate() {
        let mut cache = GeometryCache::new();
        cache.get_or_insert_with(key(1, (32, 32)), || build((32, 32)));
        cache.get_or_insert_with(key(2, (64, 64)), || build((64, 64)));

        cache.retain(|k| k.size == (64, 64));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut cache = GeometryCache::new();
        cache.get_or_insert_with(key(1, (32, 32)), || build((32, 32)));
        cache.clear();
        assert!(cache.is_empty());
    }
}
