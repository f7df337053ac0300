//! In-memory texture cache.
//!
//! Process lifetime, explicitly constructed and injected into the
//! pipeline (no global state), shared via `Arc`. Decoded textures and
//! per-source band counts live in two independent concurrent maps, so a
//! band-count lookup never waits on an unrelated texture insert.
//!
//! The cache is unbounded by design: entries only leave through
//! [`TextureCache::clear`]. Values are handed out as `Arc<Texture>`, so
//! an entry returned before a concurrent `put` of the same key stays
//! valid; the last `put` simply wins for future lookups.

use std::sync::Arc;

use dashmap::DashMap;

use super::TextureKey;
use crate::texture::Texture;

/// Shared cache of decoded textures and source band counts.
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: DashMap<TextureKey, Arc<Texture>>,
    band_counts: DashMap<String, usize>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a decoded texture.
    pub fn get(&self, key: &TextureKey) -> Option<Arc<Texture>> {
        self.textures.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Stores a decoded texture, returning the shared handle.
    pub fn put(&self, key: TextureKey, texture: Texture) -> Arc<Texture> {
        let shared = Arc::new(texture);
        self.textures.insert(key, Arc::clone(&shared));
        shared
    }

    /// Number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Returns true if no textures are cached.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Looks up the band count recorded for a source.
    pub fn band_count(&self, source: &str) -> Option<usize> {
        self.band_counts.get(source).map(|entry| *entry.value())
    }

    /// Records the band count of a source.
    ///
    /// Populated lazily on the first successful decode of the source;
    /// subsequent band-count queries need no fetch or decode.
    pub fn put_band_count(&self, source: impl Into<String>, count: usize) {
        self.band_counts.insert(source.into(), count);
    }

    /// Releases all cached textures.
    ///
    /// Band counts are retained; they describe the sources themselves,
    /// not the decoded buffers.
    pub fn clear(&self) {
        self.textures.clear();
    }
}
