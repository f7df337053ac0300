//! Two-tier caching for decoded textures and raw coverage payloads.
//!
//! - [`TextureCache`] holds decoded textures and per-source band counts
//!   in memory, keyed by [`TextureKey`].
//! - [`DiskCache`] persists raw fetched payloads under paths derived by
//!   [`cache_path`], so a later run can decode them without refetching.
//!
//! Key derivation is pure and restart-stable; the same request always
//! maps to the same disk path and memory key.

mod disk;
mod key;
mod memory;

pub use disk::{DiskCache, DiskCacheError};
pub use key::{cache_path, extension_for, sanitize_identifier, KeyError, TextureKey};
pub use memory::TextureCache;
