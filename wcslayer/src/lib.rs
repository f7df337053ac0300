//! WCSLayer - Web Coverage Service raster acquisition and caching
//!
//! This library fetches raster coverages from WCS 2.0.1 endpoints,
//! reprojects them to geographic WGS84 textures, and serves repeat
//! requests from a two-tier cache (in-memory textures plus on-disk
//! payloads). Acquisition runs on a fixed pool of worker threads and
//! hands back awaitable handles.

pub mod cache;
pub mod coverage;
pub mod fetch;
pub mod loader;
pub mod logging;
pub mod reproject;
pub mod texture;

pub use cache::{DiskCache, TextureCache, TextureKey};
pub use coverage::{Coverage, CoverageRequest, LonLatBounds, WebCoverageService};
pub use fetch::{FetchOutcome, HttpClient, WebCoverageFetcher};
pub use loader::{CoverageTextureLoader, TextureHandle};
pub use reproject::DatasetSource;
pub use texture::{RadianBounds, TexelKind, Texture};
