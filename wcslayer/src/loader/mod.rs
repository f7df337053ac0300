//! End-to-end coverage acquisition.
//!
//! [`CoverageTextureLoader`] ties the pipeline together: derive a cache
//! path, consult the in-memory texture cache, fall back to the disk
//! cache, and only then fetch from the service, decode, and populate
//! both tiers. Failures at any stage are logged and surface as `None`
//! rather than panicking the caller.

mod pool;

pub use pool::{JobHandle, WorkerPool};

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::cache::{cache_path, DiskCache, TextureCache, TextureKey};
use crate::coverage::{request_url, Coverage, CoverageRequest, WebCoverageService};
use crate::fetch::{FetchOutcome, HttpClient, HttpError, ReqwestClient, WebCoverageFetcher};
use crate::reproject::{self, DatasetSource};
use crate::texture::Texture;

/// Handle to an acquisition job running on the loader's worker pool.
///
/// Resolves to the same value [`CoverageTextureLoader::load`] would
/// return; the outer `Option` from [`JobHandle::wait`] (or `.await`)
/// is `None` only if the job itself was lost.
pub type TextureHandle = JobHandle<Option<Arc<Texture>>>;

struct LoaderInner<C: HttpClient> {
    cache: Arc<TextureCache>,
    disk: DiskCache,
    fetcher: WebCoverageFetcher<C>,
    cache_root: PathBuf,
}

/// Loads reprojected coverage textures through a two-tier cache.
pub struct CoverageTextureLoader<C: HttpClient + 'static> {
    inner: Arc<LoaderInner<C>>,
    pool: WorkerPool,
}

impl CoverageTextureLoader<ReqwestClient> {
    /// Creates a loader with a real HTTP client, a fresh texture cache
    /// and a worker pool sized to the available hardware concurrency.
    ///
    /// # Arguments
    ///
    /// * `cache_root` - Directory under which coverage payloads are
    ///   persisted.
    pub fn new(cache_root: PathBuf) -> Result<Self, HttpError> {
        Ok(Self::with_client(
            ReqwestClient::new()?,
            cache_root,
            Arc::new(TextureCache::new()),
        ))
    }
}

impl<C: HttpClient + 'static> CoverageTextureLoader<C> {
    /// Creates a loader over an arbitrary HTTP client and a shared
    /// texture cache.
    pub fn with_client(client: C, cache_root: PathBuf, cache: Arc<TextureCache>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                cache,
                disk: DiskCache::new(),
                fetcher: WebCoverageFetcher::new(client),
                cache_root,
            }),
            pool: WorkerPool::with_default_size(),
        }
    }

    /// The texture cache this loader populates.
    pub fn texture_cache(&self) -> &Arc<TextureCache> {
        &self.inner.cache
    }

    /// Loads a coverage texture, blocking the current thread.
    ///
    /// Checks the in-memory cache, then (when `save_to_cache` is set)
    /// the disk cache, and finally fetches from the service. A freshly
    /// fetched payload is persisted to disk when `save_to_cache` is
    /// set; a failed disk write is logged but does not discard the
    /// decoded texture.
    ///
    /// # Returns
    ///
    /// The decoded texture, or `None` if acquisition failed at any
    /// stage (details are logged).
    pub fn load(
        &self,
        service: &WebCoverageService,
        coverage: &Coverage,
        request: &CoverageRequest,
        save_to_cache: bool,
    ) -> Option<Arc<Texture>> {
        self.inner.load(service, coverage, request, save_to_cache)
    }

    /// Submits a load to the worker pool and returns immediately.
    pub fn load_async(
        &self,
        service: &WebCoverageService,
        coverage: &Coverage,
        request: &CoverageRequest,
        save_to_cache: bool,
    ) -> TextureHandle {
        let inner = Arc::clone(&self.inner);
        let service = service.clone();
        let coverage = coverage.clone();
        let request = request.clone();
        self.pool
            .submit(move || inner.load(&service, &coverage, &request, save_to_cache))
    }

    /// Number of raster bands in a dataset.
    ///
    /// Answers from the cache for path sources seen before; otherwise
    /// opens the dataset and records the count for next time.
    pub fn band_count(&self, source: &DatasetSource) -> Option<usize> {
        if let DatasetSource::Path(path) = source {
            if let Some(count) = self.inner.cache.band_count(&path.to_string_lossy()) {
                return Some(count);
            }
        }
        match reproject::band_count(source) {
            Ok(count) => {
                if let DatasetSource::Path(path) = source {
                    self.inner
                        .cache
                        .put_band_count(path.to_string_lossy(), count);
                }
                Some(count)
            }
            Err(e) => {
                warn!(error = %e, "Failed to query band count");
                None
            }
        }
    }
}

impl<C: HttpClient> LoaderInner<C> {
    fn load(
        &self,
        service: &WebCoverageService,
        coverage: &Coverage,
        request: &CoverageRequest,
        save_to_cache: bool,
    ) -> Option<Arc<Texture>> {
        let path = match cache_path(&self.cache_root, coverage, request) {
            Ok(path) => path,
            Err(e) => {
                error!(error = %e, coverage = %coverage.id, "Cannot derive cache path");
                return None;
            }
        };
        let key = TextureKey::new(path.to_string_lossy(), request.band_or_default());

        if let Some(texture) = self.cache.get(&key) {
            debug!(source = %key.source, band = key.band, "Texture cache hit");
            return Some(texture);
        }

        let band = request.band_or_default() as usize;

        let texture = if save_to_cache && self.disk.has(&path) {
            debug!(path = %path.display(), "Decoding coverage from disk cache");
            self.decode(&DatasetSource::Path(path.clone()), band)?
        } else {
            let url = request_url(service, coverage, request);
            let outcome = match self.fetcher.fetch(&url, request.format_or_default()) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, coverage = %coverage.id, "Coverage fetch failed");
                    return None;
                }
            };
            let bytes = match outcome {
                FetchOutcome::Data(bytes) => bytes,
                // The fetcher already logged the exception report.
                FetchOutcome::Declined(_) => return None,
            };

            let source = DatasetSource::Bytes(bytes);
            let texture = self.decode(&source, band)?;

            if save_to_cache {
                if let DatasetSource::Bytes(bytes) = &source {
                    if let Err(e) = self.disk.store(&path, bytes) {
                        warn!(error = %e, "Failed to persist coverage to disk cache");
                    }
                }
            }
            texture
        };

        self.cache.put_band_count(key.source.clone(), texture.bands);
        Some(self.cache.put(key, texture))
    }

    fn decode(&self, source: &DatasetSource, band: usize) -> Option<Texture> {
        match reproject::build(source, band) {
            Ok(texture) => Some(texture),
            Err(e) => {
                warn!(error = %e, "Failed to decode coverage");
                None
            }
        }
    }
}
