use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::assets::decode::decode_image;
use crate::assets::raster::RasterImage;
use crate::foundation::error::{MockupError, MockupResult};

/// Source of device frame overlays.
///
/// `load` is the only place a render suspends, so implementations must never block the calling
/// task: do IO asynchronously and push decoding onto the blocking pool.
pub trait OverlayLoader: Send + Sync + 'static {
    /// Load and decode the overlay named by `reference`.
    ///
    /// Failures should be reported as [`MockupError::ImageLoad`].
    fn load(&self, reference: &str) -> impl Future<Output = MockupResult<RasterImage>> + Send;
}

/// Normalize and validate overlay references relative to a loader root.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> MockupResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(MockupError::validation("overlay paths must be relative"));
    }
    if s.is_empty() {
        return Err(MockupError::validation("overlay path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(MockupError::validation(
                "overlay paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(MockupError::validation(
            "overlay path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Loads overlays from files under a root directory.
#[derive(Clone, Debug)]
pub struct FsOverlayLoader {
    root: PathBuf,
}

impl FsOverlayLoader {
    /// Resolve overlay references against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory overlay references are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OverlayLoader for FsOverlayLoader {
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    async fn load(&self, reference: &str) -> MockupResult<RasterImage> {
        let rel = normalize_rel_path(reference)
            .map_err(|e| MockupError::image_load(reference, e.to_string()))?;
        let path = self.root.join(&rel);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            MockupError::image_load(reference, format!("read {}: {e}", path.display()))
        })?;

        let owned = reference.to_string();
        let decoded = tokio::task::spawn_blocking(move || decode_image(&bytes))
            .await
            .map_err(|e| MockupError::image_load(&owned, format!("decode task failed: {e}")))?;
        decoded.map_err(|e| MockupError::image_load(&owned, e.to_string()))
    }
}

/// In-memory overlay loader for tests and embedding.
///
/// An optional latency is awaited before every load, which makes the suspension point observable
/// under a paused Tokio clock.
#[derive(Debug, Default)]
pub struct MemoryOverlayLoader {
    images: HashMap<String, RasterImage>,
    latency: Option<Duration>,
    loads: AtomicUsize,
}

impl MemoryOverlayLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `image` under `reference`.
    pub fn with_image(mut self, reference: impl Into<String>, image: RasterImage) -> Self {
        self.images.insert(reference.into(), image);
        self
    }

    /// Delay every load by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `load` calls served so far, including failed ones.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl OverlayLoader for MemoryOverlayLoader {
    async fn load(&self, reference: &str) -> MockupResult<RasterImage> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| MockupError::image_load(reference, "no such overlay registered"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
