use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use plenka_state::{
    ImageQuality,
    api::{ClientError, ErrorKind},
};

use crate::PhotoGateway;

/// The default number of images kept in memory.
pub const DEFAULT_MAX_CACHED: usize = 64;

/// One image URL: a file at a quality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey {
    pub file: String,
    pub quality: ImageQuality,
}
impl ImageKey {
    pub fn new(file: impl Into<String>, quality: ImageQuality) -> Self {
        Self {
            file: file.into(),
            quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFetchError {
    /// The download failed; every waiter receives a copy of the reason.
    Failed { kind: ErrorKind, message: String },
    /// The fetch was cancelled before it completed.
    Cancelled,
}
impl std::fmt::Display for ImageFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFetchError::Failed { kind, message } => {
                write!(f, "image fetch failed ({kind}): {message}")
            }
            ImageFetchError::Cancelled => write!(f, "image fetch cancelled"),
        }
    }
}
impl std::error::Error for ImageFetchError {}
impl From<ClientError> for ImageFetchError {
    fn from(e: ClientError) -> Self {
        ImageFetchError::Failed {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

pub type ImageResult = Result<Arc<[u8]>, ImageFetchError>;

/// Downloads images with at most one request in flight per URL.
///
/// Callers asking for an image that is already downloading wait for the same
/// download. Finished downloads are kept in a bounded in-memory cache.
pub struct ImageFetcher<G> {
    gateway: Arc<G>,
    state: Arc<Mutex<FetcherState>>,
}

#[derive(Default)]
struct FetcherState {
    cache: HashMap<ImageKey, CachedImage>,
    pending: HashMap<ImageKey, PendingFetch>,
    max_cached: usize,
    next_sequence: u64,
}

struct CachedImage {
    data: Arc<[u8]>,
    sequence: u64,
}

struct PendingFetch {
    // Distinguishes a download from a newer one for the same key started
    // after a cancellation.
    generation: u64,
    waiters: Vec<tokio::sync::oneshot::Sender<ImageResult>>,
    abort: tokio::task::AbortHandle,
}

enum Lookup {
    Cached(Arc<[u8]>),
    Waiting(tokio::sync::oneshot::Receiver<ImageResult>),
}

impl<G: PhotoGateway> ImageFetcher<G> {
    pub fn new(gateway: Arc<G>, max_cached: usize) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(FetcherState {
                max_cached,
                ..Default::default()
            })),
        }
    }

    /// Get an image, downloading it unless it is cached or already on its way.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn fetch(&self, key: ImageKey) -> ImageResult {
        let lookup = {
            let mut state = self.state.lock().unwrap();
            if let Some(cached) = state.cache.get(&key) {
                tracing::debug!("Image cache hit for {}", key.file);
                Lookup::Cached(cached.data.clone())
            } else {
                let (tx, rx) = tokio::sync::oneshot::channel();
                match state.pending.get_mut(&key) {
                    Some(pending) => pending.waiters.push(tx),
                    None => self.start_download(&mut state, key, tx),
                }
                Lookup::Waiting(rx)
            }
        };

        match lookup {
            Lookup::Cached(data) => Ok(data),
            Lookup::Waiting(rx) => rx.await.unwrap_or(Err(ImageFetchError::Cancelled)),
        }
    }

    /// Get an image in at least `quality`, preferring any cached copy of
    /// equal or higher quality over a download.
    pub async fn fetch_highest_quality(&self, file: &str, quality: ImageQuality) -> ImageResult {
        let cached = {
            let state = self.state.lock().unwrap();
            quality.at_least().find_map(|q| {
                state
                    .cache
                    .get(&ImageKey::new(file, q))
                    .map(|cached| cached.data.clone())
            })
        };
        match cached {
            Some(data) => Ok(data),
            None => self.fetch(ImageKey::new(file, quality)).await,
        }
    }

    pub fn cached(&self, key: &ImageKey) -> Option<Arc<[u8]>> {
        let state = self.state.lock().unwrap();
        state.cache.get(key).map(|cached| cached.data.clone())
    }

    pub fn is_pending(&self, key: &ImageKey) -> bool {
        self.state.lock().unwrap().pending.contains_key(key)
    }

    /// Stop the download for `key`; its waiters receive
    /// [`ImageFetchError::Cancelled`]. Returns whether anything was pending.
    pub fn cancel(&self, key: &ImageKey) -> bool {
        let pending = self.state.lock().unwrap().pending.remove(key);
        match pending {
            Some(pending) => {
                tracing::debug!("Cancelled image fetch for {}", key.file);
                pending.abort.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        let pending: Vec<PendingFetch> = {
            let mut state = self.state.lock().unwrap();
            state.pending.drain().map(|(_, pending)| pending).collect()
        };
        if !pending.is_empty() {
            tracing::debug!("Cancelled {} image fetches", pending.len());
        }
        for pending in pending {
            pending.abort.abort();
        }
    }

    /// Cancel everything and drop the cache.
    pub fn clear(&self) {
        self.cancel_all();
        self.state.lock().unwrap().cache.clear();
    }

    fn start_download(
        &self,
        state: &mut FetcherState,
        key: ImageKey,
        waiter: tokio::sync::oneshot::Sender<ImageResult>,
    ) {
        let generation = state.next_sequence;
        state.next_sequence += 1;

        let gateway = self.gateway.clone();
        let shared = self.state.clone();
        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let result: ImageResult = gateway
                .fetch_image(&task_key.file, task_key.quality)
                .await
                .map(Arc::from)
                .map_err(ImageFetchError::from);
            if let Err(e) = &result {
                tracing::warn!("Failed to fetch image {}: {e}", task_key.file);
            }

            let waiters = {
                let mut state = shared.lock().unwrap();
                state.finish(&task_key, generation, &result)
            };
            for waiter in waiters {
                // The waiter may have given up; that is fine.
                let _ = waiter.send(result.clone());
            }
        });

        state.pending.insert(
            key,
            PendingFetch {
                generation,
                waiters: vec![waiter],
                abort: task.abort_handle(),
            },
        );
    }
}

impl FetcherState {
    /// Take the waiters of a finished download and cache its data. A download
    /// that was cancelled in the meantime has no waiters and is not cached.
    fn finish(
        &mut self,
        key: &ImageKey,
        generation: u64,
        result: &ImageResult,
    ) -> Vec<tokio::sync::oneshot::Sender<ImageResult>> {
        if self
            .pending
            .get(key)
            .is_none_or(|pending| pending.generation != generation)
        {
            return vec![];
        }
        let Some(pending) = self.pending.remove(key) else {
            return vec![];
        };

        if let Ok(data) = result {
            self.insert(key.clone(), data.clone());
        }
        pending.waiters
    }

    fn insert(&mut self, key: ImageKey, data: Arc<[u8]>) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.cache.insert(key, CachedImage { data, sequence });

        while self.cache.len() > self.max_cached {
            let Some(oldest) = self
                .cache
                .iter()
                .min_by_key(|(_, cached)| cached.sequence)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            tracing::debug!("Evicting image {} from cache", oldest.file);
            self.cache.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::gateway::fake::FakeGateway;

    fn gateway(delay: Duration) -> Arc<FakeGateway> {
        let gateway = FakeGateway::with_image_delay(delay);
        gateway.set_image("a.jpg", ImageQuality::Preview, b"preview");
        gateway.set_image("a.jpg", ImageQuality::High, b"high");
        gateway.set_image("b.jpg", ImageQuality::Preview, b"b");
        gateway.set_image("c.jpg", ImageQuality::Preview, b"c");
        Arc::new(gateway)
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_download() {
        let gateway = gateway(Duration::from_millis(20));
        let fetcher = ImageFetcher::new(gateway.clone(), 8);
        let key = ImageKey::new("a.jpg", ImageQuality::Preview);

        let (first, second, third) = tokio::join!(
            fetcher.fetch(key.clone()),
            fetcher.fetch(key.clone()),
            fetcher.fetch(key.clone()),
        );
        assert_eq!(&*first.unwrap(), b"preview");
        assert_eq!(&*second.unwrap(), b"preview");
        assert_eq!(&*third.unwrap(), b"preview");
        assert_eq!(gateway.image_calls(), 1);
        assert!(!fetcher.is_pending(&key));
    }

    #[tokio::test]
    async fn test_cached_image_is_not_downloaded_again() {
        let gateway = gateway(Duration::ZERO);
        let fetcher = ImageFetcher::new(gateway.clone(), 8);
        let key = ImageKey::new("a.jpg", ImageQuality::Preview);

        fetcher.fetch(key.clone()).await.unwrap();
        fetcher.fetch(key.clone()).await.unwrap();
        assert_eq!(gateway.image_calls(), 1);
        assert!(fetcher.cached(&key).is_some());
    }

    #[tokio::test]
    async fn test_higher_quality_copy_is_reused() {
        let gateway = gateway(Duration::ZERO);
        let fetcher = ImageFetcher::new(gateway.clone(), 8);

        fetcher
            .fetch(ImageKey::new("a.jpg", ImageQuality::High))
            .await
            .unwrap();
        let data = fetcher
            .fetch_highest_quality("a.jpg", ImageQuality::Preview)
            .await
            .unwrap();
        assert_eq!(&*data, b"high");
        assert_eq!(gateway.image_calls(), 1);

        // Nothing cached for b.jpg, so it is downloaded at the asked quality.
        let data = fetcher
            .fetch_highest_quality("b.jpg", ImageQuality::Preview)
            .await
            .unwrap();
        assert_eq!(&*data, b"b");
        assert_eq!(gateway.image_calls(), 2);
    }

    #[tokio::test]
    async fn test_cancel_notifies_waiters() {
        let gateway = gateway(Duration::from_millis(200));
        let fetcher = ImageFetcher::new(gateway.clone(), 8);
        let key = ImageKey::new("a.jpg", ImageQuality::Preview);

        let (first, second, cancelled) = tokio::join!(
            fetcher.fetch(key.clone()),
            fetcher.fetch(key.clone()),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                fetcher.cancel(&key)
            },
        );
        assert!(cancelled);
        assert_eq!(first, Err(ImageFetchError::Cancelled));
        assert_eq!(second, Err(ImageFetchError::Cancelled));
        assert!(fetcher.cached(&key).is_none());
        assert!(!fetcher.cancel(&key));
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let gateway = gateway(Duration::from_millis(200));
        let fetcher = ImageFetcher::new(gateway.clone(), 8);

        let (a, b, _) = tokio::join!(
            fetcher.fetch(ImageKey::new("a.jpg", ImageQuality::Preview)),
            fetcher.fetch(ImageKey::new("b.jpg", ImageQuality::Preview)),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                fetcher.cancel_all();
            },
        );
        assert_eq!(a, Err(ImageFetchError::Cancelled));
        assert_eq!(b, Err(ImageFetchError::Cancelled));
    }

    #[tokio::test]
    async fn test_failure_is_shared_and_not_cached() {
        let gateway = gateway(Duration::from_millis(10));
        let fetcher = ImageFetcher::new(gateway.clone(), 8);
        let key = ImageKey::new("missing.jpg", ImageQuality::Medium);

        let (first, second) = tokio::join!(fetcher.fetch(key.clone()), fetcher.fetch(key.clone()));
        assert!(matches!(
            first,
            Err(ImageFetchError::Failed {
                kind: ErrorKind::Parsing,
                ..
            })
        ));
        assert_eq!(first, second);
        assert_eq!(gateway.image_calls(), 1);

        assert!(fetcher.fetch(key.clone()).await.is_err());
        assert_eq!(gateway.image_calls(), 2);
    }

    #[tokio::test]
    async fn test_oldest_image_is_evicted() {
        let gateway = gateway(Duration::ZERO);
        let fetcher = ImageFetcher::new(gateway.clone(), 2);
        let keys: Vec<ImageKey> = ["a.jpg", "b.jpg", "c.jpg"]
            .into_iter()
            .map(|file| ImageKey::new(file, ImageQuality::Preview))
            .collect();

        for key in &keys {
            fetcher.fetch(key.clone()).await.unwrap();
        }
        assert!(fetcher.cached(&keys[0]).is_none());
        assert!(fetcher.cached(&keys[1]).is_some());
        assert!(fetcher.cached(&keys[2]).is_some());
    }

    #[tokio::test]
    async fn test_clear_drops_cache() {
        let gateway = gateway(Duration::ZERO);
        let fetcher = ImageFetcher::new(gateway.clone(), 8);
        let key = ImageKey::new("a.jpg", ImageQuality::Preview);

        fetcher.fetch(key.clone()).await.unwrap();
        fetcher.clear();
        assert!(fetcher.cached(&key).is_none());
        fetcher.fetch(key).await.unwrap();
        assert_eq!(gateway.image_calls(), 2);
    }
}
