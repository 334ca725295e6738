//! Template image fetching
//!
//! The engine asks an [`ImageFetcher`] for the encoded bytes of an asset and
//! reacts only to its final success or failure. Retrying is the fetcher's
//! business: wrap any fetcher in [`RetryingFetcher`] to retry with a fixed
//! delay.

use crate::types::{ComposeError, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Collaborator that turns an asset URL into encoded image bytes
pub trait ImageFetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Reads assets from the local filesystem.
///
/// Accepts plain paths and `file://` URLs. Relative paths resolve against
/// `root` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf> {
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(ComposeError::AssetLoad {
                url: url.to_string(),
                reason: "network URLs are not supported by the file fetcher".to_string(),
            });
        }
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        Ok(match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        })
    }
}

impl ImageFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let path = self.resolve(url)?;
        tokio::fs::read(&path).await.map_err(|e| ComposeError::AssetLoad {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Retries a failing fetch a fixed number of times with a constant delay
#[derive(Debug, Clone)]
pub struct RetryingFetcher<F> {
    inner: F,
    retries: usize,
    delay: Duration,
}

impl<F: ImageFetcher> RetryingFetcher<F> {
    /// Three retries, half a second apart
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            retries: 3,
            delay: Duration::from_millis(500),
        }
    }

    pub fn with_policy(inner: F, retries: usize, delay: Duration) -> Self {
        Self {
            inner,
            retries,
            delay,
        }
    }
}

impl<F: ImageFetcher> ImageFetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    log::warn!("Retrying image fetch {} ({}/{}): {}", url, attempt, self.retries, e);
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => {
                    log::error!("Image failed to load after {} retries: {}", self.retries, url);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
    }

    impl ImageFetcher for Flaky {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ComposeError::AssetLoad {
                    url: url.to_string(),
                    reason: "flaky".to_string(),
                })
            } else {
                Ok(vec![1, 2, 3])
            }
        }
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let fetcher = RetryingFetcher::with_policy(
            Flaky {
                failures: 2,
                calls: AtomicUsize::new(0),
            },
            3,
            Duration::from_millis(1),
        );
        assert_eq!(fetcher.fetch("a.png").await.unwrap(), vec![1, 2, 3]);
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let fetcher = RetryingFetcher::with_policy(
            Flaky {
                failures: 10,
                calls: AtomicUsize::new(0),
            },
            2,
            Duration::from_millis(1),
        );
        assert!(fetcher.fetch("a.png").await.is_err());
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_file_fetcher_missing_file() {
        let fetcher = FileFetcher::with_root("/nonexistent-root");
        let err = fetcher.fetch("file://missing.png").await.unwrap_err();
        assert!(matches!(err, ComposeError::AssetLoad { .. }));
    }

    #[test]
    fn test_file_fetcher_resolves_relative_to_root() {
        let fetcher = FileFetcher::with_root("/assets");
        assert_eq!(fetcher.resolve("a/b.png").unwrap(), PathBuf::from("/assets/a/b.png"));
        assert_eq!(fetcher.resolve("file:///abs.png").unwrap(), PathBuf::from("/abs.png"));
        assert!(fetcher.resolve("https://example.com/a.png").is_err());
    }
}
