//! Payload transport behind a trait so the loader never cares whether
//! bytes come from HTTP, a local directory, or a test fixture.

use std::collections::HashMap;
use std::path::PathBuf;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use reqwest::Client;
use url::Url;

use rehber_catalog::model::{parse_payload, CatalogData, CatalogPayload};
use rehber_shared::diagnostics;

use crate::error::{FetchError, FetchResult, LoadError, LoadResult};

pub const LINKS_INDEX_PATH: &str = "data/links-index.json";
pub const LINKS_FALLBACK_PATH: &str = "links.json";

pub trait Fetcher: Send + Sync {
    fn fetch(&self, path: &str) -> BoxFuture<'_, FetchResult<Vec<u8>>>;
}

pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: Url) -> Self {
        Self {
            client: Client::new(),
            base,
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, path: &str) -> BoxFuture<'_, FetchResult<Vec<u8>>> {
        let url = self.base.join(path);
        Box::pin(async move {
            let url = url.map_err(|err| FetchError::BadUrl(err.to_string()))?;
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|err| FetchError::Request(err.to_string()))?;
            if !response.status().is_success() {
                return Err(FetchError::Status(format!(
                    "{} returned {}",
                    url,
                    response.status().as_u16()
                )));
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|err| FetchError::Request(err.to_string()))?;
            Ok(bytes.to_vec())
        })
    }
}

/// Serves payloads from a local directory, mirroring the relative
/// paths the index uses.
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Fetcher for DirFetcher {
    fn fetch(&self, path: &str) -> BoxFuture<'_, FetchResult<Vec<u8>>> {
        let full = self.root.join(path);
        Box::pin(async move {
            let bytes = tokio::fs::read(&full).await?;
            Ok(bytes)
        })
    }
}

/// In-memory fetcher with per-path call counting and failure
/// injection; the loader tests are built on it.
#[derive(Default)]
pub struct MemoryFetcher {
    entries: Mutex<HashMap<String, FetchResult<Vec<u8>>>>,
    counts: Mutex<HashMap<String, usize>>,
    delay: Option<std::time::Duration>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps first, so tests can overlap requests.
    pub fn with_delay(delay: std::time::Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn insert(&self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.entries
            .lock()
            .insert(path.to_string(), Ok(bytes.into()));
    }

    pub fn insert_json(&self, path: &str, value: &serde_json::Value) {
        self.insert(path, value.to_string().into_bytes());
    }

    pub fn insert_failure(&self, path: &str, error: FetchError) {
        self.entries.lock().insert(path.to_string(), Err(error));
    }

    pub fn remove(&self, path: &str) {
        self.entries.lock().remove(path);
    }

    pub fn count(&self, path: &str) -> usize {
        self.counts.lock().get(path).copied().unwrap_or(0)
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, path: &str) -> BoxFuture<'_, FetchResult<Vec<u8>>> {
        let path = path.to_string();
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            *self.counts.lock().entry(path.clone()).or_insert(0) += 1;
            match self.entries.lock().get(&path) {
                Some(result) => result.clone(),
                None => Err(FetchError::Status(format!("{} returned 404", path))),
            }
        })
    }
}

/// Fetches the catalog entry point: the lazy index first, then the
/// legacy inline payload when the index is missing, unparseable or not
/// actually index-shaped.
pub async fn fetch_catalog(fetcher: &dyn Fetcher) -> LoadResult<CatalogPayload> {
    match fetcher.fetch(LINKS_INDEX_PATH).await {
        Ok(bytes) => match parse_payload(&bytes) {
            Ok(CatalogPayload::Index(index)) => return Ok(CatalogPayload::Index(index)),
            Ok(CatalogPayload::Full(_)) => {
                diagnostics::log("[loader] index payload has no fragment files, trying legacy");
            }
            Err(err) => {
                diagnostics::log(format!("[loader] index parse failed: {}", err));
            }
        },
        Err(err) => {
            diagnostics::log(format!("[loader] index fetch failed: {}", err));
        }
    }

    let bytes = fetcher
        .fetch(LINKS_FALLBACK_PATH)
        .await
        .map_err(LoadError::from)?;
    let data: CatalogData = serde_json::from_slice(&bytes)?;
    Ok(CatalogPayload::Full(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn index_json() -> serde_json::Value {
        json!({
            "categories": [{"title": "Oyun", "file": "data/oyun.json"}],
            "linkIndex": {"Steam": "data/oyun.json"}
        })
    }

    fn full_json() -> serde_json::Value {
        json!({
            "categories": [{
                "title": "Oyun",
                "links": [{"name": "Steam", "url": "https://store.steampowered.com"}]
            }]
        })
    }

    #[tokio::test]
    async fn prefers_the_index_payload() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert_json(LINKS_INDEX_PATH, &index_json());
        match fetch_catalog(&fetcher).await.unwrap() {
            CatalogPayload::Index(index) => assert_eq!(index.categories[0].title, "Oyun"),
            CatalogPayload::Full(_) => panic!("expected index"),
        }
        assert_eq!(fetcher.count(LINKS_FALLBACK_PATH), 0);
    }

    #[tokio::test]
    async fn falls_back_to_legacy_payload() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert_json(LINKS_FALLBACK_PATH, &full_json());
        match fetch_catalog(&fetcher).await.unwrap() {
            CatalogPayload::Full(data) => assert_eq!(data.categories.len(), 1),
            CatalogPayload::Index(_) => panic!("expected full payload"),
        }
    }

    #[tokio::test]
    async fn index_without_files_falls_back_too() {
        let fetcher = MemoryFetcher::new();
        // categories lack `file`, so this fails the index shape probe
        fetcher.insert_json(LINKS_INDEX_PATH, &full_json());
        fetcher.insert_json(LINKS_FALLBACK_PATH, &full_json());
        match fetch_catalog(&fetcher).await.unwrap() {
            CatalogPayload::Full(_) => {}
            CatalogPayload::Index(_) => panic!("expected fallback to full payload"),
        }
    }

    #[tokio::test]
    async fn both_paths_missing_is_a_fetch_error() {
        let fetcher = MemoryFetcher::new();
        let err = fetch_catalog(&fetcher).await.unwrap_err();
        assert!(matches!(err, LoadError::Fetch(_)));
    }

    #[tokio::test]
    async fn dir_fetcher_reads_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        std::fs::write(
            dir.path().join("data/links-index.json"),
            index_json().to_string(),
        )
        .unwrap();

        let fetcher = DirFetcher::new(dir.path());
        let bytes = fetcher.fetch(LINKS_INDEX_PATH).await.unwrap();
        assert!(!bytes.is_empty());
        assert!(fetcher.fetch("data/yok.json").await.is_err());
    }
}
