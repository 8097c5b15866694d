//! Lazy per-category fragment loading.
//!
//! Each fragment moves `Unfetched -> Loading -> Loaded | Failed`. A
//! fragment has at most one fetch in flight: concurrent requests share
//! the same future. `Failed` is terminal until an explicit later load
//! retries it; nothing retries on its own. Completion is reported over
//! an event channel so the browsing layer can hydrate its view and
//! rebuild the search snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use rehber_catalog::model::{parse_fragment, CatalogIndex, Category};
use rehber_shared::diagnostics;

use crate::error::{LoadError, LoadResult};
use crate::fetcher::Fetcher;

type SharedLoad = Shared<BoxFuture<'static, LoadResult<Arc<Category>>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentState {
    Unfetched,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone)]
pub enum LoaderEvent {
    /// A fragment arrived and should be merged into the view.
    Hydrated { index: usize, category: Category },
    FragmentFailed { index: usize, error: LoadError },
    /// A full load finished; one rebuild covers every fragment.
    AllLoaded,
}

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// How many leading categories to load eagerly at startup.
    pub warm_count: usize,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { warm_count: 2 }
    }
}

struct Slot {
    state: FragmentState,
    inflight: Option<SharedLoad>,
}

pub struct CategoryLoader {
    files: Vec<String>,
    file_to_index: HashMap<String, usize>,
    link_index: HashMap<String, String>,
    fetcher: Arc<dyn Fetcher>,
    events: UnboundedSender<LoaderEvent>,
    slots: Vec<Mutex<Slot>>,
    load_all: Mutex<Option<Shared<BoxFuture<'static, ()>>>>,
    options: LoaderOptions,
}

impl CategoryLoader {
    /// Builds the loader for an index payload. The returned receiver
    /// carries hydration and failure events; dropping it only mutes
    /// them.
    pub fn new(
        index: &CatalogIndex,
        fetcher: Arc<dyn Fetcher>,
        options: LoaderOptions,
    ) -> (Arc<Self>, UnboundedReceiver<LoaderEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let files: Vec<String> = index.categories.iter().map(|c| c.file.clone()).collect();
        let file_to_index = files
            .iter()
            .enumerate()
            .map(|(i, file)| (file.clone(), i))
            .collect();
        let slots = files
            .iter()
            .map(|_| {
                Mutex::new(Slot {
                    state: FragmentState::Unfetched,
                    inflight: None,
                })
            })
            .collect();
        let loader = Arc::new(Self {
            files,
            file_to_index,
            link_index: index.link_index.clone(),
            fetcher,
            events,
            slots,
            load_all: Mutex::new(None),
            options,
        });
        (loader, receiver)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn fragment_state(&self, index: usize) -> Option<FragmentState> {
        self.slots.get(index).map(|slot| slot.lock().state)
    }

    /// Every fragment has reached a terminal state. `Failed` counts as
    /// settled: a permanently missing fragment must not keep queries
    /// parked on the loading status forever.
    pub fn all_loaded(&self) -> bool {
        self.slots.iter().all(|slot| {
            matches!(
                slot.lock().state,
                FragmentState::Loaded | FragmentState::Failed
            )
        })
    }

    /// Kicks off the startup loads: the first `warm_count` categories
    /// plus every fragment that holds a favorite, resolved through the
    /// index's name-to-file map.
    pub fn start<'a>(self: &Arc<Self>, favorite_names: impl IntoIterator<Item = &'a str>) {
        let warm = self.options.warm_count.min(self.files.len());
        for index in 0..warm {
            self.request(index);
        }
        for name in favorite_names {
            if let Some(file) = self.link_index.get(name) {
                if let Some(&index) = self.file_to_index.get(file) {
                    self.request(index);
                }
            }
        }
    }

    /// Soft priority hint (a category scrolled near the viewport, a
    /// navigation target). Just requests the load.
    pub fn hint_visible(self: &Arc<Self>, index: usize) {
        self.request(index);
    }

    /// Fire-and-forget load request.
    pub fn request(self: &Arc<Self>, index: usize) {
        let _ = self.ensure_load(index);
    }

    /// Awaits the fragment, joining an in-flight fetch when one exists.
    pub async fn load(self: &Arc<Self>, index: usize) -> LoadResult<Arc<Category>> {
        match self.ensure_load(index) {
            Some(shared) => shared.await,
            None => Err(LoadError::UnknownFragment(format!(
                "no category at index {}",
                index
            ))),
        }
    }

    /// Loads every fragment and waits for the batch, coalesced behind
    /// one cached future; a single `AllLoaded` fires when done.
    /// Individual failures do not block completion, they surface as
    /// `FragmentFailed` events.
    pub async fn load_all(self: &Arc<Self>) {
        self.ensure_load_all().await;
    }

    /// Kicks a full load without waiting on it.
    pub fn request_all(self: &Arc<Self>) {
        let _ = self.ensure_load_all();
    }

    fn ensure_load_all(self: &Arc<Self>) -> Shared<BoxFuture<'static, ()>> {
        let mut guard = self.load_all.lock();
        if let Some(existing) = guard.as_ref() {
            return existing.clone();
        }
        let loader = Arc::clone(self);
        let fut: BoxFuture<'static, ()> = Box::pin(async move {
            let loads: Vec<SharedLoad> = (0..loader.len())
                .filter_map(|index| loader.ensure_load(index))
                .collect();
            let _ = futures::future::join_all(loads).await;
            let _ = loader.events.send(LoaderEvent::AllLoaded);
        });
        let shared = fut.shared();
        *guard = Some(shared.clone());
        tokio::spawn(shared.clone());
        shared
    }

    /// A full load has been requested and has not finished yet.
    pub fn load_all_in_flight(&self) -> bool {
        self.load_all
            .lock()
            .as_ref()
            .is_some_and(|shared| shared.peek().is_none())
    }

    fn ensure_load(self: &Arc<Self>, index: usize) -> Option<SharedLoad> {
        let file = self.files.get(index)?.clone();
        let mut slot = self.slots.get(index)?.lock();
        match slot.state {
            FragmentState::Loading | FragmentState::Loaded => return slot.inflight.clone(),
            FragmentState::Unfetched | FragmentState::Failed => {}
        }
        slot.state = FragmentState::Loading;
        let loader = Arc::clone(self);
        let fut: BoxFuture<'static, LoadResult<Arc<Category>>> = Box::pin(async move {
            let outcome = loader.fetch_fragment(&file).await;
            loader.finish(index, &outcome);
            outcome
        });
        let shared = fut.shared();
        slot.inflight = Some(shared.clone());
        drop(slot);
        tokio::spawn(shared.clone());
        Some(shared)
    }

    async fn fetch_fragment(&self, file: &str) -> LoadResult<Arc<Category>> {
        let bytes = self.fetcher.fetch(file).await.map_err(LoadError::from)?;
        let category = parse_fragment(&bytes).map_err(LoadError::from)?;
        Ok(Arc::new(category))
    }

    fn finish(&self, index: usize, outcome: &LoadResult<Arc<Category>>) {
        let Some(slot) = self.slots.get(index) else {
            return;
        };
        match outcome {
            Ok(category) => {
                slot.lock().state = FragmentState::Loaded;
                let _ = self.events.send(LoaderEvent::Hydrated {
                    index,
                    category: (**category).clone(),
                });
            }
            Err(error) => {
                slot.lock().state = FragmentState::Failed;
                diagnostics::error(format!(
                    "[loader] fragment {} failed: {}",
                    self.files.get(index).map(String::as_str).unwrap_or("?"),
                    error
                ));
                let _ = self.events.send(LoaderEvent::FragmentFailed {
                    index,
                    error: error.clone(),
                });
            }
        }
    }
}
