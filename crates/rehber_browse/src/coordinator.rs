//! Search coordination over the catalog view.
//!
//! Owns the debounce schedule, decides when a query has to force a
//! full fragment load before its answer can be trusted, rebuilds the
//! engine whenever the row set changes and routes the keyboard
//! shortcuts. The coordinator never reads a clock and never touches a
//! UI: callers pass `Instant`s in and translate [`KeyOutcome`]s back
//! into their surface.

use std::sync::Arc;
use std::time::{Duration, Instant};

use url::Url;

use rehber_catalog::fold::fold;
use rehber_loader::{CategoryLoader, LoaderEvent};
use rehber_search::{build_engine, EngineOptions, RowView, SearchEngine, SearchStatus};
use rehber_shared::diagnostics;

use crate::view::CatalogView;

const LONG_DELAY: Duration = Duration::from_millis(250);
const MEDIUM_DELAY: Duration = Duration::from_millis(120);
const SHORT_DELAY: Duration = Duration::from_millis(80);

/// Debounce tier for a query, measured over its folded length. Short
/// fragments are usually the start of fast typing and get the long
/// delay; once a query reaches eight folded characters the user is
/// close to done and the delay drops.
pub fn debounce_delay(query: &str) -> Duration {
    let len = fold(query).trim().chars().count();
    if len >= 8 {
        SHORT_DELAY
    } else if len >= 4 {
        MEDIUM_DELAY
    } else {
        LONG_DELAY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Enter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn meta(key: Key) -> Self {
        Self {
            meta: true,
            ..Self::plain(key)
        }
    }
}

/// What the caller should do with a routed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Focus the search field and select its contents.
    FocusSearch,
    /// The query was cleared and re-run; empty the input widget too.
    Cleared,
    /// Open the first visible link.
    Activate { name: String, url: String },
    Ignored,
}

/// The `q` parameter of a shared URL, when present and non-blank.
pub fn query_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == "q")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
}

pub struct SearchCoordinator {
    view: CatalogView,
    loader: Option<Arc<CategoryLoader>>,
    engine: Option<Box<dyn SearchEngine>>,
    options: EngineOptions,
    query: String,
    deadline: Option<Instant>,
    /// A coordinator-requested full load has not reported `AllLoaded`
    /// yet; per-fragment rebuilds are skipped until it does.
    batch_pending: bool,
    rebuilds: u64,
}

impl SearchCoordinator {
    pub fn new(
        view: CatalogView,
        loader: Option<Arc<CategoryLoader>>,
        options: EngineOptions,
    ) -> Self {
        let mut coordinator = Self {
            view,
            loader,
            engine: None,
            options,
            query: String::new(),
            deadline: None,
            batch_pending: false,
            rebuilds: 0,
        };
        coordinator.build_engine_over_rows();
        coordinator
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> SearchStatus {
        self.view.status()
    }

    /// How many engine generations this coordinator has built. One
    /// full lazy load contributes exactly one.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Records a keystroke-level change and returns the deadline the
    /// caller should arm a timer for. A newer change supersedes any
    /// armed deadline.
    pub fn input_changed(&mut self, value: &str, now: Instant) -> Instant {
        self.query = value.to_string();
        let deadline = now + debounce_delay(value);
        self.deadline = Some(deadline);
        deadline
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Runs the pending debounced query once its deadline has passed.
    /// Returns whether anything fired.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                let value = self.query.clone();
                if !self.maybe_load_all(&value) {
                    self.run_query(&value);
                }
                true
            }
            _ => false,
        }
    }

    /// Runs a query now, cancelling any pending debounce.
    pub fn run_immediate(&mut self, value: &str) {
        self.query = value.to_string();
        self.deadline = None;
        if !self.maybe_load_all(value) {
            self.run_query(value);
        }
    }

    /// Forces every fragment to load. The rebuild happens once, when
    /// the batch reports completion.
    pub fn request_full_load(&mut self) {
        let Some(loader) = self.loader.as_ref() else {
            return;
        };
        if loader.all_loaded() {
            return;
        }
        self.batch_pending = true;
        loader.request_all();
    }

    /// Merges loader progress into the view and keeps the engine in
    /// step with the row set.
    pub fn handle_event(&mut self, event: LoaderEvent) {
        match event {
            LoaderEvent::Hydrated { index, category } => {
                self.view.hydrate_category(index, &category);
                if self.full_load_pending() {
                    // the stale snapshot must not answer anything; one
                    // rebuild follows when the batch completes
                    self.engine = None;
                } else {
                    self.rebuild_and_rerun();
                }
            }
            LoaderEvent::FragmentFailed { index, .. } => {
                self.view.mark_category_failed(index);
            }
            LoaderEvent::AllLoaded => {
                self.batch_pending = false;
                self.rebuild_and_rerun();
            }
        }
    }

    /// Applies worker replies that have arrived since the last call.
    pub fn pump(&mut self) -> usize {
        match self.engine.as_mut() {
            Some(engine) => engine.pump(&mut self.view),
            None => 0,
        }
    }

    /// Blocks until every issued query has been answered and applied.
    pub fn settle(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.settle(&mut self.view);
        }
    }

    /// Global shortcut routing. `in_editable` reports whether focus is
    /// currently in an editable control, which suppresses the bare
    /// `/` and `.` shortcuts.
    pub fn route_global_key(&self, key: KeyEvent, in_editable: bool) -> KeyOutcome {
        match key.key {
            Key::Char(c)
                if c.eq_ignore_ascii_case(&'k') && (key.ctrl || key.meta) && !key.alt && !key.shift =>
            {
                KeyOutcome::FocusSearch
            }
            Key::Char(c) if c.eq_ignore_ascii_case(&'e') && key.ctrl && !key.alt && !key.shift => {
                KeyOutcome::FocusSearch
            }
            Key::Char('/') | Key::Char('.')
                if !(key.ctrl || key.meta || key.alt || key.shift) =>
            {
                if in_editable {
                    KeyOutcome::Ignored
                } else {
                    KeyOutcome::FocusSearch
                }
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Keys pressed inside the search field itself.
    pub fn route_search_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.key {
            Key::Escape => {
                if self.query.is_empty() {
                    KeyOutcome::Ignored
                } else {
                    self.run_immediate("");
                    KeyOutcome::Cleared
                }
            }
            Key::Enter => {
                if self.query.trim().is_empty() {
                    return KeyOutcome::Ignored;
                }
                match self.view.first_visible_link() {
                    Some(row) => KeyOutcome::Activate {
                        name: row.name.clone(),
                        url: row.url.clone(),
                    },
                    None => KeyOutcome::Ignored,
                }
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Canonical shareable URL: `q` reflects the trimmed active query,
    /// every other parameter passes through untouched. Replacing the
    /// address (rather than pushing history) is the caller's side.
    pub fn share_url(&self, base: &Url) -> Url {
        let query = self.query.trim().to_string();
        let others: Vec<(String, String)> = base
            .query_pairs()
            .filter(|(name, _)| name != "q")
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        let mut url = base.clone();
        url.set_query(None);
        if !others.is_empty() || !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &others {
                pairs.append_pair(name, value);
            }
            if !query.is_empty() {
                pairs.append_pair("q", &query);
            }
        }
        url
    }

    /// Non-empty query over a partially loaded catalog: trusting a
    /// "no results" answer would be wrong, so force the full load and
    /// report loading instead of searching.
    fn maybe_load_all(&mut self, value: &str) -> bool {
        if value.trim().is_empty() {
            return false;
        }
        let Some(loader) = self.loader.as_ref() else {
            return false;
        };
        if loader.all_loaded() {
            return false;
        }
        diagnostics::log("[search] query over a partial catalog, requesting remaining fragments");
        self.view.set_status(SearchStatus::Loading);
        self.batch_pending = true;
        loader.request_all();
        true
    }

    fn full_load_pending(&self) -> bool {
        self.batch_pending
            || self
                .loader
                .as_ref()
                .is_some_and(|loader| loader.load_all_in_flight())
    }

    fn run_query(&mut self, value: &str) {
        if self.engine.is_none() {
            self.build_engine_over_rows();
        }
        match self.engine.as_mut() {
            Some(engine) => engine.run(&mut self.view, value),
            None => {
                // no rows to search yet
                let status = if value.trim().is_empty() {
                    SearchStatus::Cleared
                } else {
                    SearchStatus::Loading
                };
                self.view.set_status(status);
            }
        }
    }

    fn rebuild_and_rerun(&mut self) {
        self.build_engine_over_rows();
        let value = self.query.clone();
        self.run_query(&value);
    }

    /// Drops the current engine (joining its worker) and constructs a
    /// fresh one over the current rows, if there are any.
    fn build_engine_over_rows(&mut self) {
        self.engine = None;
        let dataset = Arc::new(self.view.build_dataset());
        if dataset.is_empty() {
            return;
        }
        self.engine = Some(build_engine(dataset, &self.options));
        self.rebuilds += 1;
    }
}
