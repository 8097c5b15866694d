//! Engine strategies behind one trait.
//!
//! Both engines consume a dataset snapshot at construction and are
//! replaced (dropped) whenever the snapshot is rebuilt; dropping the
//! offloaded engine shuts its worker thread down.

use std::sync::Arc;

use rehber_catalog::fold::tokenize;
use rehber_catalog::HighlightMeta;
use rehber_shared::diagnostics;

use crate::apply::{MatchApplier, RowView};
use crate::dataset::SearchDataset;
use crate::worker::OffloadedEngine;

pub trait SearchEngine: Send {
    /// Runs a query against the snapshot. Zero-token queries apply
    /// synchronously on every engine.
    fn run(&mut self, view: &mut dyn RowView, query: &str);

    /// Applies worker replies that have arrived since the last call.
    /// Returns how many were applied; in-process engines have none.
    fn pump(&mut self, view: &mut dyn RowView) -> usize {
        let _ = view;
        0
    }

    /// Blocks until every issued query has been answered and applied
    /// (or the worker went away).
    fn settle(&mut self, view: &mut dyn RowView) {
        let _ = view;
    }
}

pub struct InProcessEngine {
    dataset: Arc<SearchDataset>,
    applier: MatchApplier,
}

impl InProcessEngine {
    pub fn new(dataset: Arc<SearchDataset>) -> Self {
        let applier = MatchApplier::new(dataset.clone());
        Self { dataset, applier }
    }
}

impl SearchEngine for InProcessEngine {
    fn run(&mut self, view: &mut dyn RowView, query: &str) {
        let meta = HighlightMeta::new(query);
        let tokens = tokenize(query);
        let matches = self.dataset.matching_indices(&tokens);
        self.applier.apply(view, &meta, &matches);
    }
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Prefer the worker-thread engine; falls back in-process when the
    /// thread cannot be spawned.
    pub offload: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { offload: true }
    }
}

pub fn build_engine(dataset: Arc<SearchDataset>, options: &EngineOptions) -> Box<dyn SearchEngine> {
    if options.offload {
        match OffloadedEngine::spawn(dataset.clone()) {
            Ok(engine) => return Box::new(engine),
            Err(err) => {
                diagnostics::error(format!(
                    "[search] worker unavailable, falling back to in-process engine: {}",
                    err
                ));
            }
        }
    }
    Box::new(InProcessEngine::new(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::SearchStatus;
    use crate::dataset::SearchRow;
    use crate::test_support::RecordingView;

    fn snapshot() -> Arc<SearchDataset> {
        let rows = vec![
            SearchRow {
                index: 0,
                folded: "steam oyun platformu onerilen oyun".to_string(),
                is_link: true,
                category: 0,
                subcategory: None,
            },
            SearchRow {
                index: 1,
                folded: "gitlab ucretsiz host barindirma".to_string(),
                is_link: true,
                category: 1,
                subcategory: None,
            },
        ];
        Arc::new(SearchDataset::new(rows, 2, 0))
    }

    #[test]
    fn in_process_engine_applies_synchronously() {
        let mut engine = InProcessEngine::new(snapshot());
        let mut view = RecordingView::default();

        engine.run(&mut view, "gitlab hosting");
        assert_eq!(view.status, Some(SearchStatus::NoResults));

        engine.run(&mut view, "gitlab host");
        assert_eq!(view.status, Some(SearchStatus::Results(1)));
        assert_eq!(view.hidden_rows, std::collections::HashSet::from([0]));

        engine.run(&mut view, "");
        assert_eq!(view.status, Some(SearchStatus::Cleared));
        assert!(view.hidden_rows.is_empty());
    }

    #[test]
    fn factory_honors_the_offload_flag() {
        let mut engine = build_engine(snapshot(), &EngineOptions { offload: false });
        let mut view = RecordingView::default();
        engine.run(&mut view, "steam");
        // in-process: applied before run returns
        assert_eq!(view.status, Some(SearchStatus::Results(1)));
    }

    #[test]
    fn offloaded_factory_build_settles_to_same_answer() {
        let mut engine = build_engine(snapshot(), &EngineOptions::default());
        let mut view = RecordingView::default();
        engine.run(&mut view, "steam");
        engine.settle(&mut view);
        assert_eq!(view.status, Some(SearchStatus::Results(1)));
    }
}
