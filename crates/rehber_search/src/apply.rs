//! Applies a match set to the rendered rows.
//!
//! The applier owns the visibility bookkeeping: which rows are shown
//! and how many visible links each category and subcategory still has.
//! The renderer is only reached through [`RowView`], so the same
//! applier drives any row surface.

use std::collections::HashSet;
use std::sync::Arc;

use rehber_catalog::HighlightMeta;

use crate::dataset::SearchDataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// No active query; the status line is blank.
    Cleared,
    Results(usize),
    NoResults,
    /// Results pending a forced full load.
    Loading,
}

pub trait RowView {
    fn set_row_hidden(&mut self, index: usize, hidden: bool);
    fn set_row_highlight(&mut self, index: usize, meta: Option<&HighlightMeta>);
    fn set_category_hidden(&mut self, category: usize, hidden: bool);
    fn set_subcategory_hidden(&mut self, subcategory: usize, hidden: bool);
    fn set_status(&mut self, status: SearchStatus);
}

pub struct MatchApplier {
    dataset: Arc<SearchDataset>,
    visible: HashSet<usize>,
    cat_counts: Vec<i32>,
    sub_counts: Vec<i32>,
}

impl MatchApplier {
    /// Starts from the freshly rendered state: every row visible, every
    /// container counting its links. Label rows never enter the counts.
    pub fn new(dataset: Arc<SearchDataset>) -> Self {
        let visible: HashSet<usize> = dataset.rows().iter().map(|row| row.index).collect();
        let mut cat_counts = vec![0; dataset.category_count()];
        let mut sub_counts = vec![0; dataset.subcategory_count()];
        for row in dataset.rows() {
            if !row.is_link {
                continue;
            }
            cat_counts[row.category] += 1;
            if let Some(sub) = row.subcategory {
                sub_counts[sub] += 1;
            }
        }
        Self {
            dataset,
            visible,
            cat_counts,
            sub_counts,
        }
    }

    /// Hides everything outside the match set, then shows the matches.
    /// Hiding runs first so container counts stay non-negative. Every
    /// matched link counts toward the result total, already-visible or
    /// not.
    pub fn apply(&mut self, view: &mut dyn RowView, meta: &HighlightMeta, matches: &[usize]) {
        let mut match_set: HashSet<usize> = matches.iter().copied().collect();

        let to_hide: Vec<usize> = self
            .visible
            .iter()
            .copied()
            .filter(|idx| !match_set.contains(idx))
            .collect();
        for idx in to_hide {
            self.hide_index(view, idx);
        }

        let mut match_count = 0;
        for &idx in matches {
            // process each match once, in reported order
            if !match_set.remove(&idx) {
                continue;
            }
            if self.show_index(view, idx, meta) {
                match_count += 1;
            }
        }

        if meta.has_query() {
            view.set_status(if match_count > 0 {
                SearchStatus::Results(match_count)
            } else {
                SearchStatus::NoResults
            });
        } else {
            view.set_status(SearchStatus::Cleared);
        }
    }

    fn hide_index(&mut self, view: &mut dyn RowView, idx: usize) {
        let Some(row) = self.dataset.rows().get(idx) else {
            return;
        };
        if self.visible.remove(&idx) {
            view.set_row_hidden(idx, true);
            view.set_row_highlight(idx, None);
            if row.is_link {
                self.cat_counts[row.category] -= 1;
                view.set_category_hidden(row.category, self.cat_counts[row.category] <= 0);
                if let Some(sub) = row.subcategory {
                    self.sub_counts[sub] -= 1;
                    view.set_subcategory_hidden(sub, self.sub_counts[sub] <= 0);
                }
            }
        }
    }

    fn show_index(&mut self, view: &mut dyn RowView, idx: usize, meta: &HighlightMeta) -> bool {
        let Some(row) = self.dataset.rows().get(idx) else {
            return false;
        };
        if self.visible.insert(idx) {
            view.set_row_hidden(idx, false);
            if row.is_link {
                self.cat_counts[row.category] += 1;
                view.set_category_hidden(row.category, self.cat_counts[row.category] <= 0);
                if let Some(sub) = row.subcategory {
                    self.sub_counts[sub] += 1;
                    view.set_subcategory_hidden(sub, self.sub_counts[sub] <= 0);
                }
            }
        }
        view.set_row_highlight(idx, Some(meta));
        row.is_link
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn category_visible_links(&self, category: usize) -> i32 {
        self.cat_counts.get(category).copied().unwrap_or(0)
    }

    pub fn subcategory_visible_links(&self, subcategory: usize) -> i32 {
        self.sub_counts.get(subcategory).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::SearchRow;
    use crate::test_support::RecordingView;

    fn link(index: usize, folded: &str, category: usize, subcategory: Option<usize>) -> SearchRow {
        SearchRow {
            index,
            folded: folded.to_string(),
            is_link: true,
            category,
            subcategory,
        }
    }

    fn three_category_dataset() -> Arc<SearchDataset> {
        // cat 0: steam + epic; cat 1 (one sub): gitlab; cat 2: vlc
        let rows = vec![
            link(0, "steam oyun platformu", 0, None),
            link(1, "epic games oyun", 0, None),
            link(2, "gitlab kod deposu", 1, Some(0)),
            link(3, "vlc medya oynatici", 2, None),
        ];
        Arc::new(SearchDataset::new(rows, 3, 1))
    }

    #[test]
    fn single_match_hides_siblings_and_other_categories() {
        let dataset = three_category_dataset();
        let mut applier = MatchApplier::new(dataset);
        let mut view = RecordingView::default();

        applier.apply(&mut view, &HighlightMeta::new("steam"), &[0]);

        assert_eq!(view.hidden_rows, HashSet::from([1, 2, 3]));
        assert_eq!(view.hidden_categories, HashSet::from([1, 2]));
        assert_eq!(view.hidden_subcategories, HashSet::from([0]));
        assert_eq!(view.status, Some(SearchStatus::Results(1)));
        assert!(view.highlighted_rows.contains(&0));
    }

    #[test]
    fn clearing_the_query_restores_everything() {
        let dataset = three_category_dataset();
        let mut applier = MatchApplier::new(dataset.clone());
        let mut view = RecordingView::default();

        applier.apply(&mut view, &HighlightMeta::new("steam"), &[0]);
        applier.apply(&mut view, &HighlightMeta::new(""), &dataset.all_indices());

        assert!(view.hidden_rows.is_empty());
        assert!(view.hidden_categories.is_empty());
        assert!(view.hidden_subcategories.is_empty());
        assert_eq!(view.status, Some(SearchStatus::Cleared));
        assert!(view.highlighted_rows.is_empty());
    }

    #[test]
    fn counts_stay_non_negative_across_repeated_applies() {
        let dataset = three_category_dataset();
        let mut applier = MatchApplier::new(dataset);
        let mut view = RecordingView::default();

        for _ in 0..3 {
            applier.apply(&mut view, &HighlightMeta::new("yok-boyle-bir-sey"), &[]);
        }
        for category in 0..3 {
            assert_eq!(applier.category_visible_links(category), 0);
        }
        assert_eq!(applier.subcategory_visible_links(0), 0);
        assert_eq!(view.status, Some(SearchStatus::NoResults));

        applier.apply(&mut view, &HighlightMeta::new("oyun"), &[0, 1]);
        assert_eq!(applier.category_visible_links(0), 2);
        assert_eq!(view.status, Some(SearchStatus::Results(2)));
    }

    #[test]
    fn matched_links_count_even_when_already_visible() {
        let dataset = three_category_dataset();
        let mut applier = MatchApplier::new(dataset.clone());
        let mut view = RecordingView::default();

        // everything starts visible; a full match set must still report 4
        applier.apply(&mut view, &HighlightMeta::new("a"), &dataset.all_indices());
        assert_eq!(view.status, Some(SearchStatus::Results(4)));
    }

    #[test]
    fn duplicate_match_indices_are_counted_once() {
        let dataset = three_category_dataset();
        let mut applier = MatchApplier::new(dataset);
        let mut view = RecordingView::default();

        applier.apply(&mut view, &HighlightMeta::new("steam"), &[0, 0, 0]);
        assert_eq!(view.status, Some(SearchStatus::Results(1)));
    }

    #[test]
    fn label_rows_are_hidden_but_never_counted() {
        let rows = vec![
            SearchRow {
                index: 0,
                folded: "oneriler".to_string(),
                is_link: false,
                category: 0,
                subcategory: None,
            },
            link(1, "steam oyun", 0, None),
        ];
        let dataset = Arc::new(SearchDataset::new(rows, 1, 0));
        let mut applier = MatchApplier::new(dataset);
        let mut view = RecordingView::default();

        // only the label matches: category goes hidden, zero results
        applier.apply(&mut view, &HighlightMeta::new("oneriler"), &[0]);
        assert_eq!(view.status, Some(SearchStatus::NoResults));
        assert!(view.hidden_categories.contains(&0));
        assert!(!view.hidden_rows.contains(&0));
    }
}
