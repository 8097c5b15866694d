use std::collections::HashSet;

use rehber_catalog::HighlightMeta;

use crate::apply::{RowView, SearchStatus};

/// Records every view mutation so tests can assert on the final state.
#[derive(Debug, Default)]
pub(crate) struct RecordingView {
    pub hidden_rows: HashSet<usize>,
    pub hidden_categories: HashSet<usize>,
    pub hidden_subcategories: HashSet<usize>,
    pub highlighted_rows: HashSet<usize>,
    pub status: Option<SearchStatus>,
}

impl RowView for RecordingView {
    fn set_row_hidden(&mut self, index: usize, hidden: bool) {
        if hidden {
            self.hidden_rows.insert(index);
        } else {
            self.hidden_rows.remove(&index);
        }
    }

    fn set_row_highlight(&mut self, index: usize, meta: Option<&HighlightMeta>) {
        match meta {
            Some(meta) if meta.has_query() => self.highlighted_rows.insert(index),
            _ => self.highlighted_rows.remove(&index),
        };
    }

    fn set_category_hidden(&mut self, category: usize, hidden: bool) {
        if hidden {
            self.hidden_categories.insert(category);
        } else {
            self.hidden_categories.remove(&category);
        }
    }

    fn set_subcategory_hidden(&mut self, subcategory: usize, hidden: bool) {
        if hidden {
            self.hidden_subcategories.insert(subcategory);
        } else {
            self.hidden_subcategories.remove(&subcategory);
        }
    }

    fn set_status(&mut self, status: SearchStatus) {
        self.status = Some(status);
    }
}
