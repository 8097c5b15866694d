//! Immutable search snapshot over the rendered rows.
//!
//! Rows are indexed in display order; container ids are dense so the
//! applier can keep its counts in plain vectors. A snapshot is rebuilt
//! from scratch whenever the rendered row set changes and handed to a
//! fresh engine; it is never mutated in place.

use rehber_catalog::fold::matches_tokens;

#[derive(Debug, Clone)]
pub struct SearchRow {
    pub index: usize,
    pub folded: String,
    pub is_link: bool,
    pub category: usize,
    pub subcategory: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct SearchDataset {
    rows: Vec<SearchRow>,
    category_count: usize,
    subcategory_count: usize,
}

impl SearchDataset {
    pub fn new(rows: Vec<SearchRow>, category_count: usize, subcategory_count: usize) -> Self {
        debug_assert!(rows.iter().enumerate().all(|(i, row)| row.index == i));
        Self {
            rows,
            category_count,
            subcategory_count,
        }
    }

    pub fn rows(&self) -> &[SearchRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn category_count(&self) -> usize {
        self.category_count
    }

    pub fn subcategory_count(&self) -> usize {
        self.subcategory_count
    }

    /// Every row index, in display order.
    pub fn all_indices(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.index).collect()
    }

    /// AND-substring matching over folded row text. An empty token list
    /// matches everything.
    pub fn matching_indices(&self, tokens: &[String]) -> Vec<usize> {
        if tokens.is_empty() {
            return self.all_indices();
        }
        self.rows
            .iter()
            .filter(|row| matches_tokens(&row.folded, tokens))
            .map(|row| row.index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehber_catalog::fold::tokenize;

    fn dataset() -> SearchDataset {
        let rows = vec![
            SearchRow {
                index: 0,
                folded: "steam oyun platformu".to_string(),
                is_link: true,
                category: 0,
                subcategory: None,
            },
            SearchRow {
                index: 1,
                folded: "gitlab ucretsiz host".to_string(),
                is_link: true,
                category: 1,
                subcategory: Some(0),
            },
            SearchRow {
                index: 2,
                folded: "github kod deposu".to_string(),
                is_link: true,
                category: 1,
                subcategory: Some(0),
            },
        ];
        SearchDataset::new(rows, 2, 1)
    }

    #[test]
    fn empty_tokens_match_every_row() {
        let dataset = dataset();
        assert_eq!(dataset.matching_indices(&[]), vec![0, 1, 2]);
        assert_eq!(dataset.matching_indices(&tokenize("   ")), vec![0, 1, 2]);
    }

    #[test]
    fn tokens_are_conjunctive_across_any_order() {
        let dataset = dataset();
        assert_eq!(dataset.matching_indices(&tokenize("gitlab host")), vec![1]);
        assert_eq!(dataset.matching_indices(&tokenize("host gitlab")), vec![1]);
        assert_eq!(dataset.matching_indices(&tokenize("git")), vec![1, 2]);
        assert!(dataset.matching_indices(&tokenize("steam host")).is_empty());
    }
}
