//! In-memory catalog view model.
//!
//! Replaces a rendered document as the source of truth: category and
//! subcategory cells plus link rows in display order, each carrying its
//! folded search text. The search applier drives visibility through
//! the `RowView` trait; rendering reads the same structure.

use rehber_catalog::domain::{domain_label, is_official_link, resolve_copy_value};
use rehber_catalog::fold::fold;
use rehber_catalog::model::{CatalogData, CatalogIndex, Category, Link};
use rehber_catalog::{Favorites, HighlightMeta, Messages};
use rehber_search::{RowView, SearchDataset, SearchRow, SearchStatus};

const RECOMMENDED_TOKENS: &str = "onerilen onerilenler";
const OTHER_TOKENS: &str = "diger digerleri";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryPhase {
    /// Placeholder from the index; content not fetched yet.
    Shell,
    Hydrated,
    Failed,
}

#[derive(Debug, Clone)]
pub struct CategoryCell {
    pub title: String,
    pub phase: CategoryPhase,
    pub hidden: bool,
}

#[derive(Debug, Clone)]
pub struct SubcategoryCell {
    pub title: String,
    pub category: usize,
    pub hidden: bool,
}

#[derive(Debug, Clone)]
pub struct RowCell {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub official: bool,
    pub recommended: bool,
    pub copy_value: Option<String>,
    pub folded: String,
    pub category: usize,
    pub subcategory: Option<usize>,
    pub hidden: bool,
    pub marked: bool,
}

#[derive(Debug)]
pub struct CatalogView {
    categories: Vec<CategoryCell>,
    content: Vec<Option<Category>>,
    subcategories: Vec<SubcategoryCell>,
    rows: Vec<RowCell>,
    status: SearchStatus,
    highlight: Option<HighlightMeta>,
}

impl CatalogView {
    /// Shell view for a lazy index: titles only, content pending.
    pub fn from_index(index: &CatalogIndex) -> Self {
        let categories = index
            .categories
            .iter()
            .map(|meta| CategoryCell {
                title: meta.title.clone(),
                phase: CategoryPhase::Shell,
                hidden: false,
            })
            .collect::<Vec<_>>();
        let content = vec![None; categories.len()];
        Self {
            categories,
            content,
            subcategories: Vec::new(),
            rows: Vec::new(),
            status: SearchStatus::Cleared,
            highlight: None,
        }
    }

    /// Fully hydrated view for a legacy inline payload.
    pub fn from_full(data: &CatalogData) -> Self {
        let categories = data
            .categories
            .iter()
            .map(|category| CategoryCell {
                title: category.title.clone(),
                phase: CategoryPhase::Hydrated,
                hidden: false,
            })
            .collect::<Vec<_>>();
        let content = data.categories.iter().cloned().map(Some).collect();
        let mut view = Self {
            categories,
            content,
            subcategories: Vec::new(),
            rows: Vec::new(),
            status: SearchStatus::Cleared,
            highlight: None,
        };
        view.rebuild_rows();
        view
    }

    /// Merges a fetched fragment and relays out the display rows.
    /// Visibility resets to all-shown; the caller rebuilds the engine
    /// and re-runs the active query right after.
    pub fn hydrate_category(&mut self, index: usize, category: &Category) {
        let Some(cell) = self.categories.get_mut(index) else {
            return;
        };
        cell.phase = CategoryPhase::Hydrated;
        if !category.title.is_empty() {
            cell.title = category.title.clone();
        }
        self.content[index] = Some(category.clone());
        self.rebuild_rows();
    }

    pub fn mark_category_failed(&mut self, index: usize) {
        if let Some(cell) = self.categories.get_mut(index) {
            if cell.phase != CategoryPhase::Hydrated {
                cell.phase = CategoryPhase::Failed;
            }
        }
    }

    pub fn category_phase(&self, index: usize) -> Option<CategoryPhase> {
        self.categories.get(index).map(|cell| cell.phase)
    }

    pub fn categories(&self) -> &[CategoryCell] {
        &self.categories
    }

    pub fn rows(&self) -> &[RowCell] {
        &self.rows
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn visible_row_count(&self) -> usize {
        self.rows.iter().filter(|row| !row.hidden).count()
    }

    /// First visible link in display order (the Enter target).
    pub fn first_visible_link(&self) -> Option<&RowCell> {
        self.rows.iter().find(|row| !row.hidden)
    }

    /// Fresh search snapshot over the current rows.
    pub fn build_dataset(&self) -> SearchDataset {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| SearchRow {
                index,
                folded: row.folded.clone(),
                is_link: true,
                category: row.category,
                subcategory: row.subcategory,
            })
            .collect();
        SearchDataset::new(rows, self.categories.len(), self.subcategories.len())
    }

    fn rebuild_rows(&mut self) {
        let mut subcategories = Vec::new();
        let mut rows = Vec::new();
        for (cat_idx, slot) in self.content.iter().enumerate() {
            let Some(category) = slot else {
                continue;
            };
            let cat_title = if category.title.is_empty() {
                self.categories[cat_idx].title.as_str()
            } else {
                category.title.as_str()
            };
            match (&category.subcategories, &category.links) {
                (Some(subs), _) if !subs.is_empty() => {
                    for sub in subs {
                        let sub_idx = subcategories.len();
                        subcategories.push(SubcategoryCell {
                            title: sub.title.clone(),
                            category: cat_idx,
                            hidden: false,
                        });
                        push_links(
                            &mut rows,
                            &sub.links,
                            cat_idx,
                            Some(sub_idx),
                            cat_title,
                            Some(&sub.title),
                        );
                    }
                }
                (_, Some(links)) => {
                    push_links(&mut rows, links, cat_idx, None, cat_title, None);
                }
                _ => {}
            }
        }
        for cell in &mut self.categories {
            cell.hidden = false;
        }
        self.subcategories = subcategories;
        self.rows = rows;
    }

    /// The status line, already localized.
    pub fn status_text(&self, messages: &Messages) -> String {
        match self.status {
            SearchStatus::Cleared => String::new(),
            SearchStatus::Results(count) => messages.results_found(count),
            SearchStatus::NoResults => messages.no_results().to_string(),
            SearchStatus::Loading => messages.loading_results().to_string(),
        }
    }

    /// Plain-text rendering of the visible tree.
    pub fn render(&self, messages: &Messages, favorites: Option<&Favorites>) -> String {
        let mut out = String::new();
        for (cat_idx, cell) in self.categories.iter().enumerate() {
            if cell.hidden {
                continue;
            }
            out.push_str(&cell.title);
            out.push('\n');
            match cell.phase {
                CategoryPhase::Shell => {
                    out.push_str("  ");
                    out.push_str(messages.category_loading());
                    out.push('\n');
                    continue;
                }
                CategoryPhase::Failed => {
                    out.push_str("  ");
                    out.push_str(messages.category_load_failed());
                    out.push('\n');
                    continue;
                }
                CategoryPhase::Hydrated => {}
            }
            for (sub_idx, sub) in self.subcategories.iter().enumerate() {
                if sub.category != cat_idx || sub.hidden {
                    continue;
                }
                out.push_str("  ");
                out.push_str(&sub.title);
                out.push('\n');
                self.render_rows(&mut out, messages, favorites, cat_idx, Some(sub_idx), "    ");
            }
            self.render_rows(&mut out, messages, favorites, cat_idx, None, "  ");
        }
        out
    }

    fn render_rows(
        &self,
        out: &mut String,
        messages: &Messages,
        favorites: Option<&Favorites>,
        category: usize,
        subcategory: Option<usize>,
        indent: &str,
    ) {
        for row in &self.rows {
            if row.category != category || row.subcategory != subcategory || row.hidden {
                continue;
            }
            out.push_str(indent);
            if favorites.is_some_and(|f| f.contains(&row.name)) {
                out.push_str("* ");
            } else {
                out.push_str("- ");
            }
            match (&self.highlight, row.marked) {
                (Some(meta), true) => out.push_str(&meta.emphasize(&row.name, "[", "]")),
                _ => out.push_str(&row.name),
            }
            let label = domain_label(&row.url);
            if !label.is_empty() {
                out.push_str("  (");
                out.push_str(&label);
                out.push(')');
            }
            if row.official {
                out.push_str("  [");
                out.push_str(messages.official_source());
                out.push(']');
            }
            out.push('\n');
        }
    }
}

impl RowView for CatalogView {
    fn set_row_hidden(&mut self, index: usize, hidden: bool) {
        if let Some(row) = self.rows.get_mut(index) {
            row.hidden = hidden;
        }
    }

    fn set_row_highlight(&mut self, index: usize, meta: Option<&HighlightMeta>) {
        let marked = meta.is_some_and(HighlightMeta::has_query);
        if let Some(row) = self.rows.get_mut(index) {
            row.marked = marked;
        }
        if marked {
            let changed = self
                .highlight
                .as_ref()
                .is_none_or(|current| current.raw() != meta.map(HighlightMeta::raw).unwrap_or(""));
            if changed {
                self.highlight = meta.cloned();
            }
        }
    }

    fn set_category_hidden(&mut self, category: usize, hidden: bool) {
        if let Some(cell) = self.categories.get_mut(category) {
            cell.hidden = hidden;
        }
    }

    fn set_subcategory_hidden(&mut self, subcategory: usize, hidden: bool) {
        if let Some(cell) = self.subcategories.get_mut(subcategory) {
            cell.hidden = hidden;
        }
    }

    fn set_status(&mut self, status: SearchStatus) {
        self.status = status;
    }
}

/// Sorted, hidden-filtered link rows with searchable text that also
/// carries the grouping tokens and container titles, so queries can
/// hit "onerilen" or a category name.
fn push_links(
    rows: &mut Vec<RowCell>,
    links: &[Link],
    category: usize,
    subcategory: Option<usize>,
    cat_title: &str,
    sub_title: Option<&str>,
) {
    let mut sorted: Vec<&Link> = links.iter().filter(|link| !link.hidden).collect();
    sorted.sort_by(|a, b| {
        let (fa, fb) = (fold(&a.name), fold(&b.name));
        fa.cmp(&fb).then_with(|| a.name.cmp(&b.name))
    });
    for link in sorted {
        let group_tokens = if link.recommended {
            RECOMMENDED_TOKENS
        } else {
            OTHER_TOKENS
        };
        let mut container = cat_title.to_string();
        if let Some(sub) = sub_title {
            if !sub.is_empty() {
                container.push(' ');
                container.push_str(sub);
            }
        }
        let folded = format!("{} {} {}", link.folded_key(), group_tokens, fold(&container))
            .trim()
            .to_string();
        let label = domain_label(&link.url);
        rows.push(RowCell {
            name: link.name.clone(),
            url: link.url.clone(),
            description: link.description.clone(),
            official: is_official_link(link, &label),
            recommended: link.recommended,
            copy_value: resolve_copy_value(link),
            folded,
            category,
            subcategory,
            hidden: false,
            marked: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> CatalogData {
        serde_json::from_value(json!({
            "categories": [
                {
                    "title": "Oyun",
                    "links": [
                        {"name": "Steam", "url": "https://store.steampowered.com", "recommended": true},
                        {"name": "Epic Games", "url": "https://epicgames.com"},
                        {"name": "Gizli", "url": "https://example.com", "hidden": true}
                    ]
                },
                {
                    "title": "Geliştirme",
                    "subcategories": [
                        {"title": "Kod Barındırma", "links": [
                            {"name": "GitLab", "url": "https://gitlab.com"},
                            {"name": "GitHub", "url": "https://github.com"}
                        ]}
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn hidden_links_never_become_rows() {
        let view = CatalogView::from_full(&full_payload());
        assert_eq!(view.rows().len(), 4);
        assert!(view.rows().iter().all(|row| row.name != "Gizli"));
    }

    #[test]
    fn rows_are_sorted_within_their_group() {
        let view = CatalogView::from_full(&full_payload());
        let names: Vec<&str> = view
            .rows()
            .iter()
            .filter(|row| row.category == 0)
            .map(|row| row.name.as_str())
            .collect();
        assert_eq!(names, vec!["Epic Games", "Steam"]);
    }

    #[test]
    fn folded_text_includes_group_and_container_tokens() {
        let view = CatalogView::from_full(&full_payload());
        let steam = view
            .rows()
            .iter()
            .find(|row| row.name == "Steam")
            .unwrap();
        assert!(steam.folded.contains("steam"));
        assert!(steam.folded.contains("onerilen"));
        assert!(steam.folded.contains("oyun"));

        let gitlab = view
            .rows()
            .iter()
            .find(|row| row.name == "GitLab")
            .unwrap();
        assert!(gitlab.folded.contains("diger"));
        assert!(gitlab.folded.contains("gelistirme"));
        assert!(gitlab.folded.contains("kod barindirma"));
    }

    #[test]
    fn dataset_mirrors_rows_and_containers() {
        let view = CatalogView::from_full(&full_payload());
        let dataset = view.build_dataset();
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.category_count(), 2);
        assert_eq!(dataset.subcategory_count(), 1);
        assert!(dataset.rows().iter().all(|row| row.is_link));
    }

    #[test]
    fn hydration_turns_a_shell_into_rows() {
        let index: CatalogIndex = serde_json::from_value(json!({
            "categories": [
                {"title": "Oyun", "file": "data/oyun.json"},
                {"title": "Medya", "file": "data/medya.json"}
            ],
            "linkIndex": {}
        }))
        .unwrap();
        let mut view = CatalogView::from_index(&index);
        assert_eq!(view.category_phase(0), Some(CategoryPhase::Shell));
        assert!(view.rows().is_empty());

        let fragment: Category = serde_json::from_value(json!({
            "title": "Oyun",
            "links": [{"name": "Steam", "url": "https://store.steampowered.com"}]
        }))
        .unwrap();
        view.hydrate_category(0, &fragment);
        assert_eq!(view.category_phase(0), Some(CategoryPhase::Hydrated));
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.category_phase(1), Some(CategoryPhase::Shell));

        view.mark_category_failed(1);
        assert_eq!(view.category_phase(1), Some(CategoryPhase::Failed));
        // a late failure report must not demote hydrated content
        view.mark_category_failed(0);
        assert_eq!(view.category_phase(0), Some(CategoryPhase::Hydrated));
    }

    #[test]
    fn render_skips_hidden_and_marks_favorites() {
        let mut view = CatalogView::from_full(&full_payload());
        view.set_row_hidden(0, true);
        view.set_category_hidden(1, true);

        let messages = Messages::default();
        let dir = tempfile_dir();
        let mut favorites = Favorites::load_from(dir.path().join("favorites.json"));
        favorites.add("Steam");

        let rendered = view.render(&messages, Some(&favorites));
        assert!(rendered.contains("* Steam"));
        assert!(!rendered.contains("Epic Games"));
        assert!(!rendered.contains("GitLab"));
    }

    fn tempfile_dir() -> tempfile::TempDir {
        tempfile::TempDir::new().unwrap()
    }
}
