//! Serde models for the catalog payloads.
//!
//! Two payload families exist: the lazy index (`data/links-index.json`,
//! category shells plus per-category fragment files) and the legacy
//! inline payload (`links.json`, everything in one document). Fragment
//! files reuse the `Category` shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fold::fold;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Link {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub recommended: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub official: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_text: Option<String>,
    /// Precomputed folded key over name + tags; derived when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folded: Option<String>,
}

impl Link {
    /// Raw searchable base: name plus tags.
    pub fn search_base(&self) -> String {
        let mut parts = Vec::with_capacity(1 + usize::from(!self.tags.is_empty()));
        if !self.name.is_empty() {
            parts.push(self.name.clone());
        }
        if !self.tags.is_empty() {
            parts.push(self.tags.join(" "));
        }
        parts.join(" ")
    }

    /// Folded search key, preferring the precomputed value.
    pub fn folded_key(&self) -> String {
        match self.folded.as_deref() {
            Some(folded) if !folded.is_empty() => folded.to_string(),
            _ => fold(&self.search_base()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subcategory {
    pub title: String,
    pub links: Vec<Link>,
}

/// A hydrated category, also the shape of a lazy fragment file.
/// `links` and `subcategories` are mutually exclusive in authored data;
/// when both appear, subcategories win.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<Link>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<Vec<Subcategory>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogData {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexCategory {
    pub title: String,
    pub file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogIndex {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub categories: Vec<IndexCategory>,
    pub link_index: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub enum CatalogPayload {
    Index(CatalogIndex),
    Full(CatalogData),
}

/// Shape probe for the lazy index: a non-empty category list where
/// every element carries a non-empty string `file`.
pub fn is_links_index(value: &Value) -> bool {
    let Some(categories) = value.get("categories").and_then(Value::as_array) else {
        return false;
    };
    !categories.is_empty()
        && categories.iter().all(|cat| {
            cat.get("file")
                .and_then(Value::as_str)
                .is_some_and(|file| !file.is_empty())
        })
}

/// Decodes a top-level payload, classifying it as index or full data.
/// A document that fails the index probe is decoded as the legacy full
/// payload.
pub fn parse_payload(bytes: &[u8]) -> Result<CatalogPayload, serde_json::Error> {
    let value: Value = serde_json::from_slice(bytes)?;
    if is_links_index(&value) {
        Ok(CatalogPayload::Index(serde_json::from_value(value)?))
    } else {
        Ok(CatalogPayload::Full(serde_json::from_value(value)?))
    }
}

/// Decodes one lazy fragment file.
pub fn parse_fragment(bytes: &[u8]) -> Result<Category, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folded_key_prefers_precomputed_value() {
        let link = Link {
            name: "İstanbul Rehberi".to_string(),
            folded: Some("istanbul rehberi".to_string()),
            ..Default::default()
        };
        assert_eq!(link.folded_key(), "istanbul rehberi");

        let derived = Link {
            name: "Işık Editörü".to_string(),
            tags: vec!["Görsel".to_string()],
            ..Default::default()
        };
        assert_eq!(derived.folded_key(), "isik editoru gorsel");
    }

    #[test]
    fn detects_index_payload() {
        let raw = br#"{
            "version": 2,
            "generatedAt": "2025-01-01T00:00:00Z",
            "categories": [
                {"title": "Oyun", "file": "data/oyun.json"},
                {"title": "Sistem", "file": "data/sistem.json"}
            ],
            "linkIndex": {"Steam": "data/oyun.json"}
        }"#;
        match parse_payload(raw).unwrap() {
            CatalogPayload::Index(index) => {
                assert_eq!(index.categories.len(), 2);
                assert_eq!(
                    index.link_index.get("Steam").map(String::as_str),
                    Some("data/oyun.json")
                );
            }
            CatalogPayload::Full(_) => panic!("expected index payload"),
        }
    }

    #[test]
    fn falls_back_to_full_payload_when_files_missing() {
        let raw = br#"{
            "categories": [
                {"title": "Oyun", "links": [{"name": "Steam", "url": "https://store.steampowered.com"}]}
            ]
        }"#;
        match parse_payload(raw).unwrap() {
            CatalogPayload::Full(data) => {
                assert_eq!(data.categories.len(), 1);
                let links = data.categories[0].links.as_ref().unwrap();
                assert_eq!(links[0].name, "Steam");
            }
            CatalogPayload::Index(_) => panic!("expected full payload"),
        }
    }

    #[test]
    fn fragment_with_unknown_fields_still_decodes() {
        let raw = br#"{"title": "Oyun", "links": [], "theme": "dark"}"#;
        let fragment = parse_fragment(raw).unwrap();
        assert_eq!(fragment.title, "Oyun");
        assert!(parse_fragment(b"[1, 2]").is_err());
    }
}
