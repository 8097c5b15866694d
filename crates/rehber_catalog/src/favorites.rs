//! Persisted favorites: a name set under `~/.rehber/favorites.json`.
//!
//! Persistence failures are logged and never surfaced as operation
//! failures; the in-memory set stays authoritative for the session.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rehber_shared::diagnostics;

pub const DEFAULT_FAVORITES: &[&str] = &[
    "Microsoft Activation Scripts",
    "Office Tool Plus",
    "Snappy Driver Installer",
    "Ninite",
    "Winutil",
    "PowerShell",
    "FMHY",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum FavoritesError {
    Io(String),
    Serialize(String),
    NoStorageDir,
}

impl fmt::Display for FavoritesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FavoritesError::Io(msg) => write!(f, "favorites io error: {}", msg),
            FavoritesError::Serialize(msg) => write!(f, "favorites serialize error: {}", msg),
            FavoritesError::NoStorageDir => write!(f, "no storage directory available"),
        }
    }
}

impl std::error::Error for FavoritesError {}

impl From<std::io::Error> for FavoritesError {
    fn from(err: std::io::Error) -> Self {
        FavoritesError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FavoritesError {
    fn from(err: serde_json::Error) -> Self {
        FavoritesError::Serialize(err.to_string())
    }
}

pub type FavoritesResult<T> = Result<T, FavoritesError>;

#[derive(Debug)]
pub struct Favorites {
    names: BTreeSet<String>,
    path: Option<PathBuf>,
}

impl Favorites {
    /// Loads from the default location; missing or corrupt storage
    /// reseeds the defaults (and persists them).
    pub fn load_default() -> Self {
        match diagnostics::data_dir() {
            Some(dir) => Self::load_from(dir.join("favorites.json")),
            None => {
                diagnostics::error("[favorites] no home directory, favorites are session-only");
                Self::seeded(None)
            }
        }
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(names) => Favorites {
                    names: names.into_iter().collect(),
                    path: Some(path),
                },
                Err(err) => {
                    diagnostics::error(format!("[favorites] parse failed, reseeding: {}", err));
                    Self::seeded(Some(path))
                }
            },
            Err(_) => Self::seeded(Some(path)),
        }
    }

    fn seeded(path: Option<PathBuf>) -> Self {
        let favorites = Favorites {
            names: DEFAULT_FAVORITES.iter().map(|s| s.to_string()).collect(),
            path,
        };
        favorites.persist();
        favorites
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns true when the name was newly added.
    pub fn add(&mut self, name: &str) -> bool {
        let added = self.names.insert(name.to_string());
        if added {
            self.persist();
        }
        added
    }

    /// Returns true when the name was present and removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let removed = self.names.remove(name);
        if removed {
            self.persist();
        }
        removed
    }

    /// Returns the membership state after toggling.
    pub fn toggle(&mut self, name: &str) -> bool {
        let now_favorite = if self.names.remove(name) {
            false
        } else {
            self.names.insert(name.to_string());
            true
        };
        self.persist();
        now_favorite
    }

    pub fn reset_to_defaults(&mut self) {
        self.names = DEFAULT_FAVORITES.iter().map(|s| s.to_string()).collect();
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.save() {
            diagnostics::error(format!("[favorites] save failed: {}", err));
        }
    }

    fn save(&self) -> FavoritesResult<()> {
        let Some(path) = self.path.as_deref() else {
            return Err(FavoritesError::NoStorageDir);
        };
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        let contents = serde_json::to_string_pretty(&names)?;
        write_atomic(path, &contents)
    }
}

/// Write to a sibling temp file, then rename over the target so a
/// crash mid-write never leaves a truncated favorites file.
fn write_atomic(path: &Path, contents: &str) -> FavoritesResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
