use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use rehber_catalog::Lang;

/// Command-line arguments. Flags win over the config file.
#[derive(Parser, Debug)]
#[command(name = "rehber", version, about = "Curated link catalog browser with Turkish-aware search")]
pub struct Args {
    /// Read catalog payloads from a local directory
    #[arg(long, value_name = "PATH", conflicts_with = "url")]
    pub dir: Option<PathBuf>,

    /// Fetch catalog payloads from a base URL
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Run one query, print the matches, and exit
    #[arg(short, long, value_name = "QUERY")]
    pub query: Option<String>,

    /// Interface language (tr or en)
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Search on the calling thread instead of the worker
    #[arg(long)]
    pub sync: bool,

    /// How many leading categories to fetch at startup
    #[arg(long, value_name = "N")]
    pub warm: Option<usize>,

    /// Verbose diagnostics on stderr and in the log file
    #[arg(long)]
    pub diag: bool,
}

/// Persisted defaults. The file is optional and every field has one,
/// so a partial config parses fine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog_dir: Option<String>,
    #[serde(default)]
    pub catalog_url: Option<String>,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_warm")]
    pub warm: usize,
    #[serde(default = "default_offload")]
    pub offload_search: bool,
    #[serde(default)]
    pub diag: bool,
    /// Site base for the `:share` command.
    #[serde(default)]
    pub share_base: Option<String>,
}

fn default_lang() -> String {
    "tr".to_string()
}

fn default_warm() -> usize {
    2
}

fn default_offload() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_dir: None,
            catalog_url: None,
            lang: default_lang(),
            warm: default_warm(),
            offload_search: default_offload(),
            diag: false,
            share_base: None,
        }
    }
}

impl AppConfig {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rehber").join("config.toml"))
    }

    /// Load from the config directory, or defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| {
                if path.exists() {
                    std::fs::read_to_string(&path).ok()
                } else {
                    None
                }
            })
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }
}

/// Where catalog payloads come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Dir(PathBuf),
    Url(String),
}

/// Effective configuration after merging CLI over file over defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source: CatalogSource,
    pub lang: Lang,
    pub warm: usize,
    pub offload: bool,
    pub diag: bool,
    pub share_base: Option<String>,
    pub query: Option<String>,
}

impl Settings {
    pub fn resolve(args: &Args, config: &AppConfig) -> Self {
        let source = if let Some(dir) = &args.dir {
            CatalogSource::Dir(dir.clone())
        } else if let Some(url) = &args.url {
            CatalogSource::Url(url.clone())
        } else if let Some(dir) = &config.catalog_dir {
            CatalogSource::Dir(PathBuf::from(dir))
        } else if let Some(url) = &config.catalog_url {
            CatalogSource::Url(url.clone())
        } else {
            CatalogSource::Dir(PathBuf::from("."))
        };
        let lang = args
            .lang
            .as_deref()
            .and_then(Lang::parse)
            .or_else(|| Lang::parse(&config.lang))
            .unwrap_or_default();
        Self {
            source,
            lang,
            warm: args.warm.unwrap_or(config.warm),
            offload: !args.sync && config.offload_search,
            diag: args.diag || config.diag,
            share_base: config.share_base.clone(),
            query: args.query.clone(),
        }
    }
}
