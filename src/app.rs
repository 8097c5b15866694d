//! Wires the catalog pipeline together: fetch the payload, build the
//! view (plus a lazy loader for index payloads), hand both to the
//! search coordinator, and drive it from stdin.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc::UnboundedReceiver;
use url::Url;

use rehber_browse::{query_param, CatalogView, Key, KeyEvent, KeyOutcome, SearchCoordinator};
use rehber_catalog::{CatalogPayload, Favorites, Messages};
use rehber_loader::{
    fetch_catalog, CategoryLoader, DirFetcher, Fetcher, HttpFetcher, LoaderEvent, LoaderOptions,
};
use rehber_search::{EngineOptions, SearchStatus};
use rehber_shared::diagnostics;

use crate::config::{CatalogSource, Settings};

const HELP: &str = "\
commands:
  :all        load every category now
  :fav NAME   toggle a favorite
  :open       open the first visible match
  :share      print a share link for the current query
  :help       show this list
  :q          quit
anything else runs as a search; an empty line clears it";

pub async fn run(settings: Settings) -> Result<()> {
    if settings.diag {
        diagnostics::set_enabled(true);
    }

    let fetcher: Arc<dyn Fetcher> = match &settings.source {
        CatalogSource::Dir(path) => Arc::new(DirFetcher::new(path.clone())),
        CatalogSource::Url(raw) => Arc::new(HttpFetcher::new(parse_base_url(raw)?)),
    };
    let payload = fetch_catalog(fetcher.as_ref())
        .await
        .context("could not load the catalog")?;

    let messages = Messages::new(settings.lang);
    let mut favorites = Favorites::load_default();

    let (view, loader, mut events) = match payload {
        CatalogPayload::Index(index) => {
            let view = CatalogView::from_index(&index);
            let (loader, events) = CategoryLoader::new(
                &index,
                fetcher,
                LoaderOptions {
                    warm_count: settings.warm,
                },
            );
            loader.start(favorites.names());
            (view, Some(loader), Some(events))
        }
        CatalogPayload::Full(data) => (CatalogView::from_full(&data), None, None),
    };

    diagnostics::log(format!(
        "catalog_ready mode={} categories={}",
        if loader.is_some() { "index" } else { "full" },
        view.categories().len()
    ));

    let options = EngineOptions {
        offload: settings.offload,
    };
    let mut coordinator = SearchCoordinator::new(view, loader.clone(), options);

    if let Some(raw) = &settings.query {
        let query = query_from_share_link(raw);
        answer(&mut coordinator, &loader, &mut events, &query).await;
        print_view(&coordinator, &messages, &favorites);
        return Ok(());
    }

    print_view(&coordinator, &messages, &favorites);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let trimmed = line.trim();
        match trimmed {
            ":q" | ":quit" => break,
            ":help" => println!("{}", HELP),
            ":all" => {
                if let Some(loader) = &loader {
                    coordinator.request_full_load();
                    loader.load_all().await;
                }
                drain(&mut coordinator, &mut events);
                coordinator.settle();
                print_view(&coordinator, &messages, &favorites);
            }
            ":open" => match coordinator.route_search_key(KeyEvent::plain(Key::Enter)) {
                KeyOutcome::Activate { name, url } => println!("{} -> {}", name, url),
                _ => println!("nothing to open"),
            },
            ":share" => match share_base(&settings) {
                Some(base) => println!("{}", coordinator.share_url(&base)),
                None => println!("set share_base in config.toml (or pass --url) for share links"),
            },
            _ if trimmed == ":fav" || trimmed.starts_with(":fav ") => {
                let name = trimmed.strip_prefix(":fav").unwrap_or_default().trim();
                if name.is_empty() {
                    println!("usage: :fav NAME");
                } else if favorites.toggle(name) {
                    println!("+ {}", name);
                } else {
                    println!("- {}", name);
                }
            }
            _ if trimmed.starts_with(':') => println!("unknown command, :help lists them"),
            query => {
                answer(&mut coordinator, &loader, &mut events, query).await;
                print_view(&coordinator, &messages, &favorites);
            }
        }
    }

    Ok(())
}

/// Runs one query to a printable answer: apply any hydration that
/// already arrived, run the query, complete the forced full load when
/// the catalog was not all there, and settle the worker.
async fn answer(
    coordinator: &mut SearchCoordinator,
    loader: &Option<Arc<CategoryLoader>>,
    events: &mut Option<UnboundedReceiver<LoaderEvent>>,
    query: &str,
) {
    drain(coordinator, events);
    coordinator.run_immediate(query);
    if coordinator.status() == SearchStatus::Loading {
        if let Some(loader) = loader {
            loader.load_all().await;
            drain(coordinator, events);
        }
    }
    coordinator.settle();
}

fn drain(coordinator: &mut SearchCoordinator, events: &mut Option<UnboundedReceiver<LoaderEvent>>) {
    if let Some(events) = events.as_mut() {
        while let Ok(event) = events.try_recv() {
            coordinator.handle_event(event);
        }
    }
}

fn print_view(coordinator: &SearchCoordinator, messages: &Messages, favorites: &Favorites) {
    print!("{}", coordinator.view().render(messages, Some(favorites)));
    let status = coordinator.view().status_text(messages);
    if !status.is_empty() {
        println!("{}", status);
    }
}

/// Fragment paths resolve relative to the base, so the base has to end
/// with a slash or its last segment would be dropped.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut normalized = raw.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).with_context(|| format!("invalid catalog url: {raw}"))
}

/// A pasted share link searches for its `q` parameter; anything else is
/// the query itself.
fn query_from_share_link(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|url| query_param(&url))
        .unwrap_or_else(|| raw.to_string())
}

fn share_base(settings: &Settings) -> Option<Url> {
    let raw = settings.share_base.as_deref().or_else(|| match &settings.source {
        CatalogSource::Url(url) => Some(url.as_str()),
        CatalogSource::Dir(_) => None,
    })?;
    Url::parse(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehber_catalog::Lang;
    use std::path::PathBuf;

    fn settings(source: CatalogSource, share_base: Option<&str>) -> Settings {
        Settings {
            source,
            lang: Lang::Tr,
            warm: 2,
            offload: true,
            diag: false,
            share_base: share_base.map(str::to_string),
            query: None,
        }
    }

    #[test]
    fn base_url_always_ends_with_a_slash() {
        assert_eq!(
            parse_base_url("https://ornek.dev/kaynak").unwrap().as_str(),
            "https://ornek.dev/kaynak/"
        );
        assert_eq!(
            parse_base_url("https://ornek.dev/").unwrap().as_str(),
            "https://ornek.dev/"
        );
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn pasted_share_links_turn_into_their_query() {
        assert_eq!(query_from_share_link("https://ornek.dev/?q=vlc"), "vlc");
        assert_eq!(query_from_share_link("steam deck"), "steam deck");
        // a link without q is searched for literally
        assert_eq!(
            query_from_share_link("https://github.com"),
            "https://github.com"
        );
    }

    #[test]
    fn share_base_prefers_config_then_catalog_url() {
        let with_config = settings(
            CatalogSource::Url("https://ornek.dev/kaynak/".to_string()),
            Some("https://rehber.dev/"),
        );
        assert_eq!(
            share_base(&with_config).unwrap().as_str(),
            "https://rehber.dev/"
        );

        let url_only = settings(CatalogSource::Url("https://ornek.dev/".to_string()), None);
        assert_eq!(share_base(&url_only).unwrap().as_str(), "https://ornek.dev/");

        let dir_only = settings(CatalogSource::Dir(PathBuf::from(".")), None);
        assert!(share_base(&dir_only).is_none());
    }
}
