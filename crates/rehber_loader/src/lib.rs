pub mod error;
pub mod fetcher;
pub mod loader;

pub use error::{FetchError, FetchResult, LoadError, LoadResult};
pub use fetcher::{
    fetch_catalog, DirFetcher, Fetcher, HttpFetcher, MemoryFetcher, LINKS_FALLBACK_PATH,
    LINKS_INDEX_PATH,
};
pub use loader::{CategoryLoader, FragmentState, LoaderEvent, LoaderOptions};
