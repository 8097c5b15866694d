pub mod coordinator;
pub mod view;

pub use coordinator::{debounce_delay, query_param, Key, KeyEvent, KeyOutcome, SearchCoordinator};
pub use view::{CatalogView, CategoryPhase};
