pub mod apply;
pub mod dataset;
pub mod engine;
#[cfg(test)]
pub(crate) mod test_support;
pub mod worker;

pub use apply::{MatchApplier, RowView, SearchStatus};
pub use dataset::{SearchDataset, SearchRow};
pub use engine::{build_engine, EngineOptions, InProcessEngine, SearchEngine};
pub use worker::OffloadedEngine;
