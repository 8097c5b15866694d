pub mod domain;
pub mod favorites;
pub mod fold;
pub mod highlight;
pub mod messages;
pub mod model;

pub use favorites::Favorites;
pub use highlight::HighlightMeta;
pub use messages::{Lang, Messages};
pub use model::{CatalogData, CatalogIndex, CatalogPayload, Category, Link, Subcategory};
