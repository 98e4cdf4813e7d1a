pub mod service;

pub use service::{CatalogQueryService, QUERY_KEY_PREFIX, filter_kinds};
