pub mod cache;
pub mod catalog;
pub mod error;
pub mod models;
pub mod observe;
pub mod provider;
pub mod publish;

// Re-export commonly used types
pub use cache::CacheStore;
pub use catalog::CatalogService;
pub use error::{
    CacheError, CatalogError, CatalogResult, ProviderError, PublishError, ValidationError,
};
pub use models::*;
pub use observe::{SyncObserver, SyncOutcome};
pub use provider::ProviderClient;
pub use publish::{Envelope, Publisher};
