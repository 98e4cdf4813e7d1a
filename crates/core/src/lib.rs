pub mod bus;
pub mod cache;
pub mod config;
pub mod graph;
pub mod logging;
pub mod mapper;
pub mod observe;
pub mod provider;
pub mod query;
pub mod sync;

pub use cache::{CacheAsideFetcher, MemoryCacheStore};
pub use config::{CollectorConfig, ConfigError};
pub use graph::{DependencyGraphBuilder, ResourceLookup, SubscriptionContext, build_catalog};
pub use observe::{DynObserver, RecordingObserver, TracingObserver};
pub use provider::{CachedProvider, InventoryProvider};
pub use query::{CatalogQueryService, filter_kinds};
pub use sync::{ProviderBinding, SyncOrchestrator};
