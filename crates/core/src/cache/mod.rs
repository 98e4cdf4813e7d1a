pub mod fetcher;
pub mod memory;

pub use fetcher::{CacheAsideFetcher, CachePayload, DynCacheStore};
pub use memory::MemoryCacheStore;
