use crate::error::CacheError;
use async_trait::async_trait;
use std::time::Duration;

/// Byte-opaque key-value store backing the cache-aside layer.
///
/// Implementations own key namespacing; callers pass logical keys.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// `Ok(None)` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` for `ttl`. A zero ttl never expires.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;
}
