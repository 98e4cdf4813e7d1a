/// Failure reported by a provider client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Request(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid inventory: {0}")]
    Inventory(String),
}

/// Failure reported by a cache store. Never fatal to a caller of the core.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    Connection(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Unknown cache error: {0}")]
    Unknown(String),
}

/// Failure reported by a message publisher.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PublishError {
    #[error("Broker connection failed: {0}")]
    Connection(String),
    #[error("Message rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("the resource name cannot be empty")]
    MissingName,
    #[error("the resource type cannot be empty (resource `{name}`)")]
    MissingType { name: String },
    #[error("the resource owner cannot be empty (resource `{name}`)")]
    MissingOwner { name: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("Lookup `{operation}` failed: {source}")]
    Lookup {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },
    #[error("Filter requires at least one non-empty field")]
    Filter,
    #[error("Cache unavailable: {0}")]
    Cache(#[from] CacheError),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn lookup(operation: &'static str, source: ProviderError) -> Self {
        CatalogError::Lookup { operation, source }
    }
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
