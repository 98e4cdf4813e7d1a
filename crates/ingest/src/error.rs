use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum IngestError {
    #[error("background queue saturated, rejected task `{0}`")]
    Saturated(String),
    #[error("background runtime closed, rejected task `{0}`")]
    Closed(String),
    #[error("task `{0}` dropped before reporting an outcome")]
    Abandoned(String),
    #[error("drain timed out after {0} ms")]
    DrainTimeout(u64),
}
