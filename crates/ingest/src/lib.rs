pub mod error;
pub mod runtime;
pub mod traits;
pub mod types;

pub use error::IngestError;
pub use runtime::{BackgroundRuntime, DynRuntimeMetrics, FlowControlConfig, TaskHandle};
pub use traits::{NoopMetrics, RuntimeMetrics};
pub use types::{RuntimeConfig, RuntimeStats, TaskOutcome, TaskResult, TaskStatus};
