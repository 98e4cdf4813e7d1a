pub mod orchestrator;

pub use orchestrator::{ProviderBinding, SyncOrchestrator};
