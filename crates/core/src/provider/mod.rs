pub mod cached;
pub mod inventory;

pub use cached::CachedProvider;
pub use inventory::{Inventory, InventoryProvider};

use cloudscope_api::ProviderClient;
use std::sync::Arc;

pub type DynProviderClient = Arc<dyn ProviderClient>;
