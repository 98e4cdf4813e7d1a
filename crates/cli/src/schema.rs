use crate::SchemaTarget;
use cloudscope_api::{CatalogEntity, FilterKind, Trigger};
use cloudscope_core::provider::Inventory;
use cloudscope_core::CollectorConfig;

pub fn run(target: SchemaTarget) -> Result<(), Box<dyn std::error::Error>> {
    let schema = match target {
        SchemaTarget::Entity => schemars::schema_for!(CatalogEntity),
        SchemaTarget::Trigger => schemars::schema_for!(Trigger),
        SchemaTarget::Filter => schemars::schema_for!(FilterKind),
        SchemaTarget::Config => schemars::schema_for!(CollectorConfig),
        SchemaTarget::Inventory => schemars::schema_for!(Inventory),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
