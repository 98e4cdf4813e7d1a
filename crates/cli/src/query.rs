use crate::OutputFormat;
use cloudscope_api::{CatalogEntity, CatalogService, FilterKind};
use cloudscope_core::CollectorConfig;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct EntityRow {
    kind: String,
    namespace: String,
    name: String,
    #[tabled(rename = "type")]
    entity_type: String,
    owner: String,
    #[tabled(rename = "depends on")]
    depends_on: String,
}

impl From<&CatalogEntity> for EntityRow {
    fn from(entity: &CatalogEntity) -> Self {
        let or_dash = |s: &str| {
            if s.is_empty() {
                "-".to_string()
            } else {
                s.to_string()
            }
        };
        Self {
            kind: entity.kind.clone(),
            namespace: entity.metadata.namespace.clone(),
            name: entity.metadata.name.clone(),
            entity_type: entity.spec.entity_type.clone(),
            owner: or_dash(&entity.spec.owner),
            depends_on: or_dash(&entity.spec.depends_on.join(", ")),
        }
    }
}

pub async fn run(
    config: CollectorConfig,
    name: Option<String>,
    kind: Option<String>,
    namespace: Option<String>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = FilterKind {
        name: name.unwrap_or_default(),
        kind: kind.unwrap_or_default(),
        namespace: namespace.unwrap_or_default(),
    };

    let collector = cloudscope_runtime::build_default_collector(config).await?;
    let result = collector.get_all(&filter).await;
    collector.shutdown().await?;
    let entities = result?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entities)?),
        OutputFormat::Table => {
            if entities.is_empty() {
                println!("No entities found.");
            } else {
                let rows: Vec<EntityRow> = entities.iter().map(EntityRow::from).collect();
                println!("{}", Table::new(rows).with(Style::psql()));
            }
        }
    }
    Ok(())
}
