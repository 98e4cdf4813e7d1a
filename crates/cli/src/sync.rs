use cloudscope_api::{CatalogService, TargetResource, TargetTag, Trigger};
use cloudscope_core::CollectorConfig;
use tracing::info;

pub async fn run(
    config: CollectorConfig,
    provider: Option<String>,
    resource_group: Option<String>,
    tag: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let trigger = Trigger {
        provider: provider.unwrap_or_else(|| config.provider.name.clone()),
        target_resource: TargetResource {
            name: resource_group.unwrap_or_default(),
            resource_type: String::new(),
        },
        target_tag: match tag {
            Some(raw) => parse_tag(&raw)?,
            None => TargetTag::default(),
        },
    };

    let collector = cloudscope_runtime::build_default_collector(config).await?;
    let result = collector.trigger_sync(&trigger).await;
    // Let the publish task finish before exiting.
    collector.shutdown().await?;

    let entities = result?;
    info!(entities = entities.len(), "sync finished");
    println!("{}", serde_json::to_string_pretty(&entities)?);
    Ok(())
}

fn parse_tag(raw: &str) -> Result<TargetTag, String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => Ok(TargetTag {
            key: key.to_string(),
            value: value.to_string(),
        }),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}
