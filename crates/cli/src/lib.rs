mod query;
mod schema;
mod serve;
mod sync;

use clap::{Parser, Subcommand, ValueEnum};
use cloudscope_core::CollectorConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cloudscope",
    version,
    about = "Synchronizes a cloud resource inventory into a service catalog",
    long_about = "Cloudscope reads a provider's flat resource inventory, rebuilds the \
                  subscription / resource group / resource hierarchy as catalog entities, \
                  and serves or publishes the result."
)]
pub struct Cli {
    /// Configuration file (JSON). Defaults to $CLOUDSCOPE_CONFIG, then built-in defaults.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one synchronization and print the resulting entities
    Sync {
        /// Provider to sync. Defaults to the configured provider.
        #[arg(long)]
        provider: Option<String>,
        /// Only resources in this resource group
        #[arg(long, value_name = "NAME")]
        resource_group: Option<String>,
        /// Only resources carrying this tag, as KEY=VALUE
        #[arg(long, value_name = "KEY=VALUE")]
        tag: Option<String>,
    },
    /// Query the catalog with optional case-insensitive filters
    Query {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        namespace: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print the JSON schema of a boundary type
    Schema {
        #[arg(value_enum, default_value_t = SchemaTarget::Entity)]
        target: SchemaTarget,
    },
    /// Serve the catalog over HTTP
    Serve {
        /// Address to bind, overriding the configuration
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SchemaTarget {
    Entity,
    Trigger,
    Filter,
    Config,
    Inventory,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let component = match &cli.command {
        Commands::Serve { .. } => "serve",
        _ => "cli",
    };
    let to_stderr = matches!(cli.command, Commands::Serve { .. });
    let _guard = cloudscope_runtime::init_logging(component, to_stderr);

    if let Commands::Schema { target } = cli.command {
        return schema::run(target);
    }

    let config = CollectorConfig::resolve(cli.config.as_deref())?;
    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Sync {
            provider,
            resource_group,
            tag,
        } => rt.block_on(sync::run(config, provider, resource_group, tag)),
        Commands::Query {
            name,
            kind,
            namespace,
            format,
        } => rt.block_on(query::run(config, name, kind, namespace, format)),
        Commands::Serve { bind } => rt.block_on(serve::run(config, bind)),
        Commands::Schema { .. } => Ok(()),
    }
}
