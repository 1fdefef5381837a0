use crate::config::AdapterConfig;
use adapter::EsAdapter;
use anyhow::Context;
use clap::{Parser, Subcommand};
use engine::Engine;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use util::Dml;

mod config;

#[derive(Parser)]
#[command(name = "canal-es", version, about = "Routes change events into search indexes")]
struct Cli {
    /// Adapter configuration file
    #[arg(short, long, default_value = "conf/application.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print which configs every source table is routed to
    Routes,
    /// Run a full import of a config or of every config of a destination
    Etl { task: String, params: Vec<String> },
    /// Count the documents in the index of a config
    Count { task: String },
    /// Route the change events of a JSON-lines file
    Replay { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let config = AdapterConfig::load(&cli.config)
        .with_context(|| format!("could not read {}", cli.config.display()))?;
    let configs = util::load_configs(&config.mappings)?;

    let engine = if config.hosts.trim().is_empty() {
        warn!("No elasticsearch hosts configured, using in-memory engine");
        Engine::memory()
    } else {
        Engine::elastic(&config.hosts, config.properties)?
    };

    let adapter = EsAdapter::builder(engine)
        .key(config.key.as_ref())
        .registry(config.data_sources)
        .init(configs)?;

    match cli.command {
        Command::Routes => {
            for (route, configs) in adapter.routing().index().iter() {
                let keys = configs.iter().map(|c| c.key.as_str()).collect::<Vec<_>>();
                println!("{} -> {}", route, keys.join(", "));
            }
        }
        Command::Etl { task, params } => {
            let res = adapter.etl(&task, &params).await?;
            println!("{}", serde_json::to_string_pretty(&res)?);
        }
        Command::Count { task } => {
            let res = adapter.count(&task).await?;
            println!("{}", serde_json::to_string_pretty(&res)?);
        }
        Command::Replay { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("could not read {}", file.display()))?;
            let (mut routed, mut skipped) = (0, 0);
            for (i, line) in content.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
                let dml: Dml = serde_json::from_str(line)
                    .with_context(|| format!("invalid event on line {}", i + 1))?;
                if adapter.route(&dml).await? {
                    routed += 1;
                } else {
                    skipped += 1;
                }
            }
            info!("Replayed {}: {} routed, {} without mapping", file.display(), routed, skipped);
        }
    }

    adapter.destroy();
    Ok(())
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}
