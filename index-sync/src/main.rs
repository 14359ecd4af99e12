use std::error::Error;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use index_sync::{
    list_indices, re_index, re_index_enabled, Dependencies, IndexingError, LogFormat, SyncConfig,
};

#[derive(Parser)]
#[command(name = "index-sync")]
#[command(about = "Keep hosted search indices in sync with a content export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every configured index and whether it exists remotely
    List,
    /// Re-index one index, or every enabled index with --all
    Reindex {
        /// Id of the index to re-index (e.g. posts_post)
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        index_id: Option<String>,

        /// Page to start or resume from
        #[arg(long, default_value = "1")]
        from_page: u64,

        /// Re-index every enabled index
        #[arg(long)]
        all: bool,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing(LogFormat::from_env());

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);

        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("  Caused by: {}", err);
            source = err.source();
        }

        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), IndexingError> {
    let config = SyncConfig::from_env()?;
    let deps = Dependencies::new(&config).await?;

    match cli.command {
        Commands::List => {
            for status in list_indices(&deps.registry).await? {
                println!(
                    "{:<28} {:<8} {:<36} {}",
                    status.id,
                    if status.enabled { "enabled" } else { "-" },
                    status.index_name,
                    if status.exists { "exists" } else { "missing" },
                );
            }
        }
        Commands::Reindex { all: true, .. } => {
            for (index_id, progress) in re_index_enabled(&deps.registry).await? {
                println!("{}: {} page(s)", index_id, progress.total_pages);
            }
        }
        Commands::Reindex {
            index_id: Some(index_id),
            from_page,
            ..
        } => {
            info!(index_id = %index_id, from_page, "Starting re-index");
            let progress = re_index(&deps.registry, &index_id, from_page).await?;
            println!("{}: {} page(s)", index_id, progress.total_pages);
        }
        Commands::Reindex { index_id: None, .. } => {
            return Err(IndexingError::config("an index id or --all is required"));
        }
    }

    Ok(())
}
