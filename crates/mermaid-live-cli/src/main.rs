use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod clipboard;
mod commands;
mod context;

use context::AppContext;

#[derive(Parser)]
#[command(name = "mermaid-live")]
#[command(about = "Live Mermaid previews from the clipboard, with a diagram history", long_about = None)]
struct Cli {
    /// Keep config and data under this directory instead of the user directories
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the clipboard and print preview URLs for every new diagram
    Watch {
        /// Polling period in milliseconds (overrides config.toml)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Browse and edit saved diagrams
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Print preview URLs for a diagram file (`-` for stdin), or decode a token
    Url {
        /// Diagram file, or `-` to read stdin
        #[arg(required_unless_present = "decode")]
        file: Option<PathBuf>,
        /// Decode a `pako:` token back into its description
        #[arg(long, value_name = "TOKEN", conflicts_with = "file")]
        decode: Option<String>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved diagrams, pinned first
    List {
        /// Only show diagrams whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a diagram and its URLs (marks it as recently used)
    Show { id: String },
    /// Rename a diagram
    Rename { id: String, name: String },
    /// Pin or unpin a diagram
    Pin { id: String },
    /// Delete a diagram
    Delete { id: String },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let ctx = AppContext::load(cli.data_dir.as_deref()).await?;

    match cli.command {
        Commands::Watch { interval_ms } => commands::watch::run(&ctx, interval_ms).await?,
        Commands::History { action } => match action {
            HistoryAction::List { search } => {
                commands::history::list(&ctx, search.as_deref()).await?
            }
            HistoryAction::Show { id } => commands::history::show(&ctx, &id).await?,
            HistoryAction::Rename { id, name } => {
                commands::history::rename(&ctx, &id, &name).await?
            }
            HistoryAction::Pin { id } => commands::history::pin(&ctx, &id).await?,
            HistoryAction::Delete { id } => commands::history::delete(&ctx, &id).await?,
        },
        Commands::Url { file, decode } => match decode {
            Some(token) => commands::url::decode(&token)?,
            None => commands::url::encode(&ctx, file.as_deref())?,
        },
    }

    Ok(())
}
