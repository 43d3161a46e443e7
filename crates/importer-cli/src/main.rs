mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "anilist_importer=info,importer_core=info,importer_api=info";

/// Fetch anime metadata from AniList and store it against content entries.
#[derive(Debug, Parser)]
#[command(name = "anilist-importer", version)]
struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config.
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look up a title and print the fetch response envelope.
    Fetch { title: String },

    /// Fill an entry's form from AniList and save it.
    Import {
        entry: i64,
        /// Title to search for; defaults to the entry's stored title.
        #[arg(long)]
        title: Option<String>,
    },

    /// Save hand-entered fields without fetching.
    Save {
        entry: i64,
        #[command(flatten)]
        fields: commands::FieldArgs,
    },

    /// Print a stored entry.
    Show { entry: i64 },

    /// List stored entries, optionally by one studio, season or year.
    List {
        #[arg(long, conflicts_with_all = ["season", "year"])]
        studio: Option<String>,
        #[arg(long, conflicts_with = "year")]
        season: Option<String>,
        #[arg(long)]
        year: Option<u32>,
    },

    /// Remove an entry's stored record.
    Delete { entry: i64 },

    /// Write the default config to the config path.
    InitConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match commands::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
