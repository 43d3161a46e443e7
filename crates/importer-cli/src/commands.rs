use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tokio::sync::RwLock;

use importer_api::{AniListClient, MetadataLookup};
use importer_core::ajax::handle_fetch;
use importer_core::config::AppConfig;
use importer_core::controller::{FetchOutcome, FormController, Notice, NoticeKind, Notifier};
use importer_core::error::ImporterError;
use importer_core::models::{EditForm, RawSubmission};
use importer_core::storage::{Storage, StoredEntry, Taxonomy};

use crate::{Cli, Command};

/// Raw form inputs for `save`. Values are sanitized on save, not here.
#[derive(Debug, Args)]
pub struct FieldArgs {
    #[arg(long, default_value = "")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub episodes: String,
    #[arg(long, default_value = "")]
    pub poster: String,
    #[arg(long, default_value = "")]
    pub background: String,
    #[arg(long, default_value = "")]
    pub studio: String,
    #[arg(long, default_value = "")]
    pub year: String,
    #[arg(long, default_value = "")]
    pub season: String,
}

impl FieldArgs {
    pub fn into_submission(self) -> RawSubmission {
        RawSubmission {
            title: self.title,
            episodes: self.episodes,
            poster: self.poster,
            background: self.background,
            studio: self.studio,
            year: self.year,
            season: self.season,
        }
    }
}

/// Prints notices on stderr so stdout carries only JSON.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info => eprintln!("{}", notice.message),
            NoticeKind::Error => eprintln!("error: {}", notice.message),
        }
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode, ImporterError> {
    let Cli {
        config: config_path,
        database,
        command,
    } = cli;

    // Loaded per command so `init-config` works even when the user file is broken.
    let load_config = || -> Result<AppConfig, ImporterError> {
        let mut config = match &config_path {
            Some(path) => AppConfig::load_from(path)?,
            None => AppConfig::load()?,
        };
        if let Some(database) = &database {
            config.storage.database = Some(database.clone());
        }
        Ok(config)
    };

    match command {
        Command::InitConfig => {
            let path = match config_path {
                Some(path) => {
                    AppConfig::default().save_to(&path)?;
                    path
                }
                None => {
                    AppConfig::default().save()?;
                    AppConfig::config_path()
                }
            };
            eprintln!("Wrote default config to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::Fetch { title } => fetch(&load_config()?, &title).await,
        Command::Import { entry, title } => import(&load_config()?, entry, title).await,
        Command::Save { entry, fields } => {
            let storage = open_storage(&load_config()?)?;
            let stored = storage.save_submission(entry, &fields.into_submission())?;
            print_json(&stored)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { entry } => {
            let storage = open_storage(&load_config()?)?;
            let stored = storage
                .get_entry(entry)?
                .ok_or(ImporterError::EntryNotFound(entry))?;
            print_json(&stored)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::List {
            studio,
            season,
            year,
        } => {
            let storage = open_storage(&load_config()?)?;
            let term = studio
                .map(Taxonomy::Studio)
                .or(season.map(Taxonomy::Season))
                .or(year.map(Taxonomy::Year));
            let entries = match term {
                Some(term) => storage.entries_with_term(&term)?,
                None => storage.list_entries()?,
            };
            print_json(&entries)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Delete { entry } => {
            let storage = open_storage(&load_config()?)?;
            if !storage.delete_entry(entry)? {
                return Err(ImporterError::EntryNotFound(entry));
            }
            eprintln!("Deleted entry {entry}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn fetch(config: &AppConfig, title: &str) -> Result<ExitCode, ImporterError> {
    let client = AniListClient::with_options(config.client_options())?;
    let resp = handle_fetch(&client, Some(title)).await;
    print_json(&resp)?;
    Ok(if resp.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn import(
    config: &AppConfig,
    entry: i64,
    title: Option<String>,
) -> Result<ExitCode, ImporterError> {
    let storage = open_storage(config)?;
    let client = AniListClient::with_options(config.client_options())?;

    match import_entry(&storage, client, StderrNotifier, entry, title).await? {
        Some(stored) => {
            print_json(&stored)?;
            Ok(ExitCode::SUCCESS)
        }
        // The notifier has already reported why.
        None => Ok(ExitCode::FAILURE),
    }
}

/// Load the entry into an edit form, run one fetch, and save what the form holds.
///
/// Returns `None` without touching storage when the fetch does not populate the form.
async fn import_entry<L: MetadataLookup, N: Notifier>(
    storage: &Storage,
    lookup: L,
    notifier: N,
    entry: i64,
    title: Option<String>,
) -> Result<Option<StoredEntry>, ImporterError> {
    let mut form = storage
        .get_entry(entry)?
        .map(|stored| EditForm::from_record(&stored.record))
        .unwrap_or_default();
    if let Some(title) = title {
        form.title = title;
    }

    let controller = FormController::new(
        Arc::new(lookup),
        Arc::new(RwLock::new(form)),
        Arc::new(notifier),
    );

    match controller.trigger_fetch().await {
        FetchOutcome::Populated(_) => {
            let submission = controller.form().read().await.to_submission();
            Ok(Some(storage.save_submission(entry, &submission)?))
        }
        FetchOutcome::MissingTitle | FetchOutcome::Failed(_) => Ok(None),
    }
}

fn open_storage(config: &AppConfig) -> Result<Storage, ImporterError> {
    let path = config.ensure_db_path()?;
    tracing::debug!(path = %path.display(), "Opening database");
    Storage::open(&path)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ImporterError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
