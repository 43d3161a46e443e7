use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::error::ImporterError;
use crate::models::{AnimeRecord, RawSubmission};

const SCHEMA: &str = include_str!("../../../migrations/001_initial.sql");

const SELECT_ENTRY: &str = "SELECT entry_id, title, episodes, poster, background, studio,
     season, year, updated_at FROM anime_entries";

/// SQLite-backed store of anime records keyed by content entry.
pub struct Storage {
    conn: Connection,
}

/// A persisted record with its entry identity.
#[derive(Debug, Clone, Serialize)]
pub struct StoredEntry {
    pub entry_id: i64,
    #[serde(flatten)]
    pub record: AnimeRecord,
    pub updated_at: DateTime<Utc>,
}

/// A classification term an entry can be listed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Taxonomy {
    Studio(String),
    Season(String),
    Year(u32),
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, ImporterError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, ImporterError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Sanitize a submitted form and store it, replacing any previous record
    /// for the entry.
    pub fn save_submission(
        &self,
        entry_id: i64,
        submission: &RawSubmission,
    ) -> Result<StoredEntry, ImporterError> {
        let record = submission.sanitize();
        let updated_at = Utc::now();
        self.conn.execute(
            "INSERT INTO anime_entries (entry_id, title, episodes, poster, background,
             studio, season, year, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(entry_id) DO UPDATE SET
                title = excluded.title,
                episodes = excluded.episodes,
                poster = excluded.poster,
                background = excluded.background,
                studio = excluded.studio,
                season = excluded.season,
                year = excluded.year,
                updated_at = excluded.updated_at",
            params![
                entry_id,
                record.title,
                record.episodes,
                record.poster,
                record.background,
                record.studio,
                record.season,
                record.year,
                updated_at.to_rfc3339(),
            ],
        )?;
        tracing::info!(entry_id, title = %record.title, "Saved anime entry");

        Ok(StoredEntry {
            entry_id,
            record,
            updated_at,
        })
    }

    pub fn get_entry(&self, entry_id: i64) -> Result<Option<StoredEntry>, ImporterError> {
        self.conn
            .query_row(
                &format!("{SELECT_ENTRY} WHERE entry_id = ?1"),
                params![entry_id],
                row_to_entry,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All entries, ordered by title.
    pub fn list_entries(&self) -> Result<Vec<StoredEntry>, ImporterError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_ENTRY} ORDER BY title COLLATE NOCASE, entry_id"))?;
        let rows = stmt
            .query_map([], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Entries classified under `term`. Blank studios/seasons and year 0 match nothing.
    pub fn entries_with_term(&self, term: &Taxonomy) -> Result<Vec<StoredEntry>, ImporterError> {
        let (clause, value): (&str, rusqlite::types::Value) = match term {
            Taxonomy::Studio(s) if !s.trim().is_empty() => {
                ("studio = ?1 COLLATE NOCASE", s.trim().to_string().into())
            }
            Taxonomy::Season(s) if !s.trim().is_empty() => {
                ("season = ?1 COLLATE NOCASE", s.trim().to_string().into())
            }
            Taxonomy::Year(y) if *y > 0 => ("year = ?1", i64::from(*y).into()),
            _ => return Ok(Vec::new()),
        };

        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_ENTRY} WHERE {clause} ORDER BY title COLLATE NOCASE, entry_id"
        ))?;
        let rows = stmt
            .query_map(params![value], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Remove an entry's record. Returns whether anything was deleted.
    pub fn delete_entry(&self, entry_id: i64) -> Result<bool, ImporterError> {
        let changed = self.conn.execute(
            "DELETE FROM anime_entries WHERE entry_id = ?1",
            params![entry_id],
        )?;
        Ok(changed > 0)
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<StoredEntry> {
    let updated: String = row.get(8)?;
    Ok(StoredEntry {
        entry_id: row.get(0)?,
        record: AnimeRecord {
            title: row.get(1)?,
            episodes: row.get(2)?,
            poster: row.get(3)?,
            background: row.get(4)?,
            studio: row.get(5)?,
            season: row.get(6)?,
            year: row.get(7)?,
        },
        updated_at: parse_datetime(&updated),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
