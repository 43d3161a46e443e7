//! The lookup seam between metadata services and the editing surface.
//!
//! The form controller only knows about [`MetadataLookup`], so tests and
//! alternative services can stand in for the AniList client.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// Normalized anime metadata. Also the shape persisted per content entry.
///
/// Every field is always present: unknown values are `""` or `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeRecord {
    pub title: String,
    pub episodes: u32,
    pub poster: String,
    pub background: String,
    pub studio: String,
    pub season: String,
    pub year: u32,
}

/// A service that can resolve a free-text title to a single [`AnimeRecord`].
pub trait MetadataLookup: Send + Sync {
    /// Look up the best match for `title`.
    ///
    /// Blank titles fail with [`LookupError::EmptyQuery`] before any I/O.
    fn lookup(&self, title: &str) -> impl Future<Output = Result<AnimeRecord, LookupError>> + Send;
}
