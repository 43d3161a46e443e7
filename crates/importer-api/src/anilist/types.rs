use serde::{Deserialize, Serialize};

use crate::traits::AnimeRecord;

// ── Request ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LookupRequest<'a> {
    pub query: &'a str,
    pub variables: LookupVariables<'a>,
}

#[derive(Debug, Serialize)]
pub struct LookupVariables<'a> {
    pub search: &'a str,
}

// ── Response ─────────────────────────────────────────────────────

/// The `data` member of a lookup response.
#[derive(Debug, Deserialize)]
pub struct MediaResponse {
    #[serde(rename = "Media")]
    pub media: Option<AniListMedia>,
}

#[derive(Debug, Deserialize)]
pub struct AniListMedia {
    pub title: Option<AniListTitle>,
    pub episodes: Option<u32>,
    #[serde(rename = "coverImage")]
    pub cover_image: Option<CoverImage>,
    #[serde(rename = "bannerImage")]
    pub banner_image: Option<String>,
    pub studios: Option<StudioConnection>,
    pub season: Option<String>,
    #[serde(rename = "seasonYear")]
    pub season_year: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StudioConnection {
    pub nodes: Option<Vec<StudioNode>>,
}

#[derive(Debug, Deserialize)]
pub struct StudioNode {
    pub name: Option<String>,
}

// ── Conversions ──────────────────────────────────────────────────

impl AniListMedia {
    /// Flatten into an [`AnimeRecord`]. Only the first studio is kept.
    pub fn into_record(self) -> AnimeRecord {
        let studio = self
            .studios
            .and_then(|s| s.nodes)
            .and_then(|nodes| nodes.into_iter().next())
            .and_then(|node| node.name)
            .unwrap_or_default();

        AnimeRecord {
            title: self.title.and_then(|t| t.romaji).unwrap_or_default(),
            episodes: self.episodes.unwrap_or(0),
            poster: self.cover_image.and_then(|c| c.large).unwrap_or_default(),
            background: self.banner_image.unwrap_or_default(),
            studio,
            season: self.season.unwrap_or_default(),
            year: self.season_year.unwrap_or(0),
        }
    }
}
