use serde::{Deserialize, Serialize};

pub use importer_api::AnimeRecord;

use crate::sanitize::{non_negative_int, sanitize_text_field, sanitize_url};

/// The editable anime fields of a content entry, as raw input strings.
///
/// This is the field set the form controller reads the title from and
/// writes lookup results into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub title: String,
    pub episodes: String,
    pub poster: String,
    pub background: String,
    pub studio: String,
    pub year: String,
    pub season: String,
}

impl EditForm {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Fill every field from a stored record.
    pub fn from_record(record: &AnimeRecord) -> Self {
        let mut form = Self::with_title(record.title.clone());
        form.populate(record);
        form
    }

    /// Overwrite the six looked-up fields. The title is left alone.
    pub fn populate(&mut self, record: &AnimeRecord) {
        self.episodes = number_field(record.episodes);
        self.poster = record.poster.clone();
        self.background = record.background.clone();
        self.studio = record.studio.clone();
        self.year = number_field(record.year);
        self.season = record.season.clone();
    }

    /// What the form would submit when saved.
    pub fn to_submission(&self) -> RawSubmission {
        RawSubmission {
            title: self.title.clone(),
            episodes: self.episodes.clone(),
            poster: self.poster.clone(),
            background: self.background.clone(),
            studio: self.studio.clone(),
            year: self.year.clone(),
            season: self.season.clone(),
        }
    }
}

/// Zero means unknown, which a number input shows as blank.
fn number_field(n: u32) -> String {
    if n == 0 {
        String::new()
    } else {
        n.to_string()
    }
}

/// A submitted edit form before sanitization. Missing inputs are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSubmission {
    pub title: String,
    pub episodes: String,
    pub poster: String,
    pub background: String,
    pub studio: String,
    pub year: String,
    pub season: String,
}

impl RawSubmission {
    /// Sanitize every field into the persisted record shape.
    ///
    /// Season stays free text; it is not checked against the four AniList values.
    pub fn sanitize(&self) -> AnimeRecord {
        AnimeRecord {
            title: sanitize_text_field(&self.title),
            episodes: non_negative_int(&self.episodes),
            poster: sanitize_url(&self.poster),
            background: sanitize_url(&self.background),
            studio: sanitize_text_field(&self.studio),
            season: sanitize_text_field(&self.season),
            year: non_negative_int(&self.year),
        }
    }
}
