//! The inbound fetch endpoint the edit form calls asynchronously.
//!
//! Replies use the admin-ajax envelope: `{"success": true, "data": <record>}`
//! or `{"success": false, "data": {"message": "..."}}`.

use serde::Serialize;

use importer_api::{AnimeRecord, MetadataLookup};

use crate::sanitize::sanitize_text_field;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMessage {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FetchPayload {
    Anime(AnimeRecord),
    Error(ErrorMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchResponse {
    pub success: bool,
    pub data: FetchPayload,
}

impl FetchResponse {
    pub fn success(record: AnimeRecord) -> Self {
        Self {
            success: true,
            data: FetchPayload::Anime(record),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: FetchPayload::Error(ErrorMessage {
                message: message.into(),
            }),
        }
    }
}

/// Answer one fetch request. `title` is `None` when the parameter was absent.
pub async fn handle_fetch<L: MetadataLookup>(lookup: &L, title: Option<&str>) -> FetchResponse {
    let Some(raw) = title else {
        return FetchResponse::error("Missing title");
    };
    let title = sanitize_text_field(raw);

    match lookup.lookup(&title).await {
        Ok(record) => FetchResponse::success(record),
        Err(e) => {
            if e.is_not_found() {
                tracing::debug!(title = %title, "No match for fetch request");
            } else {
                tracing::warn!(title = %title, error = %e, "Fetch request failed");
            }
            FetchResponse::error(e.user_message())
        }
    }
}
