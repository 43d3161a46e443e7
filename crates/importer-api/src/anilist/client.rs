use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::types::{LookupRequest, LookupVariables, MediaResponse};
use crate::error::LookupError;
use crate::traits::{AnimeRecord, MetadataLookup};

pub const API_URL: &str = "https://graphql.anilist.co";

const LOOKUP_QUERY: &str = r#"
query ($search: String) {
    Media(search: $search, type: ANIME) {
        title { romaji }
        episodes
        coverImage { large }
        bannerImage
        studios { nodes { name } }
        season
        seasonYear
    }
}
"#;

/// Connection settings for [`AniListClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoint: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: API_URL.to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            user_agent: format!("anilist-importer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Anonymous AniList GraphQL client. Each lookup is one POST, never retried.
pub struct AniListClient {
    endpoint: String,
    http: Client,
}

impl AniListClient {
    pub fn with_options(options: ClientOptions) -> Result<Self, LookupError> {
        let http = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .user_agent(options.user_agent)
            .build()?;
        Ok(Self {
            endpoint: options.endpoint,
            http,
        })
    }

    async fn graphql_request(&self, search: &str) -> Result<(StatusCode, String), LookupError> {
        tracing::debug!(search, endpoint = %self.endpoint, "AniList GraphQL request");

        let resp = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&LookupRequest {
                query: LOOKUP_QUERY,
                variables: LookupVariables { search },
            })
            .send()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "AniList request failed"))?;

        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(status = %status, bytes = body.len(), "AniList response received");
        Ok((status, body))
    }
}

/// Classify a completed response. A `Media: null` body means no match even
/// when the status is 404, which is how AniList reports an unmatched search.
fn interpret_response(
    search: &str,
    status: StatusCode,
    body: &str,
) -> Result<AnimeRecord, LookupError> {
    let envelope: graphql_client::Response<MediaResponse> = serde_json::from_str(body)
        .map_err(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "unparseable AniList response");
            LookupError::MalformedResponse(format!("HTTP {}: {e}", status.as_u16()))
        })?;

    let not_found = || LookupError::NotFound {
        title: search.to_string(),
    };

    match envelope.data {
        Some(MediaResponse { media: Some(media) }) => Ok(media.into_record()),
        Some(MediaResponse { media: None }) => Err(not_found()),
        None if status == StatusCode::NOT_FOUND => Err(not_found()),
        None => {
            let messages = envelope
                .errors
                .unwrap_or_default()
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            tracing::warn!(status = status.as_u16(), errors = %messages, "AniList returned no data");
            Err(LookupError::MalformedResponse(if messages.is_empty() {
                format!("HTTP {}: missing data", status.as_u16())
            } else {
                format!("HTTP {}: {messages}", status.as_u16())
            }))
        }
    }
}

impl MetadataLookup for AniListClient {
    async fn lookup(&self, title: &str) -> Result<AnimeRecord, LookupError> {
        let search = title.trim();
        if search.is_empty() {
            return Err(LookupError::EmptyQuery);
        }

        let (status, body) = self.graphql_request(search).await?;
        interpret_response(search, status, &body)
    }
}
