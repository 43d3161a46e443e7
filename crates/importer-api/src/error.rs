use thiserror::Error;

/// Failures of a single metadata lookup.
///
/// Exactly one variant applies per call, checked in declaration order.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("empty query")]
    EmptyQuery,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no anime found for {title:?}")]
    NotFound { title: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LookupError {
    /// Short text suitable for showing to the person who triggered the lookup.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "Enter a title",
            Self::Transport(_) => "Metadata service unavailable",
            Self::NotFound { .. } => "Anime not found",
            Self::MalformedResponse(_) => "Unexpected response from metadata service",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
