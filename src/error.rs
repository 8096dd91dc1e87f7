use crate::extraction::ExtractionFailure;

/// Errors surfaced by the course agent
#[derive(thiserror::Error, Debug)]
pub enum CourseError {
    #[error("Invalid YouTube playlist URL: {0}")]
    InvalidPlaylistUrl(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Playlist {0} not found")]
    PlaylistNotFound(String),

    #[error("YouTube API error {status}: {message}")]
    YouTubeApi { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),
}

impl CourseError {
    /// Errors caused by bad caller input rather than a failing dependency
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CourseError::InvalidPlaylistUrl(_) | CourseError::PlaylistNotFound(_)
        )
    }
}

pub type CourseResult<T> = std::result::Result<T, CourseError>;
