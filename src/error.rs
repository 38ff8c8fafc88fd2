use thiserror::Error;

/// Errors surfaced while preparing or running a detection request.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Please select an image first")]
    NoImageSelected,

    #[error("'{name}' is not a supported image")]
    NotAnImage { name: String },

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status {status}")]
    Status { status: reqwest::StatusCode },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, DetectionError>;
