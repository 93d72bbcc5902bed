use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReaperError>;

#[derive(Debug, Error)]
pub enum ReaperError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("login failed: {status} {body}")]
    Auth { status: StatusCode, body: String },

    #[error("failed to list tags: {status} {body}")]
    List { status: StatusCode, body: String },

    #[error("failed to list tags: {0}")]
    Pagination(String),

    #[error("failed to delete tag {tag}: {status}")]
    Delete { tag: String, status: StatusCode },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
