use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("request to completion provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion provider returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("completion provider returned no content")]
    EmptyCompletion,
}
