//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by an `AnswerClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnswerClientError {
    #[error("answer generation is not configured")]
    Disabled,
    #[error("answer generation returned an empty response")]
    EmptyResponse,
    #[error("answer generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the question preparation job.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PrepareError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scraped JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no questions found in the scraped page")]
    NoQuestions,
}

/// Errors emitted by the answer generation job.
///
/// Per-question API failures are not errors at this level; they are logged and skipped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid question JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{path} not found; run the prepare step first")]
    MissingInput { path: PathBuf },
}
