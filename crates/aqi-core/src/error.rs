//! Error taxonomy for fetching and running the pipeline

use thiserror::Error;

/// Failure of a single fetch against the remote observation source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// No connectivity, TLS failure, timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx status or empty body
    #[error("Bad response: {0}")]
    BadResponse(String),

    /// Body present but not in the expected shape.
    ///
    /// `detail` carries the decoder diagnostic and `snippet` a bounded prefix
    /// of the payload. Both are for developer logs, not for end users.
    #[error("Decode error: {detail}")]
    Decode { detail: String, snippet: String },
}

impl FetchError {
    /// Generic text safe to show to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "Unable to reach the air quality service.",
            FetchError::BadResponse(_) | FetchError::Decode { .. } => {
                "The air quality service returned an unexpected response."
            }
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Pipeline run cancelled")]
    Cancelled,
}

pub type FetchResult<T> = Result<T, FetchError>;
pub type PipelineOutcome<T> = Result<T, PipelineError>;
