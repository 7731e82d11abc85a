//! Error types shared by the dealer, sampler and distraction pipeline

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Board dimension is not an even positive integer
    #[error("invalid board dimension {value:?}: must be an even positive integer")]
    InvalidDimension { value: String },

    /// Sampling request larger than the population
    #[error("invalid argument: requested {requested} items from {available}")]
    InvalidArgument { requested: usize, available: usize },

    /// Video URL without a `v=<id>` query parameter
    #[error("malformed video url: {url}")]
    MalformedVideoUrl { url: String },

    /// Network, service or payload failure while fetching distraction content
    #[error("remote fetch failed: {message}")]
    RemoteFetchFailure { message: String },
}

impl GameError {
    pub fn invalid_dimension(value: impl ToString) -> Self {
        GameError::InvalidDimension {
            value: value.to_string(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        GameError::RemoteFetchFailure {
            message: message.into(),
        }
    }

    /// True for failures that only cost a single distraction
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GameError::MalformedVideoUrl { .. } | GameError::RemoteFetchFailure { .. }
        )
    }
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::remote(format!("bad payload: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
