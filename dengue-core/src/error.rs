//! Failure modes at the API boundary.

use thiserror::Error;

use crate::api::Endpoint;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}: {body}")]
    Status { endpoint: Endpoint, status: u16, body: String },

    /// The body was not the JSON shape we expect.
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    /// The body decoded but carries values outside the contract.
    #[error("{endpoint} response violates contract: {reason}")]
    Contract { endpoint: Endpoint, reason: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    pub fn contract(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        ApiError::Contract { endpoint, reason: reason.into() }
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            ApiError::Transport { endpoint, .. }
            | ApiError::Status { endpoint, .. }
            | ApiError::Decode { endpoint, .. }
            | ApiError::Contract { endpoint, .. } => Some(*endpoint),
            ApiError::InvalidInput(_) => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
