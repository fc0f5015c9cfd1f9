use serde::Deserialize;
use std::error::Error as StdError;
use thiserror::Error;

pub const FALLBACK_MESSAGE: &str = "Unexpected error occurred";

/// Body a backend may attach to a failed response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorPayload {
    /// `error` wins over `message`; blank values do not count.
    pub fn text(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(String),
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        payload: Option<ErrorPayload>,
    },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid request url: {0}")]
    Url(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                payload: Some(payload),
                ..
            } => payload.text(),
            _ => None,
        }
    }
}

/// Human-readable message for any failure.
///
/// A structured server payload anywhere in the chain takes precedence over
/// the error's own text.
pub fn error_message(err: &(dyn StdError + 'static)) -> String {
    let mut current = Some(err);
    while let Some(cause) = current {
        if let Some(api) = cause.downcast_ref::<ApiError>() {
            if let Some(message) = api.server_message() {
                return message.to_string();
            }
        }
        current = cause.source();
    }

    let message = err.to_string();
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}
