use serde::Deserialize;
use std::fmt;
use thiserror::Error;

use super::transport::Method;

/// Error id the ZPA API uses when the addressed object does not exist
pub const OBJECT_NOT_FOUND_ID: &str = "resource.not.found";

/// Errors surfaced by the transport and the customer-scoped client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-success status
    #[error(transparent)]
    Response(#[from] ErrorResponse),

    /// The request never produced a response (connection, TLS, timeout)
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    /// Sign-in failed or returned an unusable token
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The response body did not match the expected record shape
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    /// True when the API reported that the addressed object does not exist
    pub fn is_object_not_found(&self) -> bool {
        match self {
            ApiError::Response(resp) => resp.is_object_not_found(),
            _ => false,
        }
    }
}

/// A non-2xx answer from the API
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub method: Method,
    pub path: String,
    pub status: u16,
    /// Machine-readable error id from the ZPA error body (e.g. `resource.not.found`)
    pub id: Option<String>,
    /// Human-readable reason from the ZPA error body
    pub reason: Option<String>,
    pub body: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    id: Option<String>,
    reason: Option<String>,
}

impl ErrorResponse {
    /// Build an error response, extracting `id`/`reason` when the body is ZPA error JSON
    pub fn new(method: Method, path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let parsed: Option<ErrorBody> = serde_json::from_str(&body).ok();
        let (id, reason) = match parsed {
            Some(err) => (err.id, err.reason),
            None => (None, None),
        };

        Self {
            method,
            path: path.into(),
            status,
            id,
            reason,
            body,
        }
    }

    pub fn is_object_not_found(&self) -> bool {
        self.status == 404 || self.id.as_deref() == Some(OBJECT_NOT_FOUND_ID)
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.method, self.path, self.status)?;

        match (&self.id, &self.reason) {
            (Some(id), Some(reason)) => write!(f, " {} ({})", reason, id),
            (Some(id), None) => write!(f, " {}", id),
            (None, Some(reason)) => write!(f, " {}", reason),
            (None, None) if !self.body.is_empty() => write!(f, " {}", self.body),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for ErrorResponse {}
