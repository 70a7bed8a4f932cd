// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors that can occur when talking to the Vertex backend
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("API error: {status_code} - {message}")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Response carried no body")]
    EmptyBody,

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Credential store error: {0}")]
    CredentialError(String),
}

impl ClientError {
    /// Whether the failure happened at the transport level rather than in the payload
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::HttpError(_)
                | ClientError::ApiError { .. }
                | ClientError::EmptyBody
                | ClientError::TimeoutError(_)
        )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ClientError::ApiError {
            status_code: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");
        assert!(err.is_transport());
    }

    #[test]
    fn test_non_transport_errors() {
        assert!(!ClientError::AuthError("no token".to_string()).is_transport());
        assert!(!ClientError::CredentialError("read-only".to_string()).is_transport());
        assert!(ClientError::EmptyBody.is_transport());
    }
}
