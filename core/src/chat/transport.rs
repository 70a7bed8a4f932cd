// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use log::debug;
use reqwest::{Client, StatusCode};
use std::pin::Pin;
use std::sync::Arc;

use crate::auth::CredentialStore;
use crate::chat::turn::ChatRequest;
use crate::config::BackendConfig;
use crate::error::{ClientError, ClientResult};

/// Raw response body, chunked as it arrives from the network
pub type ByteStream = Pin<Box<dyn Stream<Item = ClientResult<Bytes>> + Send>>;

/// Opens one streaming chat exchange
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send the request and hand back the body once the headers are in.
    ///
    /// A non-success status or a response without a body is an error; no
    /// bytes of such a response are ever returned.
    async fn open(&self, request: &ChatRequest) -> ClientResult<ByteStream>;
}

/// Chat transport over HTTP
pub struct HttpChatTransport {
    client: Client,
    endpoint: String,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpChatTransport {
    pub fn new(config: &BackendConfig, credentials: Arc<dyn CredentialStore>) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ClientError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.chat_url()?,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open(&self, request: &ChatRequest) -> ClientResult<ByteStream> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(request);

        if let Some(token) = self.credentials.token() {
            builder = builder.bearer_auth(token);
        }

        debug!(
            "Opening chat stream at {} with {} messages",
            self.endpoint,
            request.messages.len()
        );

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Err(ClientError::EmptyBody);
        }

        let body: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(ClientError::HttpError)),
        );

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryCredentialStore;

    #[test]
    fn test_endpoint_from_config() {
        let config = BackendConfig::default().with_base_url("http://localhost:4000/".to_string());
        let transport =
            HttpChatTransport::new(&config, Arc::new(MemoryCredentialStore::default())).unwrap();

        assert_eq!(transport.endpoint(), "http://localhost:4000/ai-chat/message");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = BackendConfig::default().with_base_url("not a url".to_string());
        let result = HttpChatTransport::new(&config, Arc::new(MemoryCredentialStore::default()));

        assert!(matches!(result, Err(ClientError::ConfigError(_))));
    }
}
