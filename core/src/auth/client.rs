// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::CredentialStore;
use crate::config::BackendConfig;
use crate::error::{ClientError, ClientResult};

const LOGIN_PATH: &str = "/auth/login";
const SIGNUP_PATH: &str = "/auth/signup";
const STATUS_PATH: &str = "/auth/status";

/// Signed-in user as reported by the backend
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub broker_connected: bool,
    pub connected_brokers: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    user_id: String,
    email: String,
    #[serde(default)]
    broker_connected: bool,
    connected_brokers: Option<Vec<String>>,
}

impl From<StatusResponse> for AuthUser {
    fn from(status: StatusResponse) -> Self {
        Self {
            user_id: status.user_id,
            email: status.email,
            broker_connected: status.broker_connected,
            connected_brokers: status.connected_brokers.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Sign-in, sign-up and session checks against the backend
pub struct AuthClient {
    client: Client,
    config: BackendConfig,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthClient {
    pub fn new(config: &BackendConfig, credentials: Arc<dyn CredentialStore>) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ClientError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            credentials,
        })
    }

    /// Sign in and keep the issued token
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<()> {
        self.obtain_token(LOGIN_PATH, email, password).await
    }

    /// Create an account and keep the issued token
    pub async fn signup(&self, email: &str, password: &str) -> ClientResult<()> {
        self.obtain_token(SIGNUP_PATH, email, password).await
    }

    /// Verify the stored token. A rejected token is forgotten.
    pub async fn status(&self) -> ClientResult<AuthUser> {
        let token = self
            .credentials
            .token()
            .ok_or_else(|| ClientError::AuthError("Not signed in".to_string()))?;

        match self.fetch_status(&token).await {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!("Auth verification failed, signing out: {}", e);
                self.credentials.clear()?;
                Err(e)
            }
        }
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.credentials.clear()
    }

    async fn fetch_status(&self, token: &str) -> ClientResult<AuthUser> {
        let response = self
            .client
            .get(self.config.url_for(STATUS_PATH)?)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let status: StatusResponse = serde_json::from_str(&body)?;
        Ok(status.into())
    }

    async fn obtain_token(&self, path: &str, email: &str, password: &str) -> ClientResult<()> {
        let url = self.config.url_for(path)?;
        debug!("Requesting token from {}", url);

        let response = self
            .client
            .post(url)
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::AuthError(format!(
                "{} - {}",
                status.as_u16(),
                message
            )));
        }

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body)?;
        self.credentials.store(&token.access_token)
    }
}
