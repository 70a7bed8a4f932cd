// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{ClientError, ClientResult};

/// Holder of the bearer token sent with backend requests
pub trait CredentialStore: Send + Sync {
    /// Current token, if the user is signed in
    fn token(&self) -> Option<String>;

    fn store(&self, token: &str) -> ClientResult<()>;

    fn clear(&self) -> ClientResult<()>;
}

/// Token kept for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|token| token.clone())
    }

    fn store(&self, token: &str) -> ClientResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| ClientError::CredentialError(e.to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| ClientError::CredentialError(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

/// Token persisted in a file so it survives restarts.
///
/// A missing, unreadable or blank file reads as "no credential".
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self) -> Option<String> {
        let content = fs::read_to_string(&self.path).ok()?;
        let token = content.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn store(&self, token: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ClientError::CredentialError(e.to_string()))?;
        }
        fs::write(&self.path, token).map_err(|e| ClientError::CredentialError(e.to_string()))
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::CredentialError(e.to_string())),
        }
    }
}
