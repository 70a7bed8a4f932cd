// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use anyhow::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "vertex-chat";

/// Per-user CLI settings, kept next to the stored token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Backend override applied on top of the YAML config
    #[serde(default)]
    pub base_url: Option<String>,
    /// Email of the last successful sign-in, offered as the default next time
    #[serde(default)]
    pub last_email: Option<String>,
}

impl UserSettings {
    /// Directory holding settings, token and log file
    pub fn app_dir() -> Result<PathBuf> {
        let config_dir =
            config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_DIR))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("settings.json"))
    }

    /// Token location used when the YAML config names none
    pub fn default_token_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("token"))
    }

    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("vertex-chat.log"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Missing file means default settings
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: UserSettings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Effective base URL override, ignoring blank values
    pub fn get_base_url(&self) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }
}
