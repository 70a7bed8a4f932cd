// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Id reserved for the synthetic greeting that seeds every conversation
pub const WELCOME_TURN_ID: &str = "welcome";

/// Author of a turn as shown to the user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Message typed by the user
    User,
    /// Reply produced by the assistant
    Assistant,
}

impl TurnRole {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }

    /// Role name understood by the backend (`user` / `model`)
    pub fn wire_role(&self) -> WireRole {
        match self {
            TurnRole::User => WireRole::User,
            TurnRole::Assistant => WireRole::Model,
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role vocabulary of the outbound request payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Model,
}

/// One message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub id: String,
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    /// The greeting shown before anything is sent; never part of a request
    pub fn welcome(content: impl Into<String>) -> Self {
        Self {
            id: WELCOME_TURN_ID.to_string(),
            ..Self::assistant(content)
        }
    }

    pub fn is_welcome(&self) -> bool {
        self.id == WELCOME_TURN_ID
    }
}

/// A single text part of a wire message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextPart {
    pub text: String,
}

/// A turn translated into the backend's message shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireMessage {
    pub role: WireRole,
    pub parts: Vec<TextPart>,
}

impl From<&Turn> for WireMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.wire_role(),
            parts: vec![TextPart {
                text: turn.content.clone(),
            }],
        }
    }
}

/// Body of the chat-message request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
}

impl ChatRequest {
    /// Build the payload from visible history, skipping the welcome seed.
    /// Order is preserved exactly as the turns occurred.
    pub fn from_history<'a>(turns: impl IntoIterator<Item = &'a Turn>) -> Self {
        Self {
            messages: turns
                .into_iter()
                .filter(|turn| !turn.is_welcome())
                .map(WireMessage::from)
                .collect(),
        }
    }
}
