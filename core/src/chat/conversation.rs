// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use log::{debug, info};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::chat::session::{SessionReport, SessionStatus, StreamSession};
use crate::chat::transport::ChatTransport;
use crate::chat::turn::{ChatRequest, Turn};
use crate::config::{BackendConfig, ChatConfig};

#[derive(Debug)]
struct ActiveExchange {
    turn_id: String,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct ExchangeState {
    active: Option<ActiveExchange>,
    last_outcome: Option<SessionStatus>,
}

type SharedExchange = Arc<Mutex<ExchangeState>>;

fn lock(state: &SharedExchange) -> MutexGuard<'_, ExchangeState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds a conversation's streaming slot for one exchange.
///
/// Travels inside the [`StreamSession`] and then its [`SessionReport`]. Dropping
/// it before [`Conversation::settle`] frees the slot with a `Cancelled` outcome.
#[derive(Debug)]
pub(crate) struct ExchangeGuard {
    state: SharedExchange,
    turn_id: String,
    released: bool,
}

impl ExchangeGuard {
    fn release(mut self, outcome: SessionStatus) {
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: SessionStatus) {
        if self.released {
            return;
        }
        self.released = true;

        let mut state = lock(&self.state);
        let owns_slot = state
            .active
            .as_ref()
            .is_some_and(|active| active.turn_id == self.turn_id);
        if owns_slot {
            state.active = None;
            state.last_outcome = Some(outcome);
        }
    }
}

impl Drop for ExchangeGuard {
    fn drop(&mut self) {
        if !self.released {
            info!("[chat] Exchange for turn {} dropped before settling", self.turn_id);
        }
        self.finish(SessionStatus::Cancelled);
    }
}

/// One chat surface: the visible history plus at most one streaming exchange.
///
/// A send goes through three steps: [`Conversation::send`] records the user
/// turn and hands out a [`StreamSession`], the caller runs it (usually on its
/// own task), and [`Conversation::settle`] writes the finished reply back.
/// Dropping the session or its report instead also returns the surface to idle.
pub struct Conversation {
    turns: Vec<Turn>,
    exchange: SharedExchange,
    transport: Arc<dyn ChatTransport>,
    welcome_message: String,
    connection_error_message: String,
    idle_timeout: Duration,
}

impl Conversation {
    pub fn new(transport: Arc<dyn ChatTransport>, chat: &ChatConfig, backend: &BackendConfig) -> Self {
        Self {
            turns: vec![Turn::welcome(chat.welcome_message.clone())],
            exchange: SharedExchange::default(),
            transport,
            welcome_message: chat.welcome_message.clone(),
            connection_error_message: chat.connection_error_message.clone(),
            idle_timeout: backend.idle_timeout(),
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// `Active` while a session is in flight, `Idle` otherwise
    pub fn status(&self) -> SessionStatus {
        if self.is_streaming() {
            SessionStatus::Active
        } else {
            SessionStatus::Idle
        }
    }

    pub fn is_streaming(&self) -> bool {
        lock(&self.exchange).active.is_some()
    }

    /// Terminal status of the most recent finished session
    pub fn last_outcome(&self) -> Option<SessionStatus> {
        lock(&self.exchange).last_outcome
    }

    /// Id of the assistant turn currently being streamed into
    pub fn active_turn_id(&self) -> Option<String> {
        lock(&self.exchange)
            .active
            .as_ref()
            .map(|active| active.turn_id.clone())
    }

    /// Start a new exchange.
    ///
    /// Returns `None` without touching the history when the text is blank or
    /// another exchange is still in flight.
    pub fn send(&mut self, text: &str) -> Option<StreamSession> {
        let text = text.trim();
        if text.is_empty() {
            debug!("[chat] Ignoring blank message");
            return None;
        }

        let mut state = lock(&self.exchange);
        if state.active.is_some() {
            debug!("[chat] Ignoring send while a reply is streaming");
            return None;
        }

        self.turns.push(Turn::user(text));
        let request = ChatRequest::from_history(&self.turns);

        let placeholder = Turn::assistant("");
        self.turns.push(placeholder.clone());

        let session = StreamSession::new(
            request,
            placeholder,
            self.transport.clone(),
            self.idle_timeout,
            self.connection_error_message.clone(),
        );
        state.active = Some(ActiveExchange {
            turn_id: session.turn_id().to_string(),
            cancel: session.cancel_token(),
        });
        drop(state);

        let guard = ExchangeGuard {
            state: self.exchange.clone(),
            turn_id: session.turn_id().to_string(),
            released: false,
        };
        Some(session.with_guard(guard))
    }

    /// Cancel the in-flight exchange, if any
    pub fn cancel(&self) {
        if let Some(active) = &lock(&self.exchange).active {
            active.cancel.cancel();
        }
    }

    /// Write a finished session back into the history and return to idle
    pub fn settle(&mut self, report: SessionReport) {
        let SessionReport {
            status, turn, guard, ..
        } = report;

        if let Some(existing) = self.turns.iter_mut().find(|t| t.id == turn.id) {
            existing.content = turn.content;
        }

        if let Some(guard) = guard {
            guard.release(status);
        }
    }

    /// Drop everything but the welcome turn. Refused while streaming.
    pub fn clear(&mut self) -> bool {
        let mut state = lock(&self.exchange);
        if state.active.is_some() {
            return false;
        }
        state.last_outcome = None;
        drop(state);

        self.turns = vec![Turn::welcome(self.welcome_message.clone())];
        true
    }
}
