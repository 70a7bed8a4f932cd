// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use futures::StreamExt;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::chat::conversation::ExchangeGuard;
use crate::chat::frame::{Frame, FrameDecoder};
use crate::chat::transport::ChatTransport;
use crate::chat::turn::{ChatRequest, Turn};
use crate::error::ClientError;

/// Prefix put in front of a server-reported error in the assistant turn
pub const ERROR_PREFIX: &str = "Error: ";

/// Lifecycle of one streaming exchange
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Idle,
    Active,
    Completed,
    Failed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Render sink for a streaming reply.
///
/// Both callbacks run synchronously on the task driving the session, in the
/// order the frames were decoded.
pub trait StreamObserver: Send {
    /// One applied delta; `turn` already includes it
    fn on_delta(&mut self, delta: &str, turn: &Turn);

    /// The session reached a terminal state
    fn on_finish(&mut self, status: SessionStatus, turn: &Turn);
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NoopObserver;

impl StreamObserver for NoopObserver {
    fn on_delta(&mut self, _delta: &str, _turn: &Turn) {}

    fn on_finish(&mut self, _status: SessionStatus, _turn: &Turn) {}
}

/// Outcome of a finished session.
///
/// A report handed out by a conversation keeps that conversation streaming
/// until it is settled or dropped.
#[derive(Debug)]
pub struct SessionReport {
    pub status: SessionStatus,
    pub turn: Turn,
    pub deltas_applied: usize,
    pub(crate) guard: Option<ExchangeGuard>,
}

/// One send-and-receive exchange.
///
/// The session owns the in-progress assistant turn until [`StreamSession::run`]
/// returns it inside the report.
pub struct StreamSession {
    request: ChatRequest,
    turn: Turn,
    transport: Arc<dyn ChatTransport>,
    cancel: CancellationToken,
    idle_timeout: Duration,
    connection_error_message: String,
    deltas_applied: usize,
    guard: Option<ExchangeGuard>,
}

impl StreamSession {
    pub(crate) fn new(
        request: ChatRequest,
        turn: Turn,
        transport: Arc<dyn ChatTransport>,
        idle_timeout: Duration,
        connection_error_message: String,
    ) -> Self {
        Self {
            request,
            turn,
            transport,
            cancel: CancellationToken::new(),
            idle_timeout,
            connection_error_message,
            deltas_applied: 0,
            guard: None,
        }
    }

    /// Tie the session to a conversation slot; dropping it unfinished frees the slot
    pub(crate) fn with_guard(mut self, guard: ExchangeGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn turn_id(&self) -> &str {
        &self.turn.id
    }

    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    /// Handle for cancelling from another task. Cancelling after the session
    /// finished has no effect.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Drive the exchange to a terminal state. Never fails: every error ends
    /// up as the report's status plus a message in the assistant turn.
    pub async fn run(mut self, observer: &mut dyn StreamObserver) -> SessionReport {
        let status = self.drive(observer).await;
        observer.on_finish(status, &self.turn);

        SessionReport {
            status,
            turn: self.turn,
            deltas_applied: self.deltas_applied,
            guard: self.guard,
        }
    }

    async fn drive(&mut self, observer: &mut dyn StreamObserver) -> SessionStatus {
        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = self.transport.open(&self.request) => Some(result),
        };

        let mut body = match opened {
            None => return self.cancelled(),
            Some(Ok(body)) => body,
            Some(Err(e)) => return self.transport_failed(&e),
        };

        let mut decoder = FrameDecoder::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                next = tokio::time::timeout(self.idle_timeout, body.next()) => Some(next),
            };

            let chunk = match next {
                None => return self.cancelled(),
                Some(Err(_elapsed)) => {
                    let err = ClientError::TimeoutError(format!(
                        "no data received for {}s",
                        self.idle_timeout.as_secs()
                    ));
                    return self.transport_failed(&err);
                }
                Some(Ok(None)) => {
                    decoder.finish();
                    warn!(
                        "[chat] Stream for turn {} ended without [DONE]",
                        self.turn.id
                    );
                    return SessionStatus::Completed;
                }
                Some(Ok(Some(Err(e)))) => return self.transport_failed(&e),
                Some(Ok(Some(Ok(bytes)))) => bytes,
            };

            for frame in decoder.push(&chunk) {
                if self.cancel.is_cancelled() {
                    return self.cancelled();
                }

                match frame {
                    Frame::Delta(text) => {
                        self.turn.content.push_str(&text);
                        self.deltas_applied += 1;
                        observer.on_delta(&text, &self.turn);
                    }
                    Frame::Error(message) => {
                        error!("[chat] Server reported error: {}", message);
                        self.turn.content = format!("{}{}", ERROR_PREFIX, message);
                        return SessionStatus::Failed;
                    }
                    Frame::Done => {
                        debug!(
                            "[chat] Turn {} completed after {} deltas",
                            self.turn.id, self.deltas_applied
                        );
                        return SessionStatus::Completed;
                    }
                    Frame::Malformed(payload) => {
                        debug!("[chat] Ignoring malformed frame: {}", payload);
                    }
                }
            }
        }
    }

    fn cancelled(&self) -> SessionStatus {
        info!(
            "[chat] Turn {} cancelled after {} deltas",
            self.turn.id, self.deltas_applied
        );
        SessionStatus::Cancelled
    }

    fn transport_failed(&mut self, err: &ClientError) -> SessionStatus {
        let kind = if err.is_transport() { "transport" } else { "request" };
        error!("[chat] Chat stream {} failure: {}", kind, err);
        self.turn.content = self.connection_error_message.clone();
        SessionStatus::Failed
    }
}
