// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use crossterm::event::{self, KeyEvent};
use log::debug;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use vertex_core::chat::{SessionReport, SessionStatus, StreamObserver, Turn};

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick,
    /// The assistant turn grew; carries its full content so far
    StreamDelta { turn_id: String, content: String },
    StreamFinished(SessionReport),
}

pub struct EventHandler {
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,
    event_loop_handle: Option<JoinHandle<()>>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            event_tx,
            event_rx,
            event_loop_handle: None,
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.event_tx.clone()
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    pub async fn start_event_loop(&mut self) {
        let tx = self.event_tx.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(50));

            loop {
                interval.tick().await;

                // drain every pending key so typing never lags behind the tick
                while event::poll(Duration::from_millis(0)).unwrap_or(false) {
                    if let Ok(event::Event::Key(key_event)) = event::read() {
                        if tx.send(Event::Key(key_event)).is_err() {
                            return;
                        }
                    }
                }

                if tx.send(Event::Tick).is_err() {
                    return;
                }
            }
        });

        self.event_loop_handle = Some(handle);
    }

    pub async fn stop(&mut self) {
        if let Some(handle) = self.event_loop_handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards stream progress into the UI event queue
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { tx }
    }
}

impl StreamObserver for ChannelObserver {
    fn on_delta(&mut self, _delta: &str, turn: &Turn) {
        let _ = self.tx.send(Event::StreamDelta {
            turn_id: turn.id.clone(),
            content: turn.content.clone(),
        });
    }

    fn on_finish(&mut self, status: SessionStatus, turn: &Turn) {
        debug!("Reply {} finished as {}", turn.id, status);
    }
}
