// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use anyhow::Result;
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io;
use vertex_core::chat::Conversation;

use super::{
    event::{ChannelObserver, Event, EventHandler},
    layout::Layout,
    state::AppState,
};

const HELP_TEXT: [&str; 12] = [
    "Commands:",
    "  /help  - Show this help message",
    "  /clear - Start a fresh conversation (not while a reply is streaming)",
    "  /quit  - Exit",
    "Keys:",
    "  Enter      - Send the message",
    "  Esc        - Stop the streaming reply, or quit when idle",
    "  Ctrl+C/Q   - Quit",
    "  ↑/↓        - Scroll the conversation",
    "  ←/→        - Move the cursor",
    "Ask about holdings, watchlist symbols or market moves.",
    "",
];

pub struct App {
    state: AppState,
    event_handler: EventHandler,
    conversation: Conversation,
}

impl App {
    pub fn new(conversation: Conversation, endpoint: String, signed_in: bool) -> Self {
        Self {
            state: AppState::new(endpoint, signed_in),
            event_handler: EventHandler::new(),
            conversation,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.event_handler.start_event_loop().await;

        let result = self.run_app(&mut terminal).await;

        self.event_handler.stop().await;
        // the reply task must not outlive the screen it draws on
        self.conversation.cancel();

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|frame| {
                Layout::render(frame, &mut self.state, self.conversation.turns());
            })?;

            if let Some(event) = self.event_handler.next().await {
                self.handle_event(event);
            }

            if self.state.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event),
            Event::StreamDelta { turn_id, content } => {
                self.state.apply_delta(&turn_id, content);
            }
            Event::StreamFinished(report) => {
                let status = report.status;
                self.conversation.settle(report);
                self.state.finish_stream(status);
            }
            Event::Tick => {}
        }
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }

        match key_event.code {
            KeyCode::Char('c') | KeyCode::Char('q')
                if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.conversation.cancel();
                self.state.should_quit = true;
            }
            KeyCode::Esc => {
                if self.conversation.is_streaming() {
                    info!("Stopping reply on user request");
                    self.conversation.cancel();
                } else {
                    self.state.should_quit = true;
                }
            }
            KeyCode::Enter => {
                let text = self.state.input_text.clone();
                self.submit(&text);
            }
            KeyCode::Char(c) => self.state.insert_char(c),
            KeyCode::Backspace => self.state.delete_char(),
            KeyCode::Left => self.state.move_cursor_left(),
            KeyCode::Right => self.state.move_cursor_right(),
            KeyCode::Up => self.state.scroll_up(),
            KeyCode::Down => self.state.scroll_down(),
            _ => {}
        }
    }

    fn submit(&mut self, text: &str) {
        match text.trim() {
            "/help" => {
                self.state.clear_input();
                for line in HELP_TEXT {
                    self.state.add_notice(line);
                }
            }
            "/clear" => {
                self.state.clear_input();
                if self.conversation.clear() {
                    self.state.clear_transcript();
                } else {
                    self.state
                        .add_notice("Wait for the reply to finish (or press Esc) before clearing.");
                }
            }
            "/quit" | "/exit" => {
                self.conversation.cancel();
                self.state.should_quit = true;
            }
            _ => self.send(text),
        }
    }

    /// Blank input or a reply in flight leaves the input box untouched
    fn send(&mut self, text: &str) {
        let Some(session) = self.conversation.send(text) else {
            return;
        };

        self.state.clear_input();
        self.state.begin_stream(session.turn_id().to_string());

        let tx = self.event_handler.sender();
        tokio::spawn(async move {
            let mut observer = ChannelObserver::new(tx.clone());
            let report = session.run(&mut observer).await;
            let _ = tx.send(Event::StreamFinished(report));
        });
    }
}
