// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use ratatui::style::Color;
use vertex_core::chat::{SessionStatus, Turn, TurnRole};

pub const TYPING_INDICATOR: &str = "typing...";

/// Display helpers for the session lifecycle
pub trait StatusDisplay {
    fn display(&self) -> &'static str;
    fn color(&self) -> Color;
}

impl StatusDisplay for SessionStatus {
    fn display(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "Ready",
            SessionStatus::Active => "Streaming reply",
            SessionStatus::Completed => "Reply complete",
            SessionStatus::Failed => "Reply failed",
            SessionStatus::Cancelled => "Reply cancelled",
        }
    }

    fn color(&self) -> Color {
        match self {
            SessionStatus::Idle => Color::Gray,
            SessionStatus::Active => Color::Yellow,
            SessionStatus::Completed => Color::Green,
            SessionStatus::Failed => Color::Red,
            SessionStatus::Cancelled => Color::Magenta,
        }
    }
}

/// What kind of line the transcript holds, for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    UserHeader,
    AssistantHeader,
    Body,
    Typing,
    Notice,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub kind: LineKind,
    pub text: String,
}

impl TranscriptLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Text of the reply currently streaming in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingReply {
    pub turn_id: String,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub status: SessionStatus,

    /// Outcome of the last reply, shown until the next send
    pub last_outcome: Option<SessionStatus>,

    pub streaming: Option<StreamingReply>,

    /// Local messages such as help text; never sent to the backend
    pub notices: Vec<String>,

    pub input_text: String,

    /// Cursor position in chars, not bytes
    pub input_cursor: usize,

    pub should_quit: bool,

    /// Lines scrolled up from the bottom; 0 follows new output
    pub scroll_offset: usize,

    /// Backend endpoint and sign-in state, for the status bar
    pub endpoint: String,
    pub signed_in: bool,
}

impl AppState {
    pub fn new(endpoint: String, signed_in: bool) -> Self {
        Self {
            endpoint,
            signed_in,
            ..Self::default()
        }
    }

    pub fn begin_stream(&mut self, turn_id: String) {
        self.streaming = Some(StreamingReply {
            turn_id,
            content: String::new(),
        });
        self.status = SessionStatus::Active;
        self.last_outcome = None;
        self.scroll_offset = 0;
    }

    /// Ignores updates for a reply that is no longer streaming
    pub fn apply_delta(&mut self, turn_id: &str, content: String) {
        if let Some(streaming) = self.streaming.as_mut() {
            if streaming.turn_id == turn_id {
                streaming.content = content;
            }
        }
    }

    pub fn finish_stream(&mut self, outcome: SessionStatus) {
        self.streaming = None;
        self.status = SessionStatus::Idle;
        self.last_outcome = Some(outcome);
    }

    pub fn add_notice(&mut self, line: impl Into<String>) {
        self.notices.push(line.into());
        self.scroll_offset = 0;
    }

    pub fn clear_transcript(&mut self) {
        self.notices.clear();
        self.last_outcome = None;
        self.scroll_offset = 0;
    }

    /// Status shown in the status bar
    pub fn display_status(&self) -> SessionStatus {
        match (self.status, self.last_outcome) {
            (SessionStatus::Idle, Some(outcome)) => outcome,
            (status, _) => status,
        }
    }

    pub fn clear_input(&mut self) {
        self.input_text.clear();
        self.input_cursor = 0;
    }

    fn byte_offset(&self, cursor: usize) -> usize {
        self.input_text
            .char_indices()
            .nth(cursor)
            .map(|(offset, _)| offset)
            .unwrap_or(self.input_text.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let offset = self.byte_offset(self.input_cursor);
        self.input_text.insert(offset, c);
        self.input_cursor += 1;
    }

    pub fn delete_char(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let offset = self.byte_offset(self.input_cursor);
            self.input_text.remove(offset);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.input_cursor < self.input_text.chars().count() {
            self.input_cursor += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Flatten the conversation into wrapped display lines
    pub fn transcript(&self, turns: &[Turn], width: usize) -> Vec<TranscriptLine> {
        let mut lines = Vec::new();

        for turn in turns {
            let (kind, who) = match turn.role {
                TurnRole::User => (LineKind::UserHeader, "You"),
                TurnRole::Assistant => (LineKind::AssistantHeader, "Vertex AI"),
            };
            let time = turn.created_at.with_timezone(&chrono::Local).format("%H:%M");
            lines.push(TranscriptLine::new(kind, format!("{} · {}", who, time)));

            let content = match &self.streaming {
                Some(streaming) if streaming.turn_id == turn.id => streaming.content.as_str(),
                _ => turn.content.as_str(),
            };
            let is_streaming = self
                .streaming
                .as_ref()
                .is_some_and(|streaming| streaming.turn_id == turn.id);

            if content.is_empty() && is_streaming {
                lines.push(TranscriptLine::new(LineKind::Typing, TYPING_INDICATOR));
            } else {
                for text in wrap_text(content, width) {
                    lines.push(TranscriptLine::new(LineKind::Body, text));
                }
            }
            lines.push(TranscriptLine::new(LineKind::Blank, ""));
        }

        for notice in &self.notices {
            for text in wrap_text(notice, width) {
                lines.push(TranscriptLine::new(LineKind::Notice, text));
            }
        }

        lines
    }

    /// First visible line for a viewport of `height`, clamping the scroll offset
    pub fn first_visible_line(&mut self, total: usize, height: usize) -> usize {
        let max_offset = total.saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
        max_offset - self.scroll_offset
    }
}

/// Hard-wrap text at `width` chars, keeping explicit line breaks
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for piece in chars.chunks(width) {
            lines.push(piece.iter().collect());
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_editing_with_multibyte_chars() {
        let mut state = AppState::default();

        for c in "₹50".chars() {
            state.insert_char(c);
        }
        assert_eq!(state.input_text, "₹50");
        assert_eq!(state.input_cursor, 3);

        state.move_cursor_left();
        state.move_cursor_left();
        state.insert_char('1');
        assert_eq!(state.input_text, "₹150");

        state.move_cursor_left();
        state.delete_char();
        assert_eq!(state.input_text, "150");
        assert_eq!(state.input_cursor, 0);

        state.delete_char();
        assert_eq!(state.input_text, "150");
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut state = AppState::default();
        state.insert_char('a');

        state.move_cursor_right();
        state.move_cursor_right();
        assert_eq!(state.input_cursor, 1);

        state.move_cursor_left();
        state.move_cursor_left();
        assert_eq!(state.input_cursor, 0);
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap_text("ab\n\ncd", 4), vec!["ab", "", "cd"]);
        assert_eq!(wrap_text("", 4), vec![""]);
        assert_eq!(wrap_text("₹₹₹", 2), vec!["₹₹", "₹"]);
    }

    #[test]
    fn test_transcript_shows_typing_then_content() {
        let mut state = AppState::default();
        let user = Turn::user("Hi");
        let reply = Turn::assistant("");
        let turns = vec![user, reply.clone()];

        state.begin_stream(reply.id.clone());
        let lines = state.transcript(&turns, 80);
        assert!(lines.iter().any(|l| l.kind == LineKind::Typing));

        state.apply_delta(&reply.id, "Hel".to_string());
        let lines = state.transcript(&turns, 80);
        assert!(lines.iter().all(|l| l.kind != LineKind::Typing));
        assert!(lines.iter().any(|l| l.kind == LineKind::Body && l.text == "Hel"));
    }

    #[test]
    fn test_stale_delta_is_ignored() {
        let mut state = AppState::default();
        state.begin_stream("current".to_string());

        state.apply_delta("previous", "old".to_string());

        assert_eq!(state.streaming.as_ref().unwrap().content, "");
    }

    #[test]
    fn test_status_after_finish() {
        let mut state = AppState::default();
        state.begin_stream("turn".to_string());
        assert_eq!(state.display_status(), SessionStatus::Active);

        state.finish_stream(SessionStatus::Cancelled);

        assert!(state.streaming.is_none());
        assert_eq!(state.status, SessionStatus::Idle);
        assert_eq!(state.display_status(), SessionStatus::Cancelled);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut state = AppState::default();
        for _ in 0..50 {
            state.scroll_up();
        }

        assert_eq!(state.first_visible_line(30, 10), 0);
        assert_eq!(state.scroll_offset, 20);

        state.scroll_down();
        assert_eq!(state.first_visible_line(30, 10), 1);

        state.scroll_offset = 0;
        assert_eq!(state.first_visible_line(30, 10), 20);
        assert_eq!(state.first_visible_line(5, 10), 0);
    }
}
