// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Rect},
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use vertex_core::chat::Turn;

use super::state::{AppState, LineKind, StatusDisplay, TranscriptLine};

pub struct Layout;

impl Layout {
    /// Main layout, top to bottom:
    /// - conversation
    /// - session status and backend
    /// - input box
    /// - shortcuts
    pub fn render(frame: &mut Frame, state: &mut AppState, turns: &[Turn]) {
        let size = frame.area();

        let chunks = ratatui::layout::Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(size);

        Self::render_conversation_area(frame, chunks[0], state, turns);
        Self::render_status_area(frame, chunks[1], state);
        Self::render_input_area(frame, chunks[2], state);
        Self::render_shortcuts_area(frame, chunks[3]);
    }

    fn render_conversation_area(frame: &mut Frame, area: Rect, state: &mut AppState, turns: &[Turn]) {
        let inner_width = area.width.saturating_sub(2) as usize;
        let inner_height = area.height.saturating_sub(2) as usize;

        let transcript = state.transcript(turns, inner_width);
        let first = state.first_visible_line(transcript.len(), inner_height);

        let lines: Vec<Line> = transcript
            .iter()
            .skip(first)
            .take(inner_height)
            .map(styled_line)
            .collect();

        let title = if state.scroll_offset > 0 {
            format!("Vertex AI Assistant (↑{})", state.scroll_offset)
        } else {
            "Vertex AI Assistant".to_string()
        };

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );

        frame.render_widget(paragraph, area);
    }

    fn render_status_area(frame: &mut Frame, area: Rect, state: &AppState) {
        let status_chunks = ratatui::layout::Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let status = state.display_status();
        let status_paragraph = Paragraph::new(format!("Status: {}", status.display()))
            .block(
                Block::default()
                    .title("Session")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(status.color()));

        frame.render_widget(status_paragraph, status_chunks[0]);

        let account = if state.signed_in { "signed in" } else { "guest" };
        let backend_paragraph = Paragraph::new(format!("{} | {}", state.endpoint, account))
            .block(
                Block::default()
                    .title("Backend")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(backend_paragraph, status_chunks[1]);
    }

    fn render_input_area(frame: &mut Frame, area: Rect, state: &AppState) {
        let input_paragraph = Paragraph::new(state.input_text.as_str())
            .block(
                Block::default()
                    .title("Ask about your portfolio")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Magenta)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(input_paragraph, area);

        if area.width > 2 {
            let max_x = area.width.saturating_sub(2);
            frame.set_cursor_position(Position {
                x: area.x + 1 + (state.input_cursor as u16).min(max_x),
                y: area.y + 1,
            });
        }
    }

    fn render_shortcuts_area(frame: &mut Frame, area: Rect) {
        let shortcuts = "Enter: Send | Esc: Stop reply / Quit | Ctrl+C: Quit | ↑/↓: Scroll | /help";
        let paragraph = Paragraph::new(shortcuts).style(Style::default().fg(Color::Gray));

        frame.render_widget(paragraph, area);
    }
}

fn styled_line(line: &TranscriptLine) -> Line<'static> {
    let style = match line.kind {
        LineKind::UserHeader => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        LineKind::AssistantHeader => Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        LineKind::Body | LineKind::Blank => Style::default().fg(Color::White),
        LineKind::Typing => Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        LineKind::Notice => Style::default().fg(Color::Yellow),
    };
    Line::styled(line.text.clone(), style)
}
