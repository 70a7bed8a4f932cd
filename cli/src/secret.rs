// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

//! Line input that is never echoed, for passwords.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::io::{self, Write};

#[derive(Debug, PartialEq, Eq)]
pub enum SecretKey {
    Continue,
    Submit,
    Abort,
}

/// Apply one key press to the hidden buffer
pub fn apply_secret_key(buffer: &mut String, key: KeyEvent) -> SecretKey {
    if key.kind == KeyEventKind::Release {
        return SecretKey::Continue;
    }

    match key.code {
        KeyCode::Enter => SecretKey::Submit,
        KeyCode::Esc => SecretKey::Abort,
        KeyCode::Char('c') | KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SecretKey::Abort
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            SecretKey::Continue
        }
        KeyCode::Backspace => {
            buffer.pop();
            SecretKey::Continue
        }
        _ => SecretKey::Continue,
    }
}

/// Prompt for a value with echo off. Empty input is an error.
pub fn read_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    enable_raw_mode()?;
    let result = read_secret_keys();
    disable_raw_mode()?;
    println!();

    let value = result?;
    if value.is_empty() {
        anyhow::bail!("{} is required", label);
    }
    Ok(value)
}

fn read_secret_keys() -> Result<String> {
    let mut buffer = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            match apply_secret_key(&mut buffer, key) {
                SecretKey::Continue => {}
                SecretKey::Submit => return Ok(buffer),
                SecretKey::Abort => anyhow::bail!("Input cancelled"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut buffer = String::new();
        for c in "hunter2x".chars() {
            assert_eq!(apply_secret_key(&mut buffer, press(KeyCode::Char(c))), SecretKey::Continue);
        }
        apply_secret_key(&mut buffer, press(KeyCode::Backspace));

        assert_eq!(buffer, "hunter2");
        assert_eq!(apply_secret_key(&mut buffer, press(KeyCode::Enter)), SecretKey::Submit);
    }

    #[test]
    fn test_abort_keys() {
        let mut buffer = String::from("partial");

        assert_eq!(apply_secret_key(&mut buffer, press(KeyCode::Esc)), SecretKey::Abort);
        assert_eq!(
            apply_secret_key(&mut buffer, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            SecretKey::Abort
        );
        assert_eq!(buffer, "partial");
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut buffer = String::new();
        let mut key = press(KeyCode::Char('a'));
        key.kind = KeyEventKind::Release;

        assert_eq!(apply_secret_key(&mut buffer, key), SecretKey::Continue);
        assert!(buffer.is_empty());
    }
}
