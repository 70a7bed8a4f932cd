// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

//! Line-oriented decoding of the chat event stream.
//!
//! The backend writes one event per line:
//!
//! ```text
//! data: {"chunk":"Hel"}
//!
//! data: {"chunk":"lo"}
//!
//! data: [DONE]
//! ```
//!
//! Network reads split those lines at arbitrary byte offsets, so the decoder
//! keeps whatever follows the last newline until the rest of the line arrives.

use log::trace;
use serde::Deserialize;

/// Prefix marking a line as an event frame
pub const DATA_PREFIX: &str = "data: ";

/// Payload that ends the logical stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// One decoded protocol unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A fragment of reply text
    Delta(String),
    /// Server-reported failure; ends the session
    Error(String),
    /// The `[DONE]` sentinel
    Done,
    /// Payload that is not a recognizable event; carries the raw payload
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    chunk: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl Frame {
    /// Parse a complete line. Returns `None` for lines that are not frames.
    pub fn from_line(line: &str) -> Option<Frame> {
        let payload = line.strip_prefix(DATA_PREFIX)?;
        Some(Self::from_payload(payload))
    }

    fn from_payload(payload: &str) -> Frame {
        if payload == DONE_SENTINEL {
            return Frame::Done;
        }

        match serde_json::from_str::<EventPayload>(payload) {
            Ok(EventPayload {
                error: Some(error), ..
            }) if !error.is_empty() => Frame::Error(error),
            Ok(EventPayload {
                chunk: Some(chunk), ..
            }) if !chunk.is_empty() => Frame::Delta(chunk),
            _ => Frame::Malformed(payload.to_string()),
        }
    }
}

/// Incremental decoder from raw body bytes to frames
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    finished: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the sentinel was seen or the stream was finalized
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Bytes held back waiting for a newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Feed the next chunk and collect every frame it completes.
    ///
    /// Lines are cut on the newline byte before any text decoding happens; that
    /// byte never occurs inside a multi-byte UTF-8 sequence, so a character
    /// split between two chunks stays in the carry-over until it is whole.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        if self.finished {
            return frames;
        }

        self.buffer.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            let frame = Self::decode_line(&self.buffer[start..end]);
            start = end + 1;

            if let Some(frame) = frame {
                let done = frame == Frame::Done;
                frames.push(frame);
                if done {
                    self.finished = true;
                    self.buffer.clear();
                    return frames;
                }
            }
        }

        self.buffer.drain(..start);
        frames
    }

    /// Signal the end of the body. An unterminated trailing line is dropped.
    pub fn finish(&mut self) {
        if !self.buffer.is_empty() {
            trace!(
                "Discarding {} unterminated bytes at end of stream",
                self.buffer.len()
            );
        }
        self.buffer.clear();
        self.finished = true;
    }

    fn decode_line(raw: &[u8]) -> Option<Frame> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let line = String::from_utf8_lossy(raw);
        let frame = Frame::from_line(&line);
        if frame.is_none() && !line.is_empty() {
            trace!("Ignoring non-frame line: {:?}", line);
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "data: {\"chunk\":\"Hel\"}\n\ndata: {\"chunk\":\"lo \u{20b9}\"}\n\ndata: {\"chunk\":\" \u{1f4c8}\"}\n\ndata: [DONE]\n";

    fn decode_all(chunks: &[&[u8]]) -> Vec<Frame> {
        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();
        for chunk in chunks {
            frames.extend(decoder.push(chunk));
        }
        decoder.finish();
        frames
    }

    fn expected_sample() -> Vec<Frame> {
        vec![
            Frame::Delta("Hel".to_string()),
            Frame::Delta("lo \u{20b9}".to_string()),
            Frame::Delta(" \u{1f4c8}".to_string()),
            Frame::Done,
        ]
    }

    #[test]
    fn test_parse_frame_shapes() {
        assert_eq!(
            Frame::from_line(r#"data: {"chunk":"Hello"}"#),
            Some(Frame::Delta("Hello".to_string()))
        );
        assert_eq!(
            Frame::from_line(r#"data: {"error":"quota exceeded"}"#),
            Some(Frame::Error("quota exceeded".to_string()))
        );
        assert_eq!(Frame::from_line("data: [DONE]"), Some(Frame::Done));
        assert_eq!(
            Frame::from_line("data: {invalid json}"),
            Some(Frame::Malformed("{invalid json}".to_string()))
        );
        assert_eq!(Frame::from_line("event: message"), None);
        assert_eq!(Frame::from_line(": keepalive"), None);
        assert_eq!(Frame::from_line(""), None);
        // prefix must include the space
        assert_eq!(Frame::from_line(r#"data:{"chunk":"x"}"#), None);
    }

    #[test]
    fn test_error_wins_over_chunk() {
        assert_eq!(
            Frame::from_line(r#"data: {"chunk":"a","error":"boom"}"#),
            Some(Frame::Error("boom".to_string()))
        );
    }

    #[test]
    fn test_unrecognized_payloads_are_malformed() {
        for payload in [r#"{}"#, r#"{"chunk":""}"#, r#"{"chunk":42}"#, "null", r#""text""#, "[DONE] "] {
            let line = format!("{}{}", DATA_PREFIX, payload);
            assert_eq!(
                Frame::from_line(&line),
                Some(Frame::Malformed(payload.to_string())),
                "payload {:?}",
                payload
            );
        }
    }

    #[test]
    fn test_single_chunk() {
        assert_eq!(decode_all(&[SAMPLE.as_bytes()]), expected_sample());
    }

    #[test]
    fn test_every_split_point_yields_same_frames() {
        let bytes = SAMPLE.as_bytes();
        for split in 0..=bytes.len() {
            let (head, tail) = bytes.split_at(split);
            assert_eq!(decode_all(&[head, tail]), expected_sample(), "split at {}", split);
        }
    }

    #[test]
    fn test_one_byte_at_a_time() {
        let bytes = SAMPLE.as_bytes();
        let chunks: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(decode_all(&chunks), expected_sample());
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let line = "data: {\"chunk\":\"\u{20b9}\"}\n".as_bytes();
        // the rupee sign is three bytes; cut between its first and second byte
        let cut = line.iter().position(|b| *b == 0xE2).unwrap() + 1;
        let mut decoder = FrameDecoder::new();

        assert!(decoder.push(&line[..cut]).is_empty());
        assert_eq!(
            decoder.push(&line[cut..]),
            vec![Frame::Delta("\u{20b9}".to_string())]
        );
    }

    #[test]
    fn test_noise_lines_do_not_change_frames() {
        let noisy = "\n\n: keepalive\nevent: message\ndata: {\"chunk\":\"Hel\"}\nid: 1\n\n\ndata: {\"chunk\":\"lo \u{20b9}\"}\nretry: 100\n\ndata: {\"chunk\":\" \u{1f4c8}\"}\n\n\ndata: [DONE]\n";
        assert_eq!(decode_all(&[noisy.as_bytes()]), expected_sample());
    }

    #[test]
    fn test_crlf_lines() {
        let crlf = SAMPLE.replace('\n', "\r\n");
        assert_eq!(decode_all(&[crlf.as_bytes()]), expected_sample());
    }

    #[test]
    fn test_nothing_after_sentinel() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"data: {\"chunk\":\"a\"}\ndata: [DONE]\ndata: {\"chunk\":\"b\"}\n");

        assert_eq!(frames, vec![Frame::Delta("a".to_string()), Frame::Done]);
        assert!(decoder.is_finished());
        assert!(decoder.push(b"data: {\"chunk\":\"c\"}\n").is_empty());
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_unterminated_tail_is_discarded() {
        let mut decoder = FrameDecoder::new();
        assert_eq!(
            decoder.push(b"data: {\"chunk\":\"a\"}\ndata: {\"chunk\":\"b\"}"),
            vec![Frame::Delta("a".to_string())]
        );
        assert!(decoder.pending() > 0);

        decoder.finish();
        assert_eq!(decoder.pending(), 0);
        assert!(decoder.push(b"\n").is_empty());
    }

    #[test]
    fn test_malformed_frame_between_valid_frames() {
        let frames = decode_all(&[b"data: {\"chunk\":\"a\"}\ndata: {oops\ndata: {\"chunk\":\"b\"}\n"]);
        assert_eq!(
            frames,
            vec![
                Frame::Delta("a".to_string()),
                Frame::Malformed("{oops".to_string()),
                Frame::Delta("b".to_string()),
            ]
        );
    }
}
