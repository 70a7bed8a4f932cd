// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

pub mod conversation;
pub mod frame;
pub mod session;
pub mod transport;
pub mod turn;

pub use conversation::Conversation;
pub use frame::{Frame, FrameDecoder};
pub use session::{NoopObserver, SessionReport, SessionStatus, StreamObserver, StreamSession};
pub use transport::{ByteStream, ChatTransport, HttpChatTransport};
pub use turn::{ChatRequest, Turn, TurnRole, WireMessage, WireRole};
