// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;

#[cfg(test)]
mod test_support;

pub use auth::*;
pub use chat::*;
pub use config::*;
pub use error::*;
