// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

pub mod client;
pub mod credentials;

pub use client::{AuthClient, AuthUser};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
