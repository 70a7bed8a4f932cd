// Copyright (c) 2025 ByteDance Ltd. and/or its affiliates
// SPDX-License-Identifier: MIT

pub mod app;
pub mod event;
pub mod layout;
pub mod settings;
pub mod state;

pub use app::App;
pub use event::{ChannelObserver, Event, EventHandler};
pub use layout::Layout;
pub use settings::UserSettings;
pub use state::{AppState, StatusDisplay};
