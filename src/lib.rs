//! yt-dash library
//!
//! Credential validation and the channel fetch pipeline, plus the thin
//! terminal layer the `yt-dash` binary drives.

pub mod core;
pub mod error;
pub mod storage;
pub mod types;
pub mod ui;
pub mod utils;
