//! Type definitions for yt-dash
//!
//! Source of truth for all data structures.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================
// Credential Types
// ============================================

/// Which credential a raw input string is supposed to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    ApiKey,
    ChannelId,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::ApiKey => write!(f, "API Key"),
            CredentialKind::ChannelId => write!(f, "Channel ID"),
        }
    }
}

// ============================================
// Channel Types
// ============================================

/// A channel, as returned by a successful lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub title: String,
    pub thumbnail: String,
    pub subscribers: u64,
    pub total_views: u64,
    pub video_count: u64,
    /// Uploads playlist, e.g. "UU..." for channel "UC..."
    pub uploads_playlist: String,
}

impl ChannelRecord {
    /// Attribute mapping handed to the presentation layer
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("thumbnail", self.thumbnail.clone()),
            ("subscribers", self.subscribers.to_string()),
            ("total_views", self.total_views.to_string()),
            ("video_count", self.video_count.to_string()),
        ]
    }
}

// ============================================
// Video Types
// ============================================

/// One entry of the uploads list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoStub {
    pub video_id: String,
    pub title: String,
    /// Raw from YouTube, e.g. "2024-03-01T12:00:00Z"
    pub published_raw: String,
    /// None when the raw value is not a strict UTC timestamp
    pub published_at: Option<NaiveDateTime>,
    /// "2024-03-01", or the raw string when parsing failed
    pub published_display: String,
}

/// Per-video statistics from the batched detail lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoStatistics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub thumbnail: String,
    pub tags: Vec<String>,
}

/// A row of the output table: stub merged with its statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRow {
    pub thumbnail: String,
    pub title: String,
    pub published: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub video_id: String,
    pub published_at: Option<NaiveDateTime>,
    pub tags: Vec<String>,
    /// False when no statistics came back for this video; counts are then zero
    pub stats_available: bool,
}

impl VideoRow {
    pub fn merge(stub: VideoStub, stats: Option<VideoStatistics>) -> Self {
        let stats_available = stats.is_some();
        let stats = stats.unwrap_or_default();
        Self {
            thumbnail: stats.thumbnail,
            title: stub.title,
            published: stub.published_display,
            views: stats.views,
            likes: stats.likes,
            comments: stats.comments,
            video_id: stub.video_id,
            published_at: stub.published_at,
            tags: stats.tags,
            stats_available,
        }
    }
}

/// Everything one submission produced, owned by the caller for the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    pub channel: ChannelRecord,
    pub videos: Vec<VideoRow>,
}

// ============================================
// Config Types
// ============================================

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API root
    pub api_base_url: String,
    /// Uploads list page size (API max: 50)
    pub page_size: u32,
    /// Video ids per statistics request (API max: 50)
    pub batch_size: usize,
    /// Rows shown in the terminal table (default: 20)
    pub rows: usize,
    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
    /// Editor command (default: "nvim")
    pub editor: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/youtube/v3".into(),
            page_size: 50,
            batch_size: 50,
            rows: 20,
            log_level: "info".into(),
            editor: "nvim".into(),
        }
    }
}
