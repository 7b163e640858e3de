//! YouTube Data API v3 access
//!
//! [`ChannelApi`] is the seam between the fetch pipeline and the network:
//! the three read operations the pipeline needs, nothing more.
//! [`DataApiClient`] implements it over HTTPS with an API key attached to
//! every request.

use crate::error::{DashError, Result};
use crate::types::Config;
use serde::Deserialize;
use std::fmt;

/// Upstream page and batch ceiling
pub const MAX_RESULTS: usize = 50;

// ============================================
// Response Models
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub items: Vec<ChannelResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResource {
    pub id: String,
    pub snippet: ChannelSnippet,
    #[serde(default)]
    pub statistics: Option<ChannelStatistics>,
    #[serde(default)]
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelSnippet {
    pub title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub view_count: Option<String>,
    pub subscriber_count: Option<String>,
    pub video_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Highest resolution available, empty if none
    pub fn best_url(&self) -> String {
        self.high
            .as_ref()
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItemResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemResource {
    pub snippet: PlaylistItemSnippet,
    pub content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    #[serde(default)]
    pub title: String,
    /// Kept as a string: parsing is lenient and happens later
    #[serde(default)]
    pub published_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
pub struct VideoResource {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<VideoSnippet>,
    #[serde(default)]
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
pub struct VideoSnippet {
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Counts arrive as decimal strings and may be hidden
pub fn parse_count(value: Option<&String>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

// ============================================
// Client
// ============================================

/// The three upstream reads the fetch pipeline depends on
#[allow(async_fn_in_trait)]
pub trait ChannelApi {
    /// Snippet, statistics and content details of one channel
    async fn channel(&self, channel_id: &str) -> Result<ChannelListResponse>;

    /// One page of a playlist; `None` requests the first page
    async fn playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse>;

    /// Snippet and statistics for at most [`MAX_RESULTS`] ids
    async fn videos(&self, video_ids: &[String]) -> Result<VideoListResponse>;
}

/// HTTPS client for the YouTube Data API
pub struct DataApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl fmt::Debug for DataApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataApiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl DataApiClient {
    pub fn new(config: &Config, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key,
            page_size: config.page_size.clamp(1, MAX_RESULTS as u32),
        }
    }

    fn build_channel_url(&self, channel_id: &str) -> String {
        format!(
            "{}/channels?part=snippet,statistics,contentDetails&id={}&key={}",
            self.base_url,
            urlencoding::encode(channel_id),
            urlencoding::encode(&self.api_key)
        )
    }

    fn build_playlist_items_url(&self, playlist_id: &str, page_token: Option<&str>) -> String {
        let mut url = format!(
            "{}/playlistItems?part=contentDetails,snippet&maxResults={}&playlistId={}&key={}",
            self.base_url,
            self.page_size,
            urlencoding::encode(playlist_id),
            urlencoding::encode(&self.api_key)
        );
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }
        url
    }

    fn build_videos_url(&self, video_ids: &[String]) -> String {
        format!(
            "{}/videos?part=snippet,statistics&id={}&key={}",
            self.base_url,
            urlencoding::encode(&video_ids.join(",")),
            urlencoding::encode(&self.api_key)
        )
    }

    /// GET and decode, turning non-2xx replies into [`DashError::Api`]
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
            return Err(DashError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl ChannelApi for DataApiClient {
    async fn channel(&self, channel_id: &str) -> Result<ChannelListResponse> {
        self.get_json(&self.build_channel_url(channel_id)).await
    }

    async fn playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse> {
        self.get_json(&self.build_playlist_items_url(playlist_id, page_token))
            .await
    }

    async fn videos(&self, video_ids: &[String]) -> Result<VideoListResponse> {
        if video_ids.is_empty() {
            return Ok(VideoListResponse::default());
        }
        self.get_json(&self.build_videos_url(video_ids)).await
    }
}
