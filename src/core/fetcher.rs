//! Channel data pipeline
//!
//! channel lookup -> paginated uploads listing -> batched statistics -> merge.
//! Calls are strictly sequential: listing pages chain on continuation
//! tokens, and statistics batches share one quota budget upstream.

use crate::core::youtube::{
    ChannelApi, DataApiClient, MAX_RESULTS, PlaylistItemResource, VideoResource, parse_count,
};
use crate::error::{FetchError, Result};
use crate::types::{ChannelRecord, Config, SessionResult, VideoRow, VideoStatistics, VideoStub};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Strict upstream timestamp format, e.g. "2024-03-01T12:00:00Z"
const PUBLISHED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Fetch everything for one channel with validated credentials.
///
/// The API key lives only inside the client built here and is dropped
/// when the fetch finishes.
pub async fn fetch(
    config: &Config,
    api_key: String,
    channel_id: &str,
) -> std::result::Result<SessionResult, FetchError> {
    let api = DataApiClient::new(config, api_key);
    fetch_with(&api, channel_id, config.batch_size).await
}

/// Run the pipeline against any [`ChannelApi`].
///
/// Returns the channel together with one row per listed video, or a typed
/// failure. Batch failures degrade rows; they never fail the whole fetch.
pub async fn fetch_with<A: ChannelApi>(
    api: &A,
    channel_id: &str,
    batch_size: usize,
) -> std::result::Result<SessionResult, FetchError> {
    let channel = lookup_channel(api, channel_id).await?;

    let stubs = match list_uploads(api, &channel.uploads_playlist).await {
        Ok(stubs) => stubs,
        Err(e) => {
            tracing::error!(error = %e.chain(), code = ?e.code(), "Unhandled error while listing uploads");
            return Err(FetchError::Unexpected);
        }
    };

    let ids: Vec<String> = stubs.iter().map(|s| s.video_id.clone()).collect();
    let stats = fetch_statistics(api, &ids, batch_size).await;
    let videos = merge(stubs, &stats);

    tracing::info!(
        videos = videos.len(),
        missing_stats = videos.iter().filter(|v| !v.stats_available).count(),
        "Fetched channel data"
    );

    Ok(SessionResult { channel, videos })
}

/// Look up the channel and its uploads list
pub async fn lookup_channel<A: ChannelApi>(
    api: &A,
    channel_id: &str,
) -> std::result::Result<ChannelRecord, FetchError> {
    let response = api.channel(channel_id).await.map_err(|e| {
        tracing::error!(error = %e.chain(), code = ?e.code(), "Channel lookup failed");
        FetchError::ChannelNotFound
    })?;

    let returned = response.items.len();
    let Some(item) = response.items.into_iter().find(|c| c.id == channel_id) else {
        tracing::warn!(returned, "Channel lookup returned no matching item");
        return Err(FetchError::ChannelNotFound);
    };

    let Some(uploads_playlist) = item
        .content_details
        .and_then(|d| d.related_playlists.uploads)
        .filter(|u| !u.is_empty())
    else {
        tracing::warn!("Channel has no uploads playlist");
        return Err(FetchError::ChannelNotFound);
    };

    let stats = item.statistics.unwrap_or_default();
    Ok(ChannelRecord {
        title: item.snippet.title,
        thumbnail: item.snippet.thumbnails.best_url(),
        subscribers: parse_count(stats.subscriber_count.as_ref()),
        total_views: parse_count(stats.view_count.as_ref()),
        video_count: parse_count(stats.video_count.as_ref()),
        uploads_playlist,
    })
}

/// Walk the uploads list page by page until no continuation token remains
pub async fn list_uploads<A: ChannelApi>(api: &A, playlist_id: &str) -> Result<Vec<VideoStub>> {
    let mut stubs = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = api.playlist_items(playlist_id, page_token.as_deref()).await?;
        pages += 1;
        stubs.extend(page.items.into_iter().map(to_stub));

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    tracing::debug!(pages, videos = stubs.len(), "Listed uploads");
    Ok(stubs)
}

/// Fetch statistics in batches, skipping any batch that fails
pub async fn fetch_statistics<A: ChannelApi>(
    api: &A,
    video_ids: &[String],
    batch_size: usize,
) -> HashMap<String, VideoStatistics> {
    let batch_size = batch_size.clamp(1, MAX_RESULTS);
    let mut all_stats = HashMap::with_capacity(video_ids.len());
    let mut failed_batches = 0usize;
    let mut skipped_videos = 0usize;

    for (index, chunk) in video_ids.chunks(batch_size).enumerate() {
        match api.videos(chunk).await {
            Ok(response) => {
                for item in response.items {
                    let (id, stats) = to_statistics(item);
                    all_stats.insert(id, stats);
                }
            }
            Err(e) => {
                failed_batches += 1;
                skipped_videos += chunk.len();
                tracing::warn!(
                    batch = index + 1,
                    size = chunk.len(),
                    error = %e.chain(),
                    "Statistics batch failed, skipping"
                );
            }
        }
    }

    if failed_batches > 0 {
        tracing::warn!(
            failed_batches,
            skipped_videos,
            "Some statistics batches failed; affected rows have no statistics"
        );
    }

    all_stats
}

/// One row per stub, in listing order
pub fn merge(stubs: Vec<VideoStub>, stats: &HashMap<String, VideoStatistics>) -> Vec<VideoRow> {
    stubs
        .into_iter()
        .map(|stub| {
            let found = stats.get(&stub.video_id).cloned();
            VideoRow::merge(stub, found)
        })
        .collect()
}

/// Parse a published timestamp, falling back to the raw string for display
pub fn parse_published(raw: &str) -> (Option<NaiveDateTime>, String) {
    match NaiveDateTime::parse_from_str(raw, PUBLISHED_FORMAT) {
        Ok(dt) => (Some(dt), dt.format("%Y-%m-%d").to_string()),
        Err(_) => (None, raw.to_string()),
    }
}

fn to_stub(item: PlaylistItemResource) -> VideoStub {
    let (published_at, published_display) = parse_published(&item.snippet.published_at);
    VideoStub {
        video_id: item.content_details.video_id,
        title: item.snippet.title,
        published_raw: item.snippet.published_at,
        published_at,
        published_display,
    }
}

fn to_statistics(item: VideoResource) -> (String, VideoStatistics) {
    let counts = item.statistics.unwrap_or_default();
    let (thumbnail, tags) = item
        .snippet
        .map(|s| (s.thumbnails.best_url(), s.tags))
        .unwrap_or_default();

    let stats = VideoStatistics {
        views: parse_count(counts.view_count.as_ref()),
        likes: parse_count(counts.like_count.as_ref()),
        comments: parse_count(counts.comment_count.as_ref()),
        thumbnail,
        tags,
    };
    (item.id, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::youtube::{
        ChannelContentDetails, ChannelListResponse, ChannelResource, ChannelSnippet,
        ChannelStatistics, PlaylistItemContentDetails, PlaylistItemListResponse,
        PlaylistItemSnippet, RelatedPlaylists, Thumbnail, Thumbnails, VideoListResponse,
        VideoSnippet, VideoStatistics as ApiVideoStatistics,
    };
    use crate::error::{DashError, FetchError};
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;

    /// Scripted upstream: fixed channel, fixed pages, optional failures
    struct FakeApi {
        channel: Option<ChannelResource>,
        channel_fails: bool,
        pages: Vec<Vec<String>>,
        page_fails_at: Option<usize>,
        failing_batches: HashSet<usize>,
        page_calls: Cell<usize>,
        batch_calls: Cell<usize>,
        batch_sizes: RefCell<Vec<usize>>,
    }

    impl FakeApi {
        fn new(pages: Vec<Vec<String>>) -> Self {
            Self {
                channel: Some(channel_resource(Some("UUchan"))),
                channel_fails: false,
                pages,
                page_fails_at: None,
                failing_batches: HashSet::new(),
                page_calls: Cell::new(0),
                batch_calls: Cell::new(0),
                batch_sizes: RefCell::new(Vec::new()),
            }
        }

        fn with_videos(count: usize, per_page: usize) -> Self {
            let ids: Vec<String> = (0..count).map(|i| format!("vid{:03}", i)).collect();
            let pages = if ids.is_empty() {
                vec![Vec::new()]
            } else {
                ids.chunks(per_page).map(|c| c.to_vec()).collect()
            };
            Self::new(pages)
        }
    }

    impl ChannelApi for FakeApi {
        async fn channel(&self, _channel_id: &str) -> crate::error::Result<ChannelListResponse> {
            if self.channel_fails {
                return Err(DashError::Api {
                    status: 400,
                    message: "API key not valid".into(),
                });
            }
            Ok(ChannelListResponse {
                items: self.channel.iter().map(clone_channel).collect(),
            })
        }

        async fn playlist_items(
            &self,
            playlist_id: &str,
            page_token: Option<&str>,
        ) -> crate::error::Result<PlaylistItemListResponse> {
            assert_eq!(playlist_id, "UUchan");
            let index = match page_token {
                None => 0,
                Some(token) => token.trim_start_matches("page-").parse().unwrap(),
            };
            self.page_calls.set(self.page_calls.get() + 1);
            if self.page_fails_at == Some(index) {
                return Err(DashError::Api {
                    status: 500,
                    message: "backendError".into(),
                });
            }

            let items = self.pages[index]
                .iter()
                .enumerate()
                .map(|(i, id)| PlaylistItemResource {
                    snippet: PlaylistItemSnippet {
                        title: format!("Title {}", id),
                        published_at: if i == 0 && index == 0 {
                            "yesterday".into()
                        } else {
                            "2024-03-01T12:00:00Z".into()
                        },
                    },
                    content_details: PlaylistItemContentDetails {
                        video_id: id.clone(),
                    },
                })
                .collect();
            let next_page_token = if index + 1 < self.pages.len() {
                Some(format!("page-{}", index + 1))
            } else {
                None
            };
            Ok(PlaylistItemListResponse {
                items,
                next_page_token,
            })
        }

        async fn videos(&self, video_ids: &[String]) -> crate::error::Result<VideoListResponse> {
            let batch = self.batch_calls.get() + 1;
            self.batch_calls.set(batch);
            self.batch_sizes.borrow_mut().push(video_ids.len());
            if self.failing_batches.contains(&batch) {
                return Err(DashError::Api {
                    status: 403,
                    message: "quotaExceeded".into(),
                });
            }

            let items = video_ids
                .iter()
                .map(|id| VideoResource {
                    id: id.clone(),
                    snippet: Some(VideoSnippet {
                        thumbnails: Thumbnails {
                            high: Some(Thumbnail {
                                url: format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id),
                            }),
                            ..Thumbnails::default()
                        },
                        tags: vec!["tag".into()],
                    }),
                    statistics: Some(ApiVideoStatistics {
                        view_count: Some("100".into()),
                        like_count: Some("10".into()),
                        comment_count: Some("1".into()),
                    }),
                })
                .collect();
            Ok(VideoListResponse { items })
        }
    }

    fn channel_resource(uploads: Option<&str>) -> ChannelResource {
        ChannelResource {
            id: "UCchan".into(),
            snippet: ChannelSnippet {
                title: "Rust Talks".into(),
                thumbnails: Thumbnails {
                    high: Some(Thumbnail {
                        url: "https://yt3.ggpht.com/high.jpg".into(),
                    }),
                    ..Thumbnails::default()
                },
            },
            statistics: Some(ChannelStatistics {
                view_count: Some("98765".into()),
                subscriber_count: Some("4321".into()),
                video_count: Some("120".into()),
            }),
            content_details: Some(ChannelContentDetails {
                related_playlists: RelatedPlaylists {
                    uploads: uploads.map(String::from),
                },
            }),
        }
    }

    fn clone_channel(c: &ChannelResource) -> ChannelResource {
        let uploads = c
            .content_details
            .as_ref()
            .and_then(|d| d.related_playlists.uploads.as_deref());
        channel_resource(uploads)
    }

    #[test]
    fn test_parse_published() {
        let (dt, display) = parse_published("2024-03-01T12:34:56Z");
        assert!(dt.is_some());
        assert_eq!(display, "2024-03-01");

        let (dt, display) = parse_published("2024-03-01T12:34:56.000Z");
        assert!(dt.is_none());
        assert_eq!(display, "2024-03-01T12:34:56.000Z");
    }

    #[test]
    fn test_full_fetch() {
        let api = FakeApi::with_videos(7, 3);
        let result = tokio_test::block_on(fetch_with(&api, "UCchan", 50)).unwrap();

        assert_eq!(result.channel.title, "Rust Talks");
        assert_eq!(result.channel.subscribers, 4321);
        assert_eq!(result.channel.total_views, 98765);
        assert_eq!(result.channel.video_count, 120);
        assert_eq!(result.channel.uploads_playlist, "UUchan");
        assert_eq!(result.videos.len(), 7);
        assert!(result.videos.iter().all(|v| v.stats_available && v.views == 100));
        assert_eq!(api.batch_calls.get(), 1);
    }

    #[test]
    fn test_unparsable_date_is_not_fatal() {
        let api = FakeApi::with_videos(2, 50);
        let result = tokio_test::block_on(fetch_with(&api, "UCchan", 50)).unwrap();
        assert_eq!(result.videos[0].published, "yesterday");
        assert!(result.videos[0].published_at.is_none());
        assert_eq!(result.videos[1].published, "2024-03-01");
        assert!(result.videos[1].published_at.is_some());
    }

    #[test]
    fn test_pagination_terminates_and_concatenates_in_order() {
        let api = FakeApi::with_videos(11, 4);
        let stubs = tokio_test::block_on(list_uploads(&api, "UUchan")).unwrap();

        assert_eq!(api.page_calls.get(), 3);
        let ids: Vec<&str> = stubs.iter().map(|s| s.video_id.as_str()).collect();
        let expected: Vec<String> = (0..11).map(|i| format!("vid{:03}", i)).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_single_empty_page() {
        let api = FakeApi::with_videos(0, 50);
        let result = tokio_test::block_on(fetch_with(&api, "UCchan", 50)).unwrap();
        assert!(result.videos.is_empty());
        assert_eq!(api.page_calls.get(), 1);
        assert_eq!(api.batch_calls.get(), 0);
    }

    #[test]
    fn test_failed_middle_batch_degrades_only_its_rows() {
        let mut api = FakeApi::with_videos(120, 50);
        api.failing_batches.insert(2);
        let result = tokio_test::block_on(fetch_with(&api, "UCchan", 50)).unwrap();

        assert_eq!(result.videos.len(), 120);
        assert_eq!(*api.batch_sizes.borrow(), vec![50, 50, 20]);
        for (i, row) in result.videos.iter().enumerate() {
            assert_eq!(row.video_id, format!("vid{:03}", i));
            if (50..100).contains(&i) {
                assert!(!row.stats_available);
                assert_eq!((row.views, row.likes, row.comments), (0, 0, 0));
                assert!(row.thumbnail.is_empty());
                assert!(row.tags.is_empty());
            } else {
                assert!(row.stats_available);
                assert_eq!((row.views, row.likes, row.comments), (100, 10, 1));
                assert!(!row.thumbnail.is_empty());
            }
        }
    }

    #[test]
    fn test_every_batch_failing_still_yields_all_rows() {
        let mut api = FakeApi::with_videos(60, 25);
        api.failing_batches.extend([1, 2]);
        let result = tokio_test::block_on(fetch_with(&api, "UCchan", 50)).unwrap();
        assert_eq!(result.videos.len(), 60);
        assert!(result.videos.iter().all(|v| !v.stats_available));
    }

    #[test]
    fn test_batch_size_is_capped() {
        let api = FakeApi::with_videos(120, 50);
        let ids: Vec<String> = (0..120).map(|i| format!("vid{:03}", i)).collect();
        let stats = tokio_test::block_on(fetch_statistics(&api, &ids, 500));
        assert_eq!(stats.len(), 120);
        assert_eq!(*api.batch_sizes.borrow(), vec![50, 50, 20]);

        let api = FakeApi::with_videos(0, 50);
        tokio_test::block_on(fetch_statistics(&api, &ids[..5], 2));
        assert_eq!(*api.batch_sizes.borrow(), vec![2, 2, 1]);
    }

    #[test]
    fn test_channel_without_items_is_not_found() {
        let mut api = FakeApi::with_videos(3, 50);
        api.channel = None;
        let err = tokio_test::block_on(fetch_with(&api, "UCchan", 50)).unwrap_err();
        assert_eq!(err, FetchError::ChannelNotFound);
        assert_eq!(api.page_calls.get(), 0);
        assert_eq!(api.batch_calls.get(), 0);
    }

    #[test]
    fn test_channel_lookup_error_is_not_found() {
        let mut api = FakeApi::with_videos(3, 50);
        api.channel_fails = true;
        let err = tokio_test::block_on(fetch_with(&api, "UCchan", 50)).unwrap_err();
        assert_eq!(err, FetchError::ChannelNotFound);
        assert!(!err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_channel_without_uploads_is_not_found() {
        let mut api = FakeApi::with_videos(3, 50);
        api.channel = Some(channel_resource(None));
        let err = tokio_test::block_on(fetch_with(&api, "UCchan", 50)).unwrap_err();
        assert_eq!(err, FetchError::ChannelNotFound);
    }

    #[test]
    fn test_listing_failure_is_unexpected() {
        let mut api = FakeApi::with_videos(120, 50);
        api.page_fails_at = Some(1);
        let err = tokio_test::block_on(fetch_with(&api, "UCchan", 50)).unwrap_err();
        assert_eq!(err, FetchError::Unexpected);
        assert_eq!(api.batch_calls.get(), 0);
    }

    #[test]
    fn test_merge_keeps_listing_order() {
        let stub = |id: &str| VideoStub {
            video_id: id.into(),
            title: id.into(),
            published_raw: String::new(),
            published_at: None,
            published_display: String::new(),
        };
        let mut stats = HashMap::new();
        stats.insert(
            "b".to_string(),
            VideoStatistics {
                views: 5,
                ..VideoStatistics::default()
            },
        );
        let rows = merge(vec![stub("c"), stub("b"), stub("a")], &stats);
        let ids: Vec<&str> = rows.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(rows[1].views, 5);
        assert!(rows[1].stats_available);
        assert!(!rows[0].stats_available);
    }

    #[test]
    fn test_merge_fills_every_row_sharing_an_id() {
        let stub = |id: &str| VideoStub {
            video_id: id.into(),
            title: id.into(),
            published_raw: String::new(),
            published_at: None,
            published_display: String::new(),
        };
        let mut stats = HashMap::new();
        stats.insert(
            "a".to_string(),
            VideoStatistics {
                views: 7,
                ..VideoStatistics::default()
            },
        );
        let rows = merge(vec![stub("a"), stub("b"), stub("a")], &stats);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].stats_available && rows[2].stats_available);
        assert_eq!((rows[0].views, rows[2].views), (7, 7));
        assert!(!rows[1].stats_available);
    }

    #[test]
    fn test_channel_with_other_id_is_not_found() {
        let api = FakeApi::with_videos(3, 50);
        let err = tokio_test::block_on(fetch_with(&api, "UCsomeoneelse", 50)).unwrap_err();
        assert_eq!(err, FetchError::ChannelNotFound);
        assert_eq!(api.page_calls.get(), 0);
    }
}
