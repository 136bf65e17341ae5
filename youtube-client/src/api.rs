use crate::metrics::{MetricsCollector, RequestMetrics};
use crate::quota::{QuotaTracker, UNITS_LIST, UNITS_SEARCH};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use trendpulse_core::{ChannelStats, CoreError, VideoDuration, VideoRecord, YouTubeApiError};

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// The Data API caps id-list parameters at 50 entries per call.
pub const MAX_IDS_PER_CALL: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PagedResponse<T> {
    #[serde(default)]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_results: Option<i64>,
    pub results_per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub snippet: Option<VideoSnippet>,
    pub content_details: Option<VideoContentDetails>,
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category_id: String,
    pub published_at: DateTime<Utc>,
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoContentDetails {
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub id: String,
    pub statistics: Option<ChannelStatistics>,
    pub content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    pub subscriber_count: Option<String>,
    #[serde(default)]
    pub hidden_subscriber_count: bool,
    pub view_count: Option<String>,
    pub video_count: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: Option<RelatedPlaylists>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryItem {
    pub id: String,
    pub snippet: Option<CategorySnippet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySnippet {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: SearchResultId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub content_details: Option<PlaylistItemContentDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: Option<String>,
}

/// Error envelope the Data API wraps failures in.
#[derive(Debug, Clone, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: String,
}

/// Counts arrive as JSON strings; anything missing or garbled reads as 0.
fn parse_count(raw: &Option<String>) -> u64 {
    raw.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0)
}

impl VideoItem {
    /// Converts the wire item into a domain record. Returns `None` when
    /// the snippet is missing entirely (deleted or region-locked items
    /// come back hollow); a missing or malformed duration is carried as
    /// `None` for the filter to reject.
    pub fn into_record(self) -> Option<VideoRecord> {
        let snippet = self.snippet?;
        let duration = self
            .content_details
            .as_ref()
            .and_then(|c| c.duration.as_deref())
            .and_then(VideoDuration::parse_iso8601);
        let statistics = self.statistics.unwrap_or_default();

        Some(VideoRecord {
            id: self.id,
            title: snippet.title,
            description: snippet.description,
            tags: snippet.tags,
            category_id: snippet.category_id,
            duration,
            published_at: snippet.published_at,
            channel_id: snippet.channel_id,
            views: parse_count(&statistics.view_count),
            likes: parse_count(&statistics.like_count),
            comments: parse_count(&statistics.comment_count),
        })
    }
}

impl ChannelItem {
    /// Hidden subscriber counts propagate as `None`; view and upload
    /// totals default to zero, which downstream ratio floors absorb.
    pub fn into_stats(self) -> ChannelStats {
        let statistics = self.statistics.unwrap_or_default();
        let subscriber_count = if statistics.hidden_subscriber_count {
            None
        } else {
            statistics
                .subscriber_count
                .as_deref()
                .and_then(|s| s.parse().ok())
        };

        ChannelStats {
            channel_id: self.id,
            subscriber_count,
            total_views: parse_count(&statistics.view_count),
            video_count: parse_count(&statistics.video_count),
        }
    }

    pub fn uploads_playlist(&self) -> Option<&str> {
        self.content_details
            .as_ref()?
            .related_playlists
            .as_ref()?
            .uploads
            .as_deref()
    }
}

#[derive(Debug)]
pub struct YouTubeApiClient {
    http_client: Client,
    api_key: String,
    quota: Arc<QuotaTracker>,
    metrics: Arc<MetricsCollector>,
}

impl YouTubeApiClient {
    pub fn new(api_key: String, quota_budget: u64) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            quota: Arc::new(QuotaTracker::new(quota_budget)),
            metrics: Arc::new(MetricsCollector::new()),
        })
    }

    /// One best-effort GET against an API endpoint. No retries; a failed
    /// call surfaces its mapped error and the caller decides what the
    /// absence of data means.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        units: u64,
        params: &[(&str, String)],
    ) -> Result<T, CoreError> {
        self.quota.charge(endpoint, units).await?;

        let url = format!("{}/{}", YOUTUBE_API_BASE, endpoint);
        let start_time = Instant::now();

        info!("Making YouTube API request: GET {}", endpoint);
        let response = match self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for GET {}: {}", endpoint, e);
                self.record(endpoint, None, start_time, false, Some("network_error"))
                    .await;
                if e.is_timeout() {
                    return Err(CoreError::YouTubeApi(YouTubeApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            error!("Request failed with status: {} for {}", status, endpoint);
            let body = response.text().await.unwrap_or_default();
            let (reason, message) = parse_error_body(&body);
            self.record(
                endpoint,
                Some(status.as_u16()),
                start_time,
                false,
                Some("http_error"),
            )
            .await;
            return Err(CoreError::YouTubeApi(map_http_error(
                endpoint,
                status.as_u16(),
                &reason,
                &message,
            )));
        }

        let parsed: T = response.json().await.map_err(|e| {
            error!("Failed to parse response for {}: {}", endpoint, e);
            CoreError::YouTubeApi(YouTubeApiError::InvalidResponse {
                details: format!("Failed to parse {} response", endpoint),
            })
        })?;

        debug!("Request successful: GET {}", endpoint);
        self.record(endpoint, Some(status.as_u16()), start_time, true, None)
            .await;
        Ok(parsed)
    }

    async fn record(
        &self,
        endpoint: &str,
        status_code: Option<u16>,
        start_time: Instant,
        success: bool,
        error_type: Option<&str>,
    ) {
        self.metrics
            .record_request(RequestMetrics {
                endpoint: endpoint.to_string(),
                status_code,
                response_time: start_time.elapsed(),
                success,
                error_type: error_type.map(str::to_string),
            })
            .await;
    }

    /// One page of the region's trending ("most popular") feed.
    pub async fn most_popular(
        &self,
        region: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<PagedResponse<VideoItem>, CoreError> {
        let mut params = vec![
            ("part", "snippet,contentDetails,statistics".to_string()),
            ("chart", "mostPopular".to_string()),
            ("regionCode", region.to_string()),
            ("maxResults", max_results.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let page: PagedResponse<VideoItem> = self.get_json("videos", UNITS_LIST, &params).await?;
        info!(
            "Retrieved {} trending videos for region {}",
            page.items.len(),
            region
        );
        Ok(page)
    }

    /// Full video resources for explicit ids, chunked at the API's 50-id
    /// cap. Output preserves input order across chunks.
    pub async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoItem>, CoreError> {
        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_CALL) {
            let params = vec![
                ("part", "snippet,contentDetails,statistics".to_string()),
                ("id", chunk.join(",")),
                ("maxResults", chunk.len().to_string()),
            ];
            let page: PagedResponse<VideoItem> =
                self.get_json("videos", UNITS_LIST, &params).await?;
            items.extend(page.items);
        }
        Ok(items)
    }

    /// Channel statistics (plus uploads-playlist handles) for a batch of
    /// channel ids, chunked at the 50-id cap.
    pub async fn list_channels(&self, ids: &[String]) -> Result<Vec<ChannelItem>, CoreError> {
        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_CALL) {
            let params = vec![
                ("part", "statistics,contentDetails".to_string()),
                ("id", chunk.join(",")),
                ("maxResults", chunk.len().to_string()),
            ];
            let page: PagedResponse<ChannelItem> =
                self.get_json("channels", UNITS_LIST, &params).await?;
            items.extend(page.items);
        }
        info!("Retrieved stats for {} channels", items.len());
        Ok(items)
    }

    pub async fn video_categories(&self, region: &str) -> Result<Vec<CategoryItem>, CoreError> {
        let params = vec![
            ("part", "snippet".to_string()),
            ("regionCode", region.to_string()),
        ];
        let page: PagedResponse<CategoryItem> =
            self.get_json("videoCategories", UNITS_LIST, &params).await?;
        Ok(page.items)
    }

    /// Topic search, id-only. This is the expensive call (100 quota
    /// units); callers hydrate the ids through `list_videos`.
    pub async fn search_video_ids(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<String>, CoreError> {
        let params = vec![
            ("part", "id".to_string()),
            ("q", query.to_string()),
            ("type", "video".to_string()),
            ("maxResults", max_results.to_string()),
        ];
        let page: PagedResponse<SearchItem> =
            self.get_json("search", UNITS_SEARCH, &params).await?;
        Ok(page
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    /// Most recent entries of an uploads playlist, id-only.
    pub async fn playlist_video_ids(
        &self,
        playlist_id: &str,
        max_results: u32,
    ) -> Result<Vec<String>, CoreError> {
        let params = vec![
            ("part", "contentDetails".to_string()),
            ("playlistId", playlist_id.to_string()),
            ("maxResults", max_results.to_string()),
        ];
        let page: PagedResponse<PlaylistItem> =
            self.get_json("playlistItems", UNITS_LIST, &params).await?;
        Ok(page
            .items
            .into_iter()
            .filter_map(|item| item.content_details.and_then(|c| c.video_id))
            .collect())
    }

    pub async fn get_metrics(&self) -> crate::metrics::ApiMetrics {
        self.metrics.get_metrics().await
    }

    pub async fn quota_status(&self) -> crate::quota::QuotaStatus {
        self.quota.status().await
    }
}

fn parse_error_body(body: &str) -> (String, String) {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => {
            let reason = envelope
                .error
                .errors
                .first()
                .map(|e| e.reason.clone())
                .unwrap_or_default();
            (reason, envelope.error.message)
        }
        Err(_) => (String::new(), String::new()),
    }
}

fn map_http_error(endpoint: &str, status: u16, reason: &str, message: &str) -> YouTubeApiError {
    match status {
        400 if reason == "keyInvalid" || message.contains("API key") => {
            YouTubeApiError::InvalidApiKey {
                reason: if reason.is_empty() {
                    message.to_string()
                } else {
                    reason.to_string()
                },
            }
        }
        400 => YouTubeApiError::BadRequest {
            endpoint: endpoint.to_string(),
            details: if message.is_empty() {
                "Bad request".to_string()
            } else {
                message.to_string()
            },
        },
        401 => YouTubeApiError::InvalidApiKey {
            reason: "unauthorized".to_string(),
        },
        403 if reason.contains("quota") => YouTubeApiError::QuotaExhausted {
            needed: 0,
            remaining: 0,
        },
        403 => YouTubeApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => YouTubeApiError::InvalidResponse {
            details: format!("Resource not found on {}", endpoint),
        },
        code if code >= 500 => YouTubeApiError::ServerError { status_code: code },
        code => YouTubeApiError::InvalidResponse {
            details: format!("Unexpected status {} from {}", code, endpoint),
        },
    }
}
