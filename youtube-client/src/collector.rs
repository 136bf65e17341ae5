//! Batch materialization for the core pipelines.
//!
//! The collector turns the paged, id-batched Data API surface into the
//! finite in-memory batch the engine consumes. Calls are best-effort:
//! an empty upstream result is an empty batch, never an error.

use crate::api::{VideoItem, YouTubeApiClient};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use trendpulse_core::{CategoryMap, ChannelStats, CoreError, VideoRecord, YouTubeApiError};

/// Everything the ranking and labeling pipelines need, fully fetched.
#[derive(Debug)]
pub struct FetchedBatch {
    pub videos: Vec<VideoRecord>,
    pub stats: HashMap<String, ChannelStats>,
    pub categories: CategoryMap,
    pub channel_avg_views: HashMap<String, f64>,
}

/// Whether to spend quota computing per-channel recent-upload averages.
/// Ranking doesn't need them; labeling does.
#[derive(Debug, Clone, Copy)]
pub enum ChannelAverages {
    Skip,
    RecentUploads { sample_size: u32 },
}

pub struct TrendingCollector<'c> {
    client: &'c YouTubeApiClient,
}

impl<'c> TrendingCollector<'c> {
    pub fn new(client: &'c YouTubeApiClient) -> Self {
        Self { client }
    }

    /// Pages through the region's trending feed. Items that come back
    /// without a snippet are dropped here; everything else is the
    /// filter's decision.
    pub async fn fetch_trending_videos(
        &self,
        region: &str,
        max_results: u32,
        pages: u32,
    ) -> Result<Vec<VideoRecord>, CoreError> {
        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..pages.max(1) {
            let page = self
                .client
                .most_popular(region, max_results, page_token.as_deref())
                .await?;
            for item in page.items {
                match item.into_record() {
                    Some(record) => videos.push(record),
                    None => debug!("dropping hollow trending item"),
                }
            }
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        info!(count = videos.len(), region, "fetched trending candidates");
        Ok(videos)
    }

    /// Topic sample for the negative class: search for ids, then hydrate
    /// them into full records.
    pub async fn fetch_topic_videos(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<VideoRecord>, CoreError> {
        let ids = self.client.search_video_ids(query, max_results).await?;
        if ids.is_empty() {
            info!(query, "topic search returned nothing");
            return Ok(Vec::new());
        }
        let items = self.client.list_videos(&ids).await?;
        let videos: Vec<VideoRecord> = items
            .into_iter()
            .filter_map(VideoItem::into_record)
            .collect();
        info!(count = videos.len(), query, "fetched topic sample");
        Ok(videos)
    }

    /// Completes a batch around already-fetched videos: channel stats,
    /// the category map, and (optionally) recent-upload averages.
    pub async fn assemble(
        &self,
        videos: Vec<VideoRecord>,
        region: &str,
        averages: ChannelAverages,
    ) -> Result<FetchedBatch, CoreError> {
        let channel_ids = dedupe_channel_ids(&videos);

        let channel_items = self.client.list_channels(&channel_ids).await?;
        let mut uploads: Vec<(String, String)> = Vec::new();
        let mut stats = HashMap::with_capacity(channel_items.len());
        for item in channel_items {
            if let Some(playlist) = item.uploads_playlist() {
                uploads.push((item.id.clone(), playlist.to_string()));
            }
            let channel_stats = item.into_stats();
            stats.insert(channel_stats.channel_id.clone(), channel_stats);
        }

        let categories: CategoryMap = self
            .client
            .video_categories(region)
            .await?
            .into_iter()
            .filter_map(|c| c.snippet.map(|s| (c.id, s.title)))
            .collect();

        let mut channel_avg_views = HashMap::new();
        if let ChannelAverages::RecentUploads { sample_size } = averages {
            for (channel_id, playlist) in &uploads {
                match self.channel_average(playlist, sample_size).await {
                    Ok(Some(average)) => {
                        channel_avg_views.insert(channel_id.clone(), average);
                    }
                    Ok(None) => debug!(channel = %channel_id, "no recent uploads to average"),
                    Err(CoreError::YouTubeApi(YouTubeApiError::QuotaExhausted { .. })) => {
                        warn!(
                            channel = %channel_id,
                            "quota exhausted; stopping channel-average collection"
                        );
                        break;
                    }
                    Err(e) => {
                        warn!(channel = %channel_id, error = %e, "channel average fetch failed")
                    }
                }
            }
        }

        info!(
            videos = videos.len(),
            channels = channel_ids.len(),
            categories = categories.len(),
            averages = channel_avg_views.len(),
            "assembled batch"
        );
        Ok(FetchedBatch {
            videos,
            stats,
            categories,
            channel_avg_views,
        })
    }

    /// Mean view count over a channel's most recent uploads, or `None`
    /// when the uploads playlist is empty.
    pub async fn channel_average(
        &self,
        uploads_playlist: &str,
        sample_size: u32,
    ) -> Result<Option<f64>, CoreError> {
        let ids = self
            .client
            .playlist_video_ids(uploads_playlist, sample_size)
            .await?;
        if ids.is_empty() {
            return Ok(None);
        }

        let records: Vec<VideoRecord> = self
            .client
            .list_videos(&ids)
            .await?
            .into_iter()
            .filter_map(VideoItem::into_record)
            .collect();
        if records.is_empty() {
            return Ok(None);
        }

        let total: u64 = records.iter().map(|r| r.views).sum();
        Ok(Some(total as f64 / records.len() as f64))
    }
}

/// First-seen-order channel deduplication. Score ordering downstream must
/// not depend on map iteration order, so the id list keeps fetch order.
pub fn dedupe_channel_ids(videos: &[VideoRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for video in videos {
        if seen.insert(video.channel_id.as_str()) {
            ids.push(video.channel_id.clone());
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn video(id: &str, channel: &str) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: "t".to_string(),
            description: String::new(),
            tags: vec![],
            category_id: "28".to_string(),
            duration: None,
            published_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            channel_id: channel.to_string(),
            views: 0,
            likes: 0,
            comments: 0,
        }
    }

    #[test]
    fn dedup_keeps_first_seen_order() {
        let videos = vec![
            video("a", "c2"),
            video("b", "c1"),
            video("c", "c2"),
            video("d", "c3"),
            video("e", "c1"),
        ];
        assert_eq!(dedupe_channel_ids(&videos), vec!["c2", "c1", "c3"]);
    }

    #[test]
    fn dedup_of_empty_batch_is_empty() {
        assert!(dedupe_channel_ids(&[]).is_empty());
    }
}
