use crate::api::{ChannelItem, VideoItem};
use crate::quota::{QuotaTracker, UNITS_LIST, UNITS_SEARCH};
use crate::{TrendingCollector, YouTubeApiClient};
use trendpulse_core::{CoreError, YouTubeApiError};

#[tokio::test]
async fn test_client_creation_and_quota_status() {
    let client = YouTubeApiClient::new("test-key".to_string(), 2_000).unwrap();

    let status = client.quota_status().await;
    assert_eq!(status.budget, 2_000);
    assert_eq!(status.used, 0);
    assert_eq!(status.remaining, 2_000);

    let metrics = client.get_metrics().await;
    assert_eq!(metrics.total_requests, 0);
}

#[tokio::test]
async fn test_collector_construction() {
    let client = YouTubeApiClient::new("test-key".to_string(), 2_000).unwrap();
    let _collector = TrendingCollector::new(&client);
}

#[test]
fn test_quota_charges_across_request_families() {
    let tracker = QuotaTracker::new(102);
    tokio_test::block_on(tracker.charge("videos", UNITS_LIST)).unwrap();
    tokio_test::block_on(tracker.charge("search", UNITS_SEARCH)).unwrap();
    tokio_test::block_on(tracker.charge("channels", UNITS_LIST)).unwrap();

    let err = tokio_test::block_on(tracker.charge("videos", UNITS_LIST)).unwrap_err();
    assert!(matches!(
        err,
        CoreError::YouTubeApi(YouTubeApiError::QuotaExhausted { .. })
    ));
}

#[test]
fn test_trending_item_round_trip() {
    // A realistic trending-feed item with every part present.
    let raw = r#"{
        "id": "dQw4w9WgXcQ",
        "snippet": {
            "title": "I tried the viral bread recipe",
            "description": "it worked",
            "tags": ["baking"],
            "categoryId": "26",
            "publishedAt": "2024-03-01T09:30:00Z",
            "channelId": "UCabc",
            "channelTitle": "Home Baker"
        },
        "contentDetails": { "duration": "PT8M12S" },
        "statistics": { "viewCount": "240311", "likeCount": "18000", "commentCount": "950" }
    }"#;
    let item: VideoItem = serde_json::from_str(raw).unwrap();
    let record = item.into_record().unwrap();

    assert_eq!(record.channel_id, "UCabc");
    assert_eq!(record.views, 240_311);
    assert_eq!(record.duration.unwrap().total_seconds, 492);
}

#[test]
fn test_channel_item_without_statistics() {
    let raw = r#"{ "id": "UCempty" }"#;
    let item: ChannelItem = serde_json::from_str(raw).unwrap();
    let stats = item.into_stats();

    // No statistics part at all: subscriber count is unknown, totals zero.
    assert_eq!(stats.channel_id, "UCempty");
    assert_eq!(stats.subscriber_count, None);
    assert_eq!(stats.total_views, 0);
    assert_eq!(stats.video_count, 0);
}
