//! Engagement and velocity feature computation.
//!
//! The extractor is constructed with an injected reference timestamp and
//! never reads the wall clock itself. All outputs are plain finite floats;
//! callers pre-validate required fields (that is the filter's job), and
//! every ratio guards its denominator.

use chrono::{DateTime, Timelike, Utc};
use trendpulse_core::{ChannelStats, FeatureVector, VideoRecord};

/// Floor applied to the video age wherever it is used as a rate
/// denominator, so freshly-published videos don't produce unbounded
/// velocities.
pub const MIN_AGE_HOURS: f64 = 1.0;

/// The raw quantities the momentum scorer consumes. Kept separate from
/// [`FeatureVector`] because the scorer needs the raw view count and age,
/// which the training features intentionally collapse into ratios.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    pub views: u64,
    pub subscriber_count: u64,
    pub age_hours: f64,
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    now: DateTime<Utc>,
}

impl FeatureExtractor {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Raw age in hours since publication, clamped at zero for records
    /// whose publish timestamp sits ahead of the reference clock.
    pub fn age_hours(&self, record: &VideoRecord) -> f64 {
        let seconds = (self.now - record.published_at).num_seconds();
        (seconds as f64 / 3600.0).max(0.0)
    }

    fn rate_age_hours(&self, record: &VideoRecord) -> f64 {
        self.age_hours(record).max(MIN_AGE_HOURS)
    }

    /// Simple view rate: views per hour of age.
    pub fn velocity(&self, record: &VideoRecord) -> f64 {
        record.views as f64 / self.rate_age_hours(record)
    }

    pub fn like_ratio(record: &VideoRecord) -> f64 {
        record.likes as f64 / (record.views.max(1)) as f64
    }

    pub fn comment_ratio(record: &VideoRecord) -> f64 {
        record.comments as f64 / (record.views.max(1)) as f64
    }

    pub fn engagement_rate(record: &VideoRecord) -> f64 {
        (record.likes + record.comments) as f64 / (record.views.max(1)) as f64
    }

    /// Share of uppercase characters in the title. The denominator is the
    /// character count; word count is a separate feature.
    pub fn caps_ratio(title: &str) -> f64 {
        let total = title.chars().count();
        if total == 0 {
            return 0.0;
        }
        let upper = title.chars().filter(|c| c.is_uppercase()).count();
        upper as f64 / total as f64
    }

    /// Title length as a word count.
    pub fn title_word_count(title: &str) -> f64 {
        title.split_whitespace().count() as f64
    }

    /// Lifetime average views per upload, with a +1 floor on the video
    /// count so empty channels stay finite.
    pub fn views_per_video(stats: &ChannelStats) -> f64 {
        stats.total_views as f64 / (stats.video_count + 1) as f64
    }

    /// Views relative to the channel's recent average. Undefined when the
    /// average is zero or negative; callers skip such records.
    pub fn performance_ratio(views: u64, channel_avg_views: f64) -> Option<f64> {
        if channel_avg_views > 0.0 {
            Some(views as f64 / channel_avg_views)
        } else {
            None
        }
    }

    pub fn publish_hour(record: &VideoRecord) -> f64 {
        record.published_at.hour() as f64
    }

    /// Builds the full training/prediction feature vector for one video.
    /// Callers admit the record first; a hidden subscriber count never
    /// reaches this point through the pipelines.
    pub fn extract(&self, record: &VideoRecord, stats: &ChannelStats) -> FeatureVector {
        FeatureVector {
            title_length: Self::title_word_count(&record.title),
            caps_ratio: Self::caps_ratio(&record.title),
            like_ratio: Self::like_ratio(record),
            comment_ratio: Self::comment_ratio(record),
            velocity: self.velocity(record),
            subscriber_count: stats.subscriber_count.unwrap_or_default() as f64,
            views_per_video: Self::views_per_video(stats),
            duration_seconds: record
                .duration
                .map(|d| d.total_seconds as f64)
                .unwrap_or(0.0),
            publish_hour: Self::publish_hour(record),
        }
    }

    /// Assembles the scorer's inputs for one admitted video.
    pub fn score_inputs(&self, record: &VideoRecord, stats: &ChannelStats) -> ScoreInputs {
        ScoreInputs {
            views: record.views,
            subscriber_count: stats.subscriber_count.unwrap_or_default(),
            age_hours: self.rate_age_hours(record),
            engagement_rate: Self::engagement_rate(record),
        }
    }
}
