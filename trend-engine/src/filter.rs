//! Candidate admission rules.
//!
//! A sequential predicate chain; every rule must pass. The reaction
//! override is an explicit precedence rule: reaction-ness trumps both the
//! category block and the keyword blacklist, and nothing else.

use tracing::debug;
use trendpulse_core::{ChannelStats, FilterConfig, ShortsPolicy, VideoDuration, VideoRecord};

#[derive(Debug, Clone)]
pub struct CandidateFilter {
    config: FilterConfig,
}

impl CandidateFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Decides admission for one candidate. `stats` is `None` when the
    /// channel lookup produced nothing; a present record with a hidden
    /// subscriber count is likewise rejected outright rather than
    /// defaulted to zero.
    pub fn admit(
        &self,
        record: &VideoRecord,
        stats: Option<&ChannelStats>,
        category_name: &str,
        is_reaction: bool,
        age_hours: f64,
    ) -> bool {
        if record.title.trim().is_empty() {
            debug!(video = %record.id, "rejected: empty title");
            return false;
        }

        let Some(duration) = record.duration else {
            debug!(video = %record.id, "rejected: missing duration");
            return false;
        };

        let Some(stats) = stats else {
            debug!(video = %record.id, channel = %record.channel_id, "rejected: no channel stats");
            return false;
        };

        let Some(subscribers) = stats.subscriber_count else {
            debug!(video = %record.id, channel = %record.channel_id, "rejected: hidden subscriber count");
            return false;
        };

        if !is_reaction && self.is_blocked_category(category_name) {
            debug!(video = %record.id, category = category_name, "rejected: blocked category");
            return false;
        }

        if self.is_short(duration) {
            debug!(video = %record.id, seconds = duration.total_seconds, "rejected: short");
            return false;
        }

        if !is_reaction && self.title_is_blacklisted(&record.title) {
            debug!(video = %record.id, "rejected: blacklisted title phrase");
            return false;
        }

        if subscribers > self.config.reach_cap {
            debug!(video = %record.id, subscribers, "rejected: over reach cap");
            return false;
        }

        if age_hours > self.config.freshness_cap_hours {
            debug!(video = %record.id, age_hours, "rejected: too old");
            return false;
        }

        true
    }

    fn is_blocked_category(&self, category_name: &str) -> bool {
        self.config
            .blocked_categories
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(category_name))
    }

    fn title_is_blacklisted(&self, title: &str) -> bool {
        let lowered = title.to_lowercase();
        self.config
            .title_blacklist
            .iter()
            .any(|phrase| lowered.contains(&phrase.to_lowercase()))
    }

    fn is_short(&self, duration: VideoDuration) -> bool {
        match self.config.shorts_policy {
            ShortsPolicy::DurationEncoding => duration.is_seconds_only(),
            ShortsPolicy::MinSeconds(floor) => duration.total_seconds <= floor,
        }
    }
}
