use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Immutable snapshot of a video as returned by the platform at fetch time.
#[derive(Debug, Clone)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub duration: Option<VideoDuration>,
    pub published_at: DateTime<Utc>,
    pub channel_id: String,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// Video duration parsed from the platform's ISO-8601 encoding (`PT1H2M3S`).
///
/// The presence flags are kept alongside the total because the live feed's
/// Shorts detection keys off the encoding itself: a seconds-only duration
/// (no hour and no minute component) marks a Short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoDuration {
    pub total_seconds: u32,
    pub has_hour_component: bool,
    pub has_minute_component: bool,
}

impl VideoDuration {
    pub fn from_seconds(total_seconds: u32) -> Self {
        Self {
            total_seconds,
            has_hour_component: total_seconds >= 3600,
            has_minute_component: total_seconds >= 60,
        }
    }

    /// Parses the `P[nD]T[nH][nM][nS]` subset the video platform emits.
    /// Returns `None` on anything malformed rather than guessing.
    pub fn parse_iso8601(encoded: &str) -> Option<Self> {
        let rest = encoded.strip_prefix('P')?;
        let mut total: u64 = 0;
        let mut has_hours = false;
        let mut has_minutes = false;
        let mut in_time = false;
        let mut digits = String::new();
        let mut saw_unit = false;

        for c in rest.chars() {
            match c {
                'T' => {
                    if in_time || !digits.is_empty() {
                        return None;
                    }
                    in_time = true;
                }
                '0'..='9' => digits.push(c),
                'D' | 'H' | 'M' | 'S' => {
                    let value: u64 = digits.parse().ok()?;
                    digits.clear();
                    saw_unit = true;
                    match (c, in_time) {
                        ('D', false) => {
                            total += value * 86_400;
                            // A day component always spans hours.
                            has_hours = true;
                        }
                        ('H', true) => {
                            total += value * 3_600;
                            has_hours = true;
                        }
                        ('M', true) => {
                            total += value * 60;
                            has_minutes = true;
                        }
                        ('S', true) => total += value,
                        _ => return None,
                    }
                }
                _ => return None,
            }
        }

        if !digits.is_empty() || !saw_unit {
            return None;
        }

        Some(Self {
            total_seconds: u32::try_from(total).ok()?,
            has_hour_component: has_hours,
            has_minute_component: has_minutes,
        })
    }

    pub fn is_seconds_only(&self) -> bool {
        !self.has_hour_component && !self.has_minute_component
    }
}

/// Channel-level statistics. A hidden subscriber count is a valid state on
/// the platform and is carried as `None`, never silently defaulted to zero.
#[derive(Debug, Clone)]
pub struct ChannelStats {
    pub channel_id: String,
    pub subscriber_count: Option<u64>,
    pub total_views: u64,
    pub video_count: u64,
}

/// Region-scoped mapping from category id to its human-readable name.
/// Built once per run; lookup misses resolve to `"Unknown"`.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    names: HashMap<String, String>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    pub fn name_of(&self, category_id: &str) -> &str {
        self.names
            .get(category_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Derived numeric features for one video. All values are finite floats;
/// the extractor guards every denominator so no NaN/inf can appear here.
///
/// Field declaration order is the canonical column order of the feature
/// schema; training-time and prediction-time extraction share it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub title_length: f64,
    pub caps_ratio: f64,
    pub like_ratio: f64,
    pub comment_ratio: f64,
    pub velocity: f64,
    pub subscriber_count: f64,
    pub views_per_video: f64,
    pub duration_seconds: f64,
    pub publish_hour: f64,
}

/// A candidate that survived filtering, carrying its momentum score.
/// Ordering (higher score first, ties in fetch order) is the only
/// consumer-visible property.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub video: VideoRecord,
    pub category: String,
    pub subscriber_count: u64,
    pub score: f64,
}

/// Outcome of the offline labeling rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Viral,
    NonViral,
    /// Ambiguous middle band, excluded from any produced dataset.
    Skip,
}

impl Label {
    pub fn as_target(self) -> Option<u8> {
        match self {
            Label::Viral => Some(1),
            Label::NonViral => Some(0),
            Label::Skip => None,
        }
    }
}

/// One supervised training row: the title text, the numeric features, and
/// the binary target. Consumed only by the external model-fitting side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledSample {
    pub title: String,
    pub features: FeatureVector,
    pub label: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_duration_encoding() {
        let d = VideoDuration::parse_iso8601("PT1H2M3S").unwrap();
        assert_eq!(d.total_seconds, 3723);
        assert!(d.has_hour_component);
        assert!(d.has_minute_component);
        assert!(!d.is_seconds_only());
    }

    #[test]
    fn parses_seconds_only_encoding_as_short() {
        let d = VideoDuration::parse_iso8601("PT45S").unwrap();
        assert_eq!(d.total_seconds, 45);
        assert!(d.is_seconds_only());
    }

    #[test]
    fn parses_minutes_without_seconds() {
        let d = VideoDuration::parse_iso8601("PT4M").unwrap();
        assert_eq!(d.total_seconds, 240);
        assert!(!d.is_seconds_only());
    }

    #[test]
    fn day_component_counts_as_hours() {
        let d = VideoDuration::parse_iso8601("P1DT30M").unwrap();
        assert_eq!(d.total_seconds, 86_400 + 1800);
        assert!(d.has_hour_component);
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(VideoDuration::parse_iso8601("").is_none());
        assert!(VideoDuration::parse_iso8601("PT").is_none());
        assert!(VideoDuration::parse_iso8601("1H2M").is_none());
        assert!(VideoDuration::parse_iso8601("PT5X").is_none());
        assert!(VideoDuration::parse_iso8601("PT12").is_none());
        assert!(VideoDuration::parse_iso8601("P5M").is_none());
    }

    #[test]
    fn category_lookup_miss_is_unknown() {
        let mut categories = CategoryMap::new();
        categories.insert("10", "Music");
        assert_eq!(categories.name_of("10"), "Music");
        assert_eq!(categories.name_of("999"), UNKNOWN_CATEGORY);
    }

    #[test]
    fn label_targets() {
        assert_eq!(Label::Viral.as_target(), Some(1));
        assert_eq!(Label::NonViral.as_target(), Some(0));
        assert_eq!(Label::Skip.as_target(), None);
    }
}
