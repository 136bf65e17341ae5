//! Pipeline orchestration over an already-materialized batch.
//!
//! Both pipelines walk the batch in fetch order and never touch the
//! network or the clock; identical inputs and configuration produce
//! bit-identical output.

use crate::features::FeatureExtractor;
use crate::filter::CandidateFilter;
use crate::labeler::ViralLabeler;
use crate::scorer::{rank_by_score, MomentumScorer};
use crate::text_signal::looks_like_reaction;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;
use trendpulse_core::{
    CategoryMap, ChannelStats, FilterConfig, Label, LabeledSample, LabelingConfig,
    ScoredCandidate, ScoringConfig, VideoRecord,
};

/// Live use case: filter, score, and sort a batch of trending candidates.
#[derive(Debug, Clone)]
pub struct RankingPipeline {
    filter: CandidateFilter,
    scorer: MomentumScorer,
}

impl RankingPipeline {
    pub fn new(filter_config: FilterConfig, scoring_config: ScoringConfig) -> Self {
        let reach_cap = filter_config.reach_cap;
        Self {
            filter: CandidateFilter::new(filter_config),
            scorer: MomentumScorer::new(scoring_config, reach_cap),
        }
    }

    /// Ranks a batch. Rejected candidates are dropped silently; the
    /// result is ordered by score descending with ties in fetch order.
    pub fn rank(
        &self,
        videos: &[VideoRecord],
        stats_by_channel: &HashMap<String, ChannelStats>,
        categories: &CategoryMap,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        let extractor = FeatureExtractor::new(now);
        let mut scored = Vec::new();

        for video in videos {
            let is_reaction = looks_like_reaction(&video.title);
            let stats = stats_by_channel.get(&video.channel_id);
            let category = categories.name_of(&video.category_id);
            let age_hours = extractor.age_hours(video);

            if !self.filter.admit(video, stats, category, is_reaction, age_hours) {
                continue;
            }
            // admit() only passes with present stats.
            let Some(stats) = stats else { continue };

            let inputs = extractor.score_inputs(video, stats);
            let reaction_bonus = if is_reaction { 1.0 } else { 0.0 };
            let score = self.scorer.score(&inputs, reaction_bonus);

            scored.push(ScoredCandidate {
                video: video.clone(),
                category: category.to_string(),
                subscriber_count: stats.subscriber_count.unwrap_or_default(),
                score,
            });
        }

        rank_by_score(scored)
    }
}

/// Aggregate outcome of one labeling run, reported for auditability.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    #[serde(skip)]
    pub samples: Vec<LabeledSample>,
    /// Records in the input batch.
    pub collected: usize,
    /// Records dropped by the filter, degenerate denominators, the
    /// ambiguous middle band, or the negative-class policy.
    pub skipped: usize,
    /// Viral labels before balancing.
    pub labeled_viral: usize,
    /// Non-viral labels before balancing.
    pub labeled_nonviral: usize,
}

impl DatasetReport {
    pub fn balanced_len(&self) -> usize {
        self.samples.len()
    }
}

/// Offline use case: filter, feature-extract, label, and balance a batch
/// into a supervised dataset.
#[derive(Debug, Clone)]
pub struct LabelingPipeline {
    filter: CandidateFilter,
    labeler: ViralLabeler,
}

impl LabelingPipeline {
    pub fn new(filter_config: FilterConfig, labeling_config: LabelingConfig) -> Self {
        Self {
            filter: CandidateFilter::new(filter_config),
            labeler: ViralLabeler::new(labeling_config),
        }
    }

    /// Runs the labeling pass. `channel_avg_views` is the externally
    /// supplied mean view count of each channel's recent uploads; records
    /// without a usable average are skipped rather than labeled with an
    /// undefined ratio.
    pub fn run(
        &self,
        videos: &[VideoRecord],
        stats_by_channel: &HashMap<String, ChannelStats>,
        channel_avg_views: &HashMap<String, f64>,
        categories: &CategoryMap,
        now: DateTime<Utc>,
    ) -> DatasetReport {
        let extractor = FeatureExtractor::new(now);
        let mut viral = Vec::new();
        let mut nonviral = Vec::new();
        let mut skipped = 0_usize;

        for video in videos {
            let is_reaction = looks_like_reaction(&video.title);
            let stats = stats_by_channel.get(&video.channel_id);
            let category = categories.name_of(&video.category_id);
            let age_hours = extractor.age_hours(video);

            if !self.filter.admit(video, stats, category, is_reaction, age_hours) {
                skipped += 1;
                continue;
            }
            let Some(stats) = stats else {
                skipped += 1;
                continue;
            };

            let avg_views = channel_avg_views
                .get(&video.channel_id)
                .copied()
                .unwrap_or(0.0);
            let Some(ratio) = FeatureExtractor::performance_ratio(video.views, avg_views) else {
                skipped += 1;
                continue;
            };

            match self.labeler.label(ratio) {
                Label::Viral => viral.push(LabeledSample {
                    title: video.title.clone(),
                    features: extractor.extract(video, stats),
                    label: 1,
                }),
                Label::NonViral if self.labeler.admits_negative(video.views) => {
                    nonviral.push(LabeledSample {
                        title: video.title.clone(),
                        features: extractor.extract(video, stats),
                        label: 0,
                    });
                }
                Label::NonViral | Label::Skip => skipped += 1,
            }
        }

        let labeled_viral = viral.len();
        let labeled_nonviral = nonviral.len();
        let samples = ViralLabeler::balance(viral, nonviral);

        let report = DatasetReport {
            collected: videos.len(),
            skipped,
            labeled_viral,
            labeled_nonviral,
            samples,
        };
        info!(
            collected = report.collected,
            skipped = report.skipped,
            viral = report.labeled_viral,
            nonviral = report.labeled_nonviral,
            balanced = report.balanced_len(),
            "labeling pass finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use trendpulse_core::VideoDuration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap()
    }

    fn video(id: &str, channel: &str, views: u64, age_hours: i64) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            title: format!("Interesting build log {id}"),
            description: String::new(),
            tags: vec![],
            category_id: "28".to_string(),
            duration: Some(VideoDuration::from_seconds(600)),
            published_at: now() - chrono::Duration::hours(age_hours),
            channel_id: channel.to_string(),
            views,
            likes: views / 20,
            comments: views / 100,
        }
    }

    fn stats(channel: &str, subscribers: Option<u64>) -> (String, ChannelStats) {
        (
            channel.to_string(),
            ChannelStats {
                channel_id: channel.to_string(),
                subscriber_count: subscribers,
                total_views: 5_000_000,
                video_count: 200,
            },
        )
    }

    fn categories() -> CategoryMap {
        let mut map = CategoryMap::new();
        map.insert("28", "Science & Technology");
        map.insert("10", "Music");
        map
    }

    #[test]
    fn ranking_filters_scores_and_sorts() {
        let pipeline = RankingPipeline::new(FilterConfig::default(), ScoringConfig::linear());
        let videos = vec![
            video("slow", "c1", 1_000, 20),
            video("fast", "c2", 500_000, 20),
            video("hidden", "c3", 900_000, 20),
        ];
        let stats_map: HashMap<_, _> = vec![
            stats("c1", Some(50_000)),
            stats("c2", Some(50_000)),
            stats("c3", None),
        ]
        .into_iter()
        .collect();

        let ranked = pipeline.rank(&videos, &stats_map, &categories(), now());
        let ids: Vec<&str> = ranked.iter().map(|c| c.video.id.as_str()).collect();
        // The hidden-subscriber channel is filtered out entirely.
        assert_eq!(ids, vec!["fast", "slow"]);
        assert!(ranked[0].score > ranked[1].score);
        assert_eq!(ranked[0].category, "Science & Technology");
    }

    #[test]
    fn ranking_is_deterministic_for_identical_inputs() {
        let pipeline = RankingPipeline::new(FilterConfig::default(), ScoringConfig::log_damped());
        let videos = vec![
            video("a", "c1", 10_000, 10),
            video("b", "c2", 10_000, 10),
            video("c", "c1", 70_000, 30),
        ];
        let stats_map: HashMap<_, _> =
            vec![stats("c1", Some(10_000)), stats("c2", Some(900_000))]
                .into_iter()
                .collect();

        let first = pipeline.rank(&videos, &stats_map, &categories(), now());
        let second = pipeline.rank(&videos, &stats_map, &categories(), now());
        let order = |r: &[ScoredCandidate]| {
            r.iter().map(|c| (c.video.id.clone(), c.score)).collect::<Vec<_>>()
        };
        assert_eq!(order(&first), order(&second));
    }

    #[test]
    fn identical_scores_keep_fetch_order() {
        let pipeline = RankingPipeline::new(FilterConfig::default(), ScoringConfig::linear());
        // Two byte-identical candidates apart from their ids.
        let videos = vec![
            video("first", "c1", 10_000, 10),
            video("second", "c1", 10_000, 10),
        ];
        let stats_map: HashMap<_, _> = vec![stats("c1", Some(10_000))].into_iter().collect();

        let ranked = pipeline.rank(&videos, &stats_map, &categories(), now());
        let ids: Vec<&str> = ranked.iter().map(|c| c.video.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn empty_batch_is_nothing_to_process() {
        let pipeline = RankingPipeline::new(FilterConfig::default(), ScoringConfig::linear());
        let ranked = pipeline.rank(&[], &HashMap::new(), &CategoryMap::new(), now());
        assert!(ranked.is_empty());

        let labeling = LabelingPipeline::new(FilterConfig::default(), LabelingConfig::default());
        let report = labeling.run(&[], &HashMap::new(), &HashMap::new(), &CategoryMap::new(), now());
        assert_eq!(report.collected, 0);
        assert!(report.samples.is_empty());
    }

    #[test]
    fn labeling_partitions_balances_and_counts() {
        use trendpulse_core::{NegativePolicy, ShortsPolicy};

        let filter_config = FilterConfig {
            shorts_policy: ShortsPolicy::MinSeconds(90),
            ..FilterConfig::default()
        };
        let labeling_config = LabelingConfig {
            negative_policy: NegativePolicy::RatioOnly,
            ..LabelingConfig::default()
        };
        let pipeline = LabelingPipeline::new(filter_config, labeling_config);

        // Channel average of 10_000 views: a 30_000-view video is viral
        // (ratio 3), two 4_000-view videos are non-viral (0.4), an
        // 12_000-view video lands in the skipped middle band (1.2).
        let videos = vec![
            video("v1", "c1", 30_000, 10),
            video("n1", "c1", 4_000, 10),
            video("n2", "c1", 4_000, 10),
            video("mid", "c1", 12_000, 10),
        ];
        let stats_map: HashMap<_, _> = vec![stats("c1", Some(100_000))].into_iter().collect();
        let averages: HashMap<_, _> = vec![("c1".to_string(), 10_000.0)].into_iter().collect();

        let report = pipeline.run(&videos, &stats_map, &averages, &categories(), now());
        assert_eq!(report.collected, 4);
        assert_eq!(report.labeled_viral, 1);
        assert_eq!(report.labeled_nonviral, 2);
        assert_eq!(report.skipped, 1);
        // Balanced down to one sample per class.
        assert_eq!(report.balanced_len(), 2);
        assert_eq!(report.samples.iter().filter(|s| s.label == 1).count(), 1);
        assert_eq!(report.samples.iter().filter(|s| s.label == 0).count(), 1);
    }

    #[test]
    fn labeling_skips_records_without_a_channel_average() {
        let pipeline = LabelingPipeline::new(FilterConfig::default(), LabelingConfig::default());
        let videos = vec![video("v1", "c1", 30_000, 10)];
        let stats_map: HashMap<_, _> = vec![stats("c1", Some(100_000))].into_iter().collect();

        // No average supplied for c1.
        let report = pipeline.run(&videos, &stats_map, &HashMap::new(), &categories(), now());
        assert_eq!(report.skipped, 1);
        assert!(report.samples.is_empty());
    }

    #[test]
    fn view_ceiling_drops_popular_ratio_negatives() {
        use trendpulse_core::{NegativePolicy, ShortsPolicy};

        let pipeline = LabelingPipeline::new(
            FilterConfig {
                shorts_policy: ShortsPolicy::MinSeconds(60),
                ..FilterConfig::default()
            },
            LabelingConfig {
                negative_policy: NegativePolicy::ViewCeiling(10_000),
                ..LabelingConfig::default()
            },
        );

        // Ratio 0.4 against a 100_000 average, but 40_000 views is above
        // the ceiling, so the sample is dropped instead of labeled 0.
        let videos = vec![video("n1", "c1", 40_000, 10)];
        let stats_map: HashMap<_, _> = vec![stats("c1", Some(100_000))].into_iter().collect();
        let averages: HashMap<_, _> = vec![("c1".to_string(), 100_000.0)].into_iter().collect();

        let report = pipeline.run(&videos, &stats_map, &averages, &categories(), now());
        assert_eq!(report.labeled_nonviral, 0);
        assert_eq!(report.skipped, 1);
    }
}
