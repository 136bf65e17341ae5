//! Composite momentum scoring.
//!
//! The score is an unbounded real; only relative ordering is meaningful.

use crate::features::{ScoreInputs, MIN_AGE_HOURS};
use trendpulse_core::{ScoredCandidate, ScoringConfig, VelocityModel};

#[derive(Debug, Clone)]
pub struct MomentumScorer {
    config: ScoringConfig,
    reach_cap: u64,
}

impl MomentumScorer {
    /// `reach_cap` is the same ceiling the filter applies; the size boost
    /// scales against it so a channel at the cap gets no boost at all.
    pub fn new(config: ScoringConfig, reach_cap: u64) -> Self {
        Self { config, reach_cap }
    }

    pub fn score(&self, inputs: &ScoreInputs, reaction_bonus: f64) -> f64 {
        let subscribers = inputs.subscriber_count as f64;
        let size_boost = 1.0 - (subscribers / self.reach_cap.max(1) as f64).min(1.0);

        self.config.w_velocity * self.relative_velocity(inputs)
            + self.config.w_engagement * inputs.engagement_rate
            + self.config.w_size * size_boost
            + self.config.w_reaction * reaction_bonus
    }

    fn relative_velocity(&self, inputs: &ScoreInputs) -> f64 {
        let age = inputs.age_hours.max(MIN_AGE_HOURS);
        let views = inputs.views as f64;
        let subscribers = inputs.subscriber_count as f64;
        match self.config.velocity_model {
            VelocityModel::Linear => views / subscribers.max(1.0) / age,
            VelocityModel::LogDamped => views.ln_1p() / ((subscribers + 1.0).ln_1p() * age),
        }
    }
}

/// Stable descending sort by score. `sort_by` keeps the original fetch
/// order for equal scores, which is what makes ranking deterministic.
pub fn rank_by_score(mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}
