//! Offline viral/non-viral labeling and dataset balancing.

use trendpulse_core::{Label, LabeledSample, LabelingConfig, NegativePolicy};

#[derive(Debug, Clone)]
pub struct ViralLabeler {
    config: LabelingConfig,
}

impl ViralLabeler {
    pub fn new(config: LabelingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LabelingConfig {
        &self.config
    }

    /// Three-way rule over the channel-relative performance ratio. The
    /// middle band is excluded on purpose: it separates the classes
    /// instead of teaching the model an ambiguous boundary.
    pub fn label(&self, performance_ratio: f64) -> Label {
        if performance_ratio >= self.config.viral_min_ratio {
            Label::Viral
        } else if performance_ratio <= self.config.nonviral_max_ratio {
            Label::NonViral
        } else {
            Label::Skip
        }
    }

    /// Whether a ratio-negative sample is admitted into the negative
    /// class under the configured policy.
    pub fn admits_negative(&self, views: u64) -> bool {
        match self.config.negative_policy {
            NegativePolicy::RatioOnly => true,
            NegativePolicy::ViewCeiling(ceiling) => views <= ceiling,
        }
    }

    /// Plain undersampling: truncate the larger class to the smaller
    /// class's size and concatenate, viral first. Input order is
    /// preserved, so identical inputs always produce identical datasets.
    pub fn balance(
        viral: Vec<LabeledSample>,
        nonviral: Vec<LabeledSample>,
    ) -> Vec<LabeledSample> {
        let per_class = viral.len().min(nonviral.len());
        let mut dataset = Vec::with_capacity(per_class * 2);
        dataset.extend(viral.into_iter().take(per_class));
        dataset.extend(nonviral.into_iter().take(per_class));
        dataset
    }
}
