use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const API_KEY_ENV_VAR: &str = "YOUTUBE_API_KEY";

/// How Shorts are detected. The platform encodes durations as ISO-8601;
/// the live feed keys off the encoding shape, while dataset collection
/// uses a plain numeric floor. Both exist in the field, so both are
/// selectable here rather than hard-coding either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortsPolicy {
    /// Reject when the duration encoding has neither an hour nor a
    /// minute component (seconds-only encodings are <= 59s).
    DurationEncoding,
    /// Reject when the parsed duration is at or below this many seconds.
    MinSeconds(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityModel {
    /// `views / subscribers / age_hours`
    Linear,
    /// `ln1p(views) / (ln1p(subscribers + 1) * age_hours)`, which dampens
    /// mega-channel skew.
    LogDamped,
}

/// Admission rules for a candidate video. Every threshold that has varied
/// across collection runs is a named field here, not a literal in the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub blocked_categories: Vec<String>,
    pub title_blacklist: Vec<String>,
    pub reach_cap: u64,
    pub freshness_cap_hours: f64,
    pub shorts_policy: ShortsPolicy,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            blocked_categories: vec!["Music".to_string()],
            title_blacklist: vec![
                "official music video".to_string(),
                "official video".to_string(),
                "official trailer".to_string(),
                "lyric video".to_string(),
                "lyrics".to_string(),
                "audio".to_string(),
                "full album".to_string(),
                "teaser".to_string(),
            ],
            reach_cap: 1_000_000,
            freshness_cap_hours: 72.0,
            shorts_policy: ShortsPolicy::DurationEncoding,
        }
    }
}

/// Weights of the composite momentum score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub w_velocity: f64,
    pub w_engagement: f64,
    pub w_size: f64,
    pub w_reaction: f64,
    pub velocity_model: VelocityModel,
}

impl ScoringConfig {
    /// Linear velocity with a reaction bonus.
    pub fn linear() -> Self {
        Self {
            w_velocity: 50.0,
            w_engagement: 30.0,
            w_size: 15.0,
            w_reaction: 5.0,
            velocity_model: VelocityModel::Linear,
        }
    }

    /// Log-dampened velocity, no reaction bonus.
    pub fn log_damped() -> Self {
        Self {
            w_velocity: 40.0,
            w_engagement: 30.0,
            w_size: 20.0,
            w_reaction: 0.0,
            velocity_model: VelocityModel::LogDamped,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::linear()
    }
}

/// How the negative (non-viral) class is admitted into the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativePolicy {
    /// The performance-ratio rule alone decides.
    RatioOnly,
    /// Additionally require at most this many views, so the negative
    /// class is unambiguously "not trending" independent of the ratio.
    ViewCeiling(u64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingConfig {
    /// Performance ratio at or above which a sample is labeled viral.
    pub viral_min_ratio: f64,
    /// Performance ratio at or below which a sample is labeled non-viral.
    pub nonviral_max_ratio: f64,
    /// Numeric Shorts floor used during dataset collection.
    pub min_duration_seconds: u32,
    pub negative_policy: NegativePolicy,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            viral_min_ratio: 2.0,
            nonviral_max_ratio: 0.5,
            min_duration_seconds: 90,
            negative_policy: NegativePolicy::ViewCeiling(10_000),
        }
    }
}

/// Top-level application configuration. Constructed once at startup and
/// passed read-only into the client and pipelines; the API key comes from
/// the environment, never from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub region: String,
    pub max_results: u32,
    pub trending_pages: u32,
    pub quota_budget: u64,
    pub topic_queries: Vec<String>,
    /// How many recent uploads to sample when computing a channel's
    /// average views for the performance ratio.
    pub channel_sample_size: u32,
    pub filter: FilterConfig,
    pub scoring: ScoringConfig,
    pub labeling: LabelingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            region: "US".to_string(),
            max_results: 50,
            trending_pages: 3,
            quota_budget: 10_000,
            topic_queries: vec!["technology".to_string()],
            channel_sample_size: 10,
            filter: FilterConfig::default(),
            scoring: ScoringConfig::default(),
            labeling: LabelingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from an optional TOML file, then overlays the
    /// API key from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })?;
                toml::from_str(&raw)?
            }
            None => Self::default(),
        };

        config.api_key = std::env::var(API_KEY_ENV_VAR).ok().filter(|k| !k.is_empty());
        config.validate()?;
        Ok(config)
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingEnvironmentVariable {
                var_name: API_KEY_ENV_VAR.to_string(),
            })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_results == 0 || self.max_results > 50 {
            return Err(ConfigError::InvalidValue {
                field: "max_results".to_string(),
                value: self.max_results.to_string(),
            });
        }
        if self.filter.reach_cap == 0 {
            return Err(ConfigError::InvalidValue {
                field: "filter.reach_cap".to_string(),
                value: "0".to_string(),
            });
        }
        if !(self.filter.freshness_cap_hours > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "filter.freshness_cap_hours".to_string(),
                value: self.filter.freshness_cap_hours.to_string(),
            });
        }
        let weights = [
            self.scoring.w_velocity,
            self.scoring.w_engagement,
            self.scoring.w_size,
            self.scoring.w_reaction,
        ];
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(ConfigError::ValidationFailed {
                reason: "scoring weights must be finite".to_string(),
            });
        }
        if self.labeling.viral_min_ratio <= self.labeling.nonviral_max_ratio {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "viral_min_ratio ({}) must exceed nonviral_max_ratio ({})",
                    self.labeling.viral_min_ratio, self.labeling.nonviral_max_ratio
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.filter.reach_cap, 1_000_000);
        assert_eq!(config.labeling.viral_min_ratio, 2.0);
        assert_eq!(config.labeling.nonviral_max_ratio, 0.5);
    }

    #[test]
    fn scoring_presets_match_observed_weight_sets() {
        let linear = ScoringConfig::linear();
        assert_eq!(
            (linear.w_velocity, linear.w_engagement, linear.w_size, linear.w_reaction),
            (50.0, 30.0, 15.0, 5.0)
        );
        assert_eq!(linear.velocity_model, VelocityModel::Linear);

        let damped = ScoringConfig::log_damped();
        assert_eq!(
            (damped.w_velocity, damped.w_engagement, damped.w_size, damped.w_reaction),
            (40.0, 30.0, 20.0, 0.0)
        );
        assert_eq!(damped.velocity_model, VelocityModel::LogDamped);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let raw = r#"
            region = "DE"

            [filter]
            reach_cap = 5000000
            freshness_cap_hours = 96.0
            shorts_policy = { min_seconds = 60 }

            [labeling]
            negative_policy = "ratio_only"
        "#;
        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.region, "DE");
        assert_eq!(config.filter.reach_cap, 5_000_000);
        assert_eq!(config.filter.shorts_policy, ShortsPolicy::MinSeconds(60));
        assert_eq!(config.labeling.negative_policy, NegativePolicy::RatioOnly);
        // untouched sections keep their defaults
        assert_eq!(config.scoring.w_velocity, 50.0);
        assert_eq!(config.max_results, 50);
    }

    #[test]
    fn inverted_ratio_thresholds_fail_validation() {
        let mut config = AppConfig::default();
        config.labeling.viral_min_ratio = 0.4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }
}
