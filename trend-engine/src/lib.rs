pub mod features;
pub mod filter;
pub mod labeler;
pub mod pipeline;
pub mod schema;
pub mod scorer;
pub mod text_signal;

pub use features::{FeatureExtractor, ScoreInputs, MIN_AGE_HOURS};
pub use filter::CandidateFilter;
pub use labeler::ViralLabeler;
pub use pipeline::{DatasetReport, LabelingPipeline, RankingPipeline};
pub use scorer::{rank_by_score, MomentumScorer};
pub use text_signal::looks_like_reaction;
