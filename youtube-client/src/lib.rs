pub mod api;
pub mod collector;
pub mod metrics;
pub mod quota;

#[cfg(test)]
mod tests;

pub use api::{YouTubeApiClient, MAX_IDS_PER_CALL};
pub use collector::{dedupe_channel_ids, ChannelAverages, FetchedBatch, TrendingCollector};
pub use quota::{QuotaStatus, QuotaTracker, UNITS_LIST, UNITS_SEARCH};
