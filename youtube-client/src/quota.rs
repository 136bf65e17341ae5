use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use trendpulse_core::{CoreError, YouTubeApiError};

/// Quota units charged per request family. The Data API bills `list`
/// endpoints at one unit and `search` at one hundred.
pub const UNITS_LIST: u64 = 1;
pub const UNITS_SEARCH: u64 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub used: u64,
    pub budget: u64,
    pub remaining: u64,
}

/// Local quota-unit accounting. Every request charges its units before
/// any network call; once the budget is spent, further requests fail
/// locally instead of burning a rejected call against the API.
#[derive(Debug)]
pub struct QuotaTracker {
    used: Mutex<u64>,
    budget: u64,
}

impl QuotaTracker {
    pub fn new(budget: u64) -> Self {
        Self {
            used: Mutex::new(0),
            budget,
        }
    }

    pub async fn charge(&self, endpoint: &str, units: u64) -> Result<(), CoreError> {
        let mut used = self.used.lock().await;
        let remaining = self.budget.saturating_sub(*used);
        if units > remaining {
            warn!(endpoint, units, remaining, "quota budget exhausted");
            return Err(CoreError::YouTubeApi(YouTubeApiError::QuotaExhausted {
                needed: units,
                remaining,
            }));
        }
        *used += units;
        debug!(endpoint, units, used = *used, "charged quota units");
        Ok(())
    }

    pub async fn status(&self) -> QuotaStatus {
        let used = *self.used.lock().await;
        QuotaStatus {
            used,
            budget: self.budget,
            remaining: self.budget.saturating_sub(used),
        }
    }
}
