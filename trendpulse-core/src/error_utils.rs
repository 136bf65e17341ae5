use crate::error::*;
use std::time::Duration;
use tracing::{error, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::YouTubeApi(e) => {
                error!("YouTube API error details: {:?}", e);
            }
            CoreError::Dataset(e) => {
                error!("Dataset error details: {:?}", e);
            }
            CoreError::Schema(e) => {
                error!("Feature schema error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::YouTubeApi(e) => e.is_retryable(),
            CoreError::Network(_) => true,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::YouTubeApi(e) => e.retry_after(),
            _ if self.is_retryable() => Some(Duration::from_secs(5)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::YouTubeApi(e) => e.user_friendly_message(),
            CoreError::Dataset(DatasetError::FileNotFound { path }) => {
                format!("Dataset file not found: {}", path)
            }
            CoreError::Dataset(_) => {
                "The dataset file could not be read or written.".to_string()
            }
            CoreError::Schema(_) => {
                "Feature columns do not match the trained model's schema. \
                 Re-collect the dataset or retrain before predicting."
                    .to_string()
            }
            CoreError::Config(e) => format!("Configuration problem: {}", e),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { .. } => {
                "Invalid input provided. Please check your input and try again.".to_string()
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::YouTubeApi(_) => "YOUTUBE_API".to_string(),
            CoreError::Dataset(_) => "DATASET".to_string(),
            CoreError::Schema(_) => "SCHEMA".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for YouTubeApiError {
    fn log_error(&self) -> &Self {
        error!("YouTubeApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("YouTubeApiError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            YouTubeApiError::RequestTimeout => true,
            YouTubeApiError::ServerError { status_code } => *status_code >= 500,
            // Quota resets at midnight Pacific; not retryable within a run.
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            YouTubeApiError::RequestTimeout => Some(Duration::from_secs(5)),
            YouTubeApiError::ServerError { .. } => Some(Duration::from_secs(30)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            YouTubeApiError::InvalidApiKey { .. } => {
                "The YouTube API key was rejected. Check YOUTUBE_API_KEY.".to_string()
            }
            YouTubeApiError::QuotaExhausted { .. } => {
                "The daily YouTube API quota is exhausted. Try again tomorrow \
                 or lower the collection limits."
                    .to_string()
            }
            YouTubeApiError::Forbidden { resource } => {
                format!("Access to {} is forbidden for this API key.", resource)
            }
            YouTubeApiError::VideoNotFound { video_id } => {
                format!("Video {} does not exist or is private.", video_id)
            }
            YouTubeApiError::RequestTimeout => {
                "The YouTube API did not respond in time.".to_string()
            }
            YouTubeApiError::ServerError { .. } => {
                "The YouTube API is having trouble. Try again later.".to_string()
            }
            _ => "The YouTube API request failed.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            YouTubeApiError::InvalidApiKey { .. } => "API_KEY".to_string(),
            YouTubeApiError::QuotaExhausted { .. } => "QUOTA".to_string(),
            YouTubeApiError::Forbidden { .. } => "FORBIDDEN".to_string(),
            YouTubeApiError::VideoNotFound { .. } => "NOT_FOUND".to_string(),
            YouTubeApiError::BadRequest { .. } => "BAD_REQUEST".to_string(),
            YouTubeApiError::RequestTimeout => "TIMEOUT".to_string(),
            YouTubeApiError::InvalidResponse { .. } => "INVALID_RESPONSE".to_string(),
            YouTubeApiError::ServerError { .. } => "SERVER_ERROR".to_string(),
        }
    }
}
