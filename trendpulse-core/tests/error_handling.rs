use std::time::Duration;
use trendpulse_core::{ConfigError, CoreError, ErrorExt, SchemaError, YouTubeApiError};

#[test]
fn test_error_codes() {
    let api_error = CoreError::YouTubeApi(YouTubeApiError::RequestTimeout);
    assert_eq!(api_error.error_code(), "YOUTUBE_API");

    let schema_error = CoreError::Schema(SchemaError::MissingColumn {
        column: "caps_ratio".to_string(),
    });
    assert_eq!(schema_error.error_code(), "SCHEMA");

    let config_error = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "YOUTUBE_API_KEY".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");
}

#[test]
fn test_retryable_errors() {
    let retryable = CoreError::YouTubeApi(YouTubeApiError::ServerError { status_code: 503 });
    assert!(retryable.is_retryable());
    assert_eq!(retryable.retry_after(), Some(Duration::from_secs(30)));

    let timeout = CoreError::YouTubeApi(YouTubeApiError::RequestTimeout);
    assert!(timeout.is_retryable());

    // Quota exhaustion only resets with the daily window, never mid-run.
    let quota = CoreError::YouTubeApi(YouTubeApiError::QuotaExhausted {
        needed: 100,
        remaining: 3,
    });
    assert!(!quota.is_retryable());
    assert_eq!(quota.retry_after(), None);

    let config = CoreError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "YOUTUBE_API_KEY".to_string(),
    });
    assert!(!config.is_retryable());
}

#[test]
fn test_user_friendly_messages() {
    let quota = CoreError::YouTubeApi(YouTubeApiError::QuotaExhausted {
        needed: 1,
        remaining: 0,
    });
    let message = quota.user_friendly_message();
    assert!(message.contains("quota"));

    let schema = CoreError::Schema(SchemaError::ColumnCount {
        expected: 9,
        found: 6,
    });
    let message = schema.user_friendly_message();
    assert!(message.contains("schema"));

    let key = CoreError::YouTubeApi(YouTubeApiError::InvalidApiKey {
        reason: "keyInvalid".to_string(),
    });
    assert!(key.user_friendly_message().contains("YOUTUBE_API_KEY"));
}

#[test]
fn test_error_conversion_into_umbrella() {
    fn fails() -> Result<(), CoreError> {
        let inner: Result<(), YouTubeApiError> = Err(YouTubeApiError::VideoNotFound {
            video_id: "abc123".to_string(),
        });
        inner?;
        Ok(())
    }

    let err = fails().unwrap_err();
    assert!(matches!(
        err,
        CoreError::YouTubeApi(YouTubeApiError::VideoNotFound { .. })
    ));
}
