use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("YouTube API error: {0}")]
    YouTubeApi(#[from] YouTubeApiError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Feature schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum YouTubeApiError {
    #[error("API key rejected: {reason}")]
    InvalidApiKey { reason: String },

    #[error("Daily quota exhausted: {needed} units needed, {remaining} remaining")]
    QuotaExhausted { needed: u64, remaining: u64 },

    #[error("Forbidden access to resource: {resource}")]
    Forbidden { resource: String },

    #[error("Video not found: {video_id}")]
    VideoNotFound { video_id: String },

    #[error("Malformed request to {endpoint}: {details}")]
    BadRequest { endpoint: String, details: String },

    #[error("Request timeout")]
    RequestTimeout,

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Server error: {status_code}")]
    ServerError { status_code: u16 },
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Dataset file not found: {path}")]
    FileNotFound { path: String },

    #[error("Corrupt dataset row {row}: {details}")]
    CorruptRow { row: usize, details: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    #[error("Feature column mismatch at position {position}: expected {expected:?}, found {found:?}")]
    ColumnMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Column count mismatch: expected {expected}, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("Missing feature column: {column}")]
    MissingColumn { column: String },

    #[error("Unexpected feature column: {column}")]
    UnexpectedColumn { column: String },

    #[error("Non-finite value for feature {column}: {value}")]
    NonFiniteValue { column: String, value: f64 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
