use thiserror::Error;

/// Errors returned by the Instagram Graph API client.
#[derive(Debug, Error)]
pub enum InstagramError {
    /// Access token or business account id is missing.
    #[error("Instagram service not configured")]
    NotConfigured,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Network or TLS failure, or a non-2xx status without an error envelope.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Graph API answered with an `{"error": {...}}` envelope.
    /// The message is `None` when the envelope carries none.
    #[error("Instagram API error: {}", .0.as_deref().unwrap_or("unknown error"))]
    Api(Option<String>),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a single media item's `timestamp` was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp is not a string: {0}")]
    NotAString(String),

    #[error("unrecognized ISO-8601 timestamp '{0}'")]
    Unparsable(String),
}
