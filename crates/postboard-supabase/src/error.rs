use thiserror::Error;

/// Errors returned by the Supabase client.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// `SUPABASE_URL` or `SUPABASE_ANON_KEY` is missing.
    #[error("Supabase service not configured")]
    NotConfigured,

    #[error("invalid Supabase URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The access token was rejected by the auth service.
    #[error("invalid or expired token: {0}")]
    Unauthorized(String),

    /// Any other non-2xx answer.
    #[error("Supabase API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
