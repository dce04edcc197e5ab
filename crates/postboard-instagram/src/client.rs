//! HTTP client for the Instagram Graph API media edge.
//!
//! Wraps `reqwest` with token handling and maps Graph API `{"error": {...}}`
//! envelopes to [`InstagramError::Api`]. Only the first page is ever read;
//! the caller picks how many items that page holds.

use std::future::Future;
use std::time::Duration;

use postboard_core::InstagramSettings;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::error::InstagramError;
use crate::types::MediaItem;

const MEDIA_FIELDS: &str =
    "id,caption,media_type,media_url,permalink,thumbnail_url,timestamp,like_count,comments_count";

/// Something that can list an account's most recent media.
pub trait MediaSource {
    /// `false` when credentials are missing; callers should not call
    /// [`MediaSource::get_media_list`] in that case.
    fn is_configured(&self) -> bool;

    /// Returns up to `limit` of the most recent items, newest first.
    fn get_media_list(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<MediaItem>, InstagramError>> + Send;
}

#[derive(Deserialize)]
struct MediaEnvelope {
    #[serde(default)]
    data: Vec<MediaItem>,
}

/// Client for the Instagram Graph API.
///
/// Use [`InstagramClient::new`] for production or
/// [`InstagramClient::with_base_url`] to point at a mock server in tests.
pub struct InstagramClient {
    client: Client,
    access_token: Option<String>,
    account_id: Option<String>,
    base_url: Url,
}

impl InstagramClient {
    /// Creates a client from application settings.
    ///
    /// Missing credentials are not an error here; the client simply reports
    /// itself unconfigured.
    ///
    /// # Errors
    ///
    /// Returns [`InstagramError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`InstagramError::InvalidBaseUrl`] for a malformed base URL.
    pub fn new(
        settings: &InstagramSettings,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, InstagramError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            access_token: settings.access_token.clone(),
            account_id: settings.business_account_id.clone(),
            base_url: normalize_base_url(&settings.graph_base_url)?,
        })
    }

    /// Creates a configured client against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`InstagramClient::new`].
    pub fn with_base_url(
        access_token: &str,
        account_id: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, InstagramError> {
        let settings = InstagramSettings {
            access_token: Some(access_token.to_owned()),
            business_account_id: Some(account_id.to_owned()),
            graph_base_url: base_url.to_owned(),
        };
        Self::new(&settings, timeout_secs, "postboard/0.1")
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.access_token.as_deref().filter(|t| !t.is_empty())?;
        let account = self.account_id.as_deref().filter(|a| !a.is_empty())?;
        Some((token, account))
    }

    /// Builds `{base}/{account_id}/media` with fields, limit and token.
    fn build_media_url(&self, account_id: &str, token: &str, limit: u32) -> Url {
        let mut url = self.base_url.clone();
        // Base URLs are validated as hierarchical in `normalize_base_url`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(account_id).push("media");
        }
        url.query_pairs_mut()
            .append_pair("fields", MEDIA_FIELDS)
            .append_pair("limit", &limit.to_string())
            .append_pair("access_token", token);
        url
    }

    async fn fetch_media(&self, limit: u32) -> Result<Vec<MediaItem>, InstagramError> {
        let (token, account_id) = self.credentials().ok_or(InstagramError::NotConfigured)?;
        let url = self.build_media_url(account_id, token, limit);

        let response = self.client.get(url).send().await?;
        let status_error = response.error_for_status_ref().err();
        let text = response.text().await?;

        // Graph API errors arrive as a JSON envelope, usually with a 4xx status.
        if let Ok(body) = serde_json::from_str::<Value>(&text) {
            if let Some(error) = body.get("error") {
                return Err(InstagramError::Api(api_error_message(error)));
            }
        }
        if let Some(e) = status_error {
            return Err(InstagramError::Http(e));
        }

        let envelope: MediaEnvelope =
            serde_json::from_str(&text).map_err(|e| InstagramError::Deserialize {
                context: format!("media(account={account_id}, limit={limit})"),
                source: e,
            })?;

        tracing::debug!(
            account = account_id,
            count = envelope.data.len(),
            "fetched instagram media"
        );
        Ok(envelope.data)
    }
}

impl MediaSource for InstagramClient {
    fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    fn get_media_list(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<MediaItem>, InstagramError>> + Send {
        self.fetch_media(limit)
    }
}

fn api_error_message(error: &Value) -> Option<String> {
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToOwned::to_owned)
}

/// Ensures exactly one trailing slash so path segments append cleanly.
fn normalize_base_url(base_url: &str) -> Result<Url, InstagramError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| InstagramError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(InstagramError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: "not a hierarchical URL".to_owned(),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
