//! HTTP client for the Supabase auth and PostgREST APIs.
//!
//! Two calls are supported: resolving a user access token through
//! `GET /auth/v1/user`, and computing dashboard statistics through the
//! `get_dashboard_statistics` database function (`POST /rest/v1/rpc/...`).

use std::time::Duration;

use postboard_core::SupabaseSettings;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;

use crate::error::SupabaseError;
use crate::types::{DashboardStatistics, User};

const STATISTICS_RPC: &str = "rest/v1/rpc/get_dashboard_statistics";
const USER_ENDPOINT: &str = "auth/v1/user";

/// Client for a single Supabase project.
pub struct SupabaseClient {
    client: Client,
    base_url: Url,
    anon_key: String,
    service_key: Option<String>,
}

impl SupabaseClient {
    /// Creates a client from application settings.
    ///
    /// # Errors
    ///
    /// Returns [`SupabaseError::NotConfigured`] if the project URL or anon key
    /// is missing, [`SupabaseError::InvalidUrl`] for a malformed URL, or
    /// [`SupabaseError::Http`] if the `reqwest::Client` cannot be built.
    pub fn from_settings(
        settings: &SupabaseSettings,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SupabaseError> {
        let (Some(url), Some(anon_key)) = (&settings.url, &settings.anon_key) else {
            return Err(SupabaseError::NotConfigured);
        };
        Self::new(
            url,
            anon_key,
            settings.service_role_key.as_deref(),
            timeout_secs,
            user_agent,
        )
    }

    /// Creates a client for the project at `url`.
    ///
    /// # Errors
    ///
    /// Same as [`SupabaseClient::from_settings`], minus `NotConfigured`.
    pub fn new(
        url: &str,
        anon_key: &str,
        service_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SupabaseError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            anon_key: anon_key.to_owned(),
            service_key: service_key.map(ToOwned::to_owned),
        })
    }

    /// Resolves a user access token to the user it belongs to.
    ///
    /// # Errors
    ///
    /// - [`SupabaseError::Unauthorized`] if the token is rejected (401/403).
    /// - [`SupabaseError::Api`] for any other non-2xx status.
    /// - [`SupabaseError::Http`] on network failure.
    /// - [`SupabaseError::Deserialize`] if the body is not a user object.
    pub async fn get_current_user(&self, token: &str) -> Result<User, SupabaseError> {
        let url = self.endpoint(USER_ENDPOINT)?;
        let request = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token);
        let body = Self::send(request).await?;

        serde_json::from_value(body).map_err(|e| SupabaseError::Deserialize {
            context: USER_ENDPOINT.to_owned(),
            source: e,
        })
    }

    /// Runs the dashboard statistics function for `user_id`.
    ///
    /// Uses the service-role key when one is configured, the anon key
    /// otherwise. A single-row array result is unwrapped to its row.
    ///
    /// # Errors
    ///
    /// - [`SupabaseError::Api`] / [`SupabaseError::Unauthorized`] on non-2xx.
    /// - [`SupabaseError::Http`] on network failure.
    /// - [`SupabaseError::Deserialize`] if the result is not a JSON object.
    pub async fn get_dashboard_statistics(
        &self,
        user_id: &str,
    ) -> Result<DashboardStatistics, SupabaseError> {
        let url = self.endpoint(STATISTICS_RPC)?;
        let key = self.service_key.as_deref().unwrap_or(&self.anon_key);
        let request = self
            .client
            .post(url)
            .header("apikey", key)
            .bearer_auth(key)
            .json(&serde_json::json!({ "p_user_id": user_id }));
        let body = Self::send(request).await?;

        let row = match body {
            Value::Array(mut rows) if rows.len() == 1 => rows.remove(0),
            other => other,
        };
        serde_json::from_value(row).map_err(|e| SupabaseError::Deserialize {
            context: format!("get_dashboard_statistics(user_id={user_id})"),
            source: e,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SupabaseError> {
        self.base_url
            .join(path)
            .map_err(|e| SupabaseError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Sends the request and returns the JSON body of a 2xx response.
    async fn send(request: RequestBuilder) -> Result<Value, SupabaseError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| SupabaseError::Deserialize {
            context: url,
            source: e,
        })
    }

    async fn status_error(status: StatusCode, response: Response) -> SupabaseError {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_owned()
            });

        tracing::debug!(status = status.as_u16(), message = %message, "supabase request failed");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SupabaseError::Unauthorized(message),
            _ => SupabaseError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// GoTrue and PostgREST disagree on where the message lives.
fn error_message(body: &Value) -> Option<String> {
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(ToOwned::to_owned)
}
