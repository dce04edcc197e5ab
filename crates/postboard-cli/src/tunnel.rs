//! One-shot request for a public HTTPS tunnel (localtunnel protocol).
//!
//! The command never fails: every outcome, including transport errors, is
//! turned into human-readable lines on stdout.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

pub(crate) const DEFAULT_SERVICE_URL: &str = "https://api.localtunnel.me";

const OAUTH_CALLBACK_PATH: &str = "/facebook/callback";

#[derive(Debug, Deserialize)]
struct TunnelResponse {
    #[serde(default)]
    url: Option<String>,
}

/// What the tunnel provider answered.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TunnelOutcome {
    Url(String),
    MissingUrl,
    Rejected(StatusCode),
}

/// Sends `POST {service_url}/tunnels` with `{"port": port}`.
pub(crate) async fn request_tunnel(
    client: &Client,
    service_url: &str,
    port: u16,
) -> Result<TunnelOutcome, reqwest::Error> {
    let url = format!("{}/tunnels", service_url.trim_end_matches('/'));
    let response = client
        .post(url)
        .json(&serde_json::json!({ "port": port }))
        .send()
        .await?;

    if response.status() != StatusCode::OK {
        return Ok(TunnelOutcome::Rejected(response.status()));
    }

    let body: TunnelResponse = response.json().await?;
    Ok(match body.url.filter(|u| !u.is_empty()) {
        Some(url) => TunnelOutcome::Url(url),
        None => TunnelOutcome::MissingUrl,
    })
}

/// Lines to print for a tunnel request outcome.
pub(crate) fn render(outcome: &Result<TunnelOutcome, reqwest::Error>) -> Vec<String> {
    match outcome {
        Ok(TunnelOutcome::Url(url)) => vec![
            format!("HTTPS URL: {url}"),
            format!(
                "Facebook redirect URI should be: {}{OAUTH_CALLBACK_PATH}",
                url.trim_end_matches('/')
            ),
        ],
        Ok(TunnelOutcome::MissingUrl) => {
            vec!["Failed to get HTTPS URL from localtunnel".to_string()]
        }
        Ok(TunnelOutcome::Rejected(_)) => vec!["Failed to create tunnel".to_string()],
        Err(e) => vec![
            format!("Error: {e}"),
            "Manual approach: Use https://ngrok.com or https://serveo.net".to_string(),
        ],
    }
}

pub(crate) async fn run_tunnel(service_url: &str, port: u16) -> anyhow::Result<()> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("postboard/0.1")
        .build()?;

    let outcome = request_tunnel(&client, service_url, port).await;
    if let Ok(TunnelOutcome::Rejected(status)) = &outcome {
        tracing::warn!(status = status.as_u16(), "tunnel provider rejected request");
    }
    for line in render(&outcome) {
        println!("{line}");
    }
    Ok(())
}
