use postboard_core::AppConfig;
use postboard_instagram::{InstagramClient, SystemClock, WeeklyPosts};

/// Runs the weekly filter against the configured account and prints the
/// result as pretty JSON. A `success: false` result is still printed, not
/// turned into an error.
pub(crate) async fn run_weekly_posts(config: &AppConfig) -> anyhow::Result<()> {
    let client = InstagramClient::new(
        &config.instagram,
        config.request_timeout_secs,
        &config.user_agent,
    )?;

    let result = WeeklyPosts::new(&client, SystemClock)
        .get_weekly_posts()
        .await;
    if !result.success {
        tracing::warn!(error = ?result.error, "weekly posts unavailable");
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
