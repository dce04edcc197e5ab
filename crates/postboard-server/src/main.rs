mod api;
mod middleware;

use std::sync::Arc;

use postboard_core::Environment;
use postboard_instagram::{InstagramClient, MediaSource};
use postboard_supabase::{SupabaseClient, SupabaseError};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = postboard_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let instagram = InstagramClient::new(
        &config.instagram,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    if !instagram.is_configured() {
        tracing::warn!(
            "INSTAGRAM_ACCESS_TOKEN / INSTAGRAM_BUSINESS_ACCOUNT_ID not set; weekly posts will report not configured"
        );
    }

    let supabase = match SupabaseClient::from_settings(
        &config.supabase,
        config.request_timeout_secs,
        &config.user_agent,
    ) {
        Ok(client) => Some(Arc::new(client)),
        Err(SupabaseError::NotConfigured) if config.env == Environment::Development => {
            tracing::warn!(
                "SUPABASE_URL / SUPABASE_ANON_KEY not set; dashboard statistics disabled in development"
            );
            None
        }
        Err(SupabaseError::NotConfigured) => {
            anyhow::bail!("SUPABASE_URL and SUPABASE_ANON_KEY are required outside development")
        }
        Err(e) => return Err(e.into()),
    };

    let app = build_app(AppState {
        instagram: Arc::new(instagram),
        supabase,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(env = %config.env, addr = %config.bind_addr, "postboard server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
