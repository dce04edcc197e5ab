mod tunnel;
mod weekly;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "postboard-cli")]
#[command(about = "postboard command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Request a public HTTPS tunnel URL for the local server
    Tunnel {
        /// Local port the tunnel should forward to
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Tunnel provider base URL
        #[arg(long, env = "LOCALTUNNEL_URL", default_value = tunnel::DEFAULT_SERVICE_URL)]
        service_url: String,
    },
    /// Print this week's Instagram posts as JSON
    WeeklyPosts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Tunnel { port, service_url }) => {
            tunnel::run_tunnel(&service_url, port).await?;
        }
        Some(Commands::WeeklyPosts) => {
            let config = postboard_core::load_app_config()?;
            weekly::run_weekly_posts(&config).await?;
        }
        None => println!("postboard-cli: run with --help to list commands"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
