use clap::Parser;

mod commands;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Credentials come from the environment; a local .env is a
    // convenience, not a requirement.
    dotenv::dotenv().ok();

    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "trendpulse=info,youtube_client=info,trend_engine=info".to_string());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting TrendPulse - trending-video momentum analysis");

    let cli = commands::Cli::parse();
    commands::run(cli).await
}
