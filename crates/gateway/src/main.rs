use anyhow::Result;
use profitwise_gateway::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load server configuration
    let config = Config::load()?;
    config.validate()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "profitwise={level},tower_http={level},{level}",
            level = config.logging.level
        ))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    profitwise_gateway::run(config).await
}
