use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use feedrank::config::Credentials;
use feedrank::crawler::Crawler;
use feedrank::driver;
use feedrank::gateway::twitter::TwitterGateway;

/// Rank the accounts a user follows by how much they post over a common,
/// fairly-aligned time window.
#[derive(Parser)]
#[command(name = "feedrank", version, about)]
struct Cli {
    /// Screen name of the account whose follow list is compared
    screen_name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feedrank=debug")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let credentials = Credentials::from_env()?;

    let gateway = TwitterGateway::new(&credentials).context("building gateway client")?;
    let crawler = Crawler::new(gateway.clone());

    let ranked = driver::run(&gateway, &crawler, &cli.screen_name).await?;

    for entry in &ranked {
        println!("{entry}");
    }

    Ok(())
}
