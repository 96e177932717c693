use clap::Parser;

use bloodbank_admin::{Cli, run};
use bloodbank_infra::{StoreConfig, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.pretty_logs {
        bloodbank_observability::init_pretty();
    } else {
        bloodbank_observability::init();
    }

    let config = StoreConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");
    let stores = Stores::from_config(&config)?;

    let output = run(&stores, cli.command, cli.json).await?;
    print!("{output}");
    Ok(())
}
