use anyhow::Result;
use clap::Parser;
use tracing::info;

use gpkg_optimizer_cli::{run, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    info!("Starting...");
    let report = run(&cli).await?;
    if cli.dry_run {
        for sql in report.plan.sql() {
            println!("{sql}");
        }
    }
    println!("{}", report.summary);
    Ok(())
}
