mod answer;
mod cli;
mod form;
mod inference;
mod markdown;
mod present;
mod session;
mod wiki;

pub const USER_AGENT: &str = concat!(
    "wikisage/",
    env!("CARGO_PKG_VERSION"),
    " (interactive Wikipedia question answering)"
);

use clap::Parser;
use cli::Cli;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wikisage=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    info!(lang = %cli.lang, mode = %cli.mode, once = cli.once, "starting wikisage");

    cli.run()
        .await
        .inspect_err(|e| tracing::error!("session failed: {e}"))?;

    info!("wikisage stopped");
    Ok(())
}
