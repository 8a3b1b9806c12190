//! ordex - Order Execution CLI - Entry Point

use anyhow::Result;
use clap::Parser;
use ordex_cli::{app, AppConfig, Application, Args};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    ordex_telemetry::init_logging()?;

    info!("Starting ordex v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load(args.config.as_deref())?;
    let credentials = args.credentials()?;
    let action = args.action()?;

    let application = Application::new(&config, credentials, args.testnet)?;
    application.install_signal_handler();
    application.startup().await?;

    let result = application.run(action).await?;
    if let Some(err) = app::exit_error(&result) {
        return Err(err.into());
    }

    Ok(())
}
