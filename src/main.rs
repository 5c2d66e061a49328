//! chrometrace: capture a trace from a Chrome DevTools Protocol endpoint
//!
//! Connects to a remote-debugging endpoint, records tracing data until
//! Ctrl-C, and writes the collected events as a JSON trace viewers can load.

mod cli;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cdp_client::CdpClient;
use trace_session::SessionController;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Log to stderr; stdout is reserved for the trace itself
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let client_config = cli.client_config();

    if cli.show_categories {
        let client = CdpClient::connect(&client_config)
            .await
            .context("connecting to the remote debugging endpoint")?;
        let categories = trace_session::list_categories(&client).await?;
        for category in &categories {
            println!("{}", category);
        }
        client.close();
        return Ok(());
    }

    let controller = SessionController::new(cli.trace_config());
    let report = controller
        .capture(&client_config, async {
            if tokio::signal::ctrl_c().await.is_err() {
                // No interrupt handler; run until the endpoint stops tracing
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!(
        "Capture finished: {} events{}",
        report.events,
        if report.data_loss {
            " (data loss reported)"
        } else {
            ""
        }
    );

    Ok(())
}
