//! Trigger-and-wait command

use anyhow::{Context, Result};
use relay_client::JenkinsClient;
use relay_watch::{BuildReport, ErrorKind, Orchestrator};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;

/// Connect to the server, attach to the configured build and wait for its verdict
pub async fn execute(config: &Config, cancel: CancellationToken) -> Result<BuildReport> {
    let http = reqwest::Client::builder()
        .danger_accept_invalid_certs(config.insecure)
        .build()
        .context("Failed to build HTTP client")?;

    let client = JenkinsClient::with_client(&config.base_url, http)
        .with_credentials(&config.user, &config.password);

    client
        .verify()
        .await
        .context("Failed to initialize Jenkins client")?;
    debug!("Connected to {}", client.base_url());

    let orchestrator =
        Orchestrator::new(&client, config.watch_config()).with_cancellation(cancel);

    let report = if config.stream_console {
        let mut stdout = tokio::io::stdout();
        orchestrator.run(config.target(), Some(&mut stdout)).await
    } else {
        orchestrator.run(config.target(), None).await
    };

    report.map_err(|e| match e.kind() {
        ErrorKind::BuildFailure => anyhow::Error::new(e),
        ErrorKind::Timeout | ErrorKind::Fatal => {
            anyhow::Error::new(e).context("Failed to wait for build to complete")
        }
    })
}
