//! Relay CLI
//!
//! Triggers a Jenkins job (or attaches to an existing build), streams its
//! console output and exits with the build's verdict.
//!
//! Every flag can also be set through its `JENKINS_*` environment variable.

mod config;
mod duration;
mod run;
mod shutdown;

use std::process::ExitCode;

use clap::Parser;
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(about = "Trigger a Jenkins job and wait for its result", long_about = None)]
pub struct Cli {
    /// Jenkins base URL, e.g. https://jenkins.example.com
    #[arg(long, env = "JENKINS_BASE_URL")]
    base_url: Option<String>,

    /// Jenkins user name
    #[arg(long, env = "JENKINS_USER")]
    user: Option<String>,

    /// Jenkins password or API token
    #[arg(long, env = "JENKINS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Job name, with folders separated by '/', e.g. my_folder/my_job
    #[arg(long, env = "JENKINS_JOB_NAME")]
    job_name: Option<String>,

    /// Existing build to wait for; 0 triggers a new build
    #[arg(long, env = "JENKINS_JOB_BUILD_ID", default_value_t = 0)]
    build_id: u64,

    /// Job parameters as a flat JSON object, e.g. {"BRANCH": "main"}
    #[arg(long, env = "JENKINS_JOB_PARAMETERS")]
    job_parameters: Option<String>,

    /// How long to wait for the build (e.g. 30m); 0 means do not wait, unset waits indefinitely
    #[arg(long, env = "JENKINS_WAIT_TIMEOUT")]
    wait_timeout: Option<String>,

    /// How often to poll the queue and the build
    #[arg(long, env = "JENKINS_WAIT_POLLING_INTERVAL", default_value = "500ms")]
    wait_polling_interval: String,

    /// Skip TLS certificate verification
    #[arg(long, env = "JENKINS_INSECURE")]
    insecure: bool,

    /// Do not stream the build's console output
    #[arg(long, env = "JENKINS_NO_CONSOLE")]
    no_console: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay=info,relay_watch=info,relay_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match Config::from_cli(Cli::parse()) {
        Ok(config) => config,
        Err(errors) => {
            eprintln!("{}", "Errors:".red().bold());
            for error in errors {
                eprintln!("  - {}", error);
            }
            return ExitCode::FAILURE;
        }
    };

    let cancel = shutdown::install_shutdown_handler();

    match run::execute(&config, cancel).await {
        Ok(report) => {
            println!(
                "{} Job {} successfully completed, URL: {}",
                "✓".green(),
                report.job.to_string().bold(),
                report.url
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{} {:#}", "✗".red(), e);
            ExitCode::FAILURE
        }
    }
}
