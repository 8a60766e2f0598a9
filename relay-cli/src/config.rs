//! Configuration module
//!
//! Validates the command-line values and turns them into the settings the
//! run needs. Every problem is collected so they can be reported together
//! before anything is sent to the server.

use std::collections::HashMap;
use std::time::Duration;

use relay_core::domain::job::JobReference;
use relay_watch::{Target, WatchConfig, trigger::parse_parameters};

use crate::Cli;
use crate::duration::parse_duration;

/// Validated CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub user: String,
    pub password: String,
    pub job: JobReference,
    /// Existing build to follow; `None` triggers a new one
    pub build_id: Option<u64>,
    pub parameters: HashMap<String, String>,
    /// `None` waits indefinitely
    pub wait_timeout: Option<Duration>,
    pub poll_interval: Duration,
    pub insecure: bool,
    pub stream_console: bool,
}

impl Config {
    /// Validate the parsed arguments
    ///
    /// Returns every problem found, not just the first one.
    pub fn from_cli(cli: Cli) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let base_url = required(cli.base_url, "--base-url", "JENKINS_BASE_URL", &mut errors)
            .and_then(|url| {
                if url.starts_with("http://") || url.starts_with("https://") {
                    Some(url)
                } else {
                    errors.push(format!(
                        "--base-url must start with http:// or https://, got '{}'",
                        url
                    ));
                    None
                }
            });
        let user = required(cli.user, "--user", "JENKINS_USER", &mut errors);
        let password = required(cli.password, "--password", "JENKINS_PASSWORD", &mut errors);

        let job = required(cli.job_name, "--job-name", "JENKINS_JOB_NAME", &mut errors)
            .and_then(|name| {
                JobReference::parse(&name)
                    .map_err(|e| errors.push(format!("--job-name: {}", e)))
                    .ok()
            });

        let parameters = parse_parameters(cli.job_parameters.as_deref().unwrap_or(""))
            .map_err(|e| errors.push(format!("--job-parameters: {}", e)))
            .ok();

        let wait_timeout = match cli.wait_timeout.as_deref().map(str::trim) {
            None | Some("") => Some(None),
            Some(value) => parse_duration(value)
                .map(Some)
                .map_err(|e| errors.push(format!("--wait-timeout: {}", e)))
                .ok(),
        };

        let poll_interval = match parse_duration(&cli.wait_polling_interval) {
            Ok(interval) if interval.is_zero() => {
                errors.push("--wait-polling-interval must be greater than 0".to_string());
                None
            }
            Ok(interval) => Some(interval),
            Err(e) => {
                errors.push(format!("--wait-polling-interval: {}", e));
                None
            }
        };

        match (
            base_url,
            user,
            password,
            job,
            parameters,
            wait_timeout,
            poll_interval,
        ) {
            (
                Some(base_url),
                Some(user),
                Some(password),
                Some(job),
                Some(parameters),
                Some(wait_timeout),
                Some(poll_interval),
            ) if errors.is_empty() => Ok(Self {
                base_url,
                user,
                password,
                job,
                build_id: (cli.build_id != 0).then_some(cli.build_id),
                parameters,
                wait_timeout,
                poll_interval,
                insecure: cli.insecure,
                stream_console: !cli.no_console,
            }),
            _ => Err(errors),
        }
    }

    /// The build this run follows
    pub fn target(&self) -> Target {
        match self.build_id {
            Some(number) => Target::Existing {
                job: self.job.clone(),
                number,
            },
            None => Target::Trigger {
                job: self.job.clone(),
                parameters: self.parameters.clone(),
            },
        }
    }

    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig::default()
            .with_poll_interval(self.poll_interval)
            .with_wait_timeout(self.wait_timeout)
    }
}

fn required(
    value: Option<String>,
    flag: &str,
    env: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            errors.push(format!("{} (or {}) is required", flag, env));
            None
        }
    }
}
