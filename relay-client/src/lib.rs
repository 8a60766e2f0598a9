//! Relay HTTP Client
//!
//! A small, type-safe client for the parts of the Jenkins remote API needed to
//! trigger a job and follow its build.
//!
//! The lifecycle code never talks to [`JenkinsClient`] directly; it goes
//! through the [`BuildServer`] trait so it can be exercised against fakes.
//!
//! # Example
//!
//! ```no_run
//! use relay_client::{BuildServer, JenkinsClient};
//! use relay_core::domain::job::JobReference;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = JenkinsClient::new("https://jenkins.example.com")
//!         .with_credentials("me@example.com", "api-token");
//!     client.verify().await?;
//!
//!     let job = JobReference::parse("my_folder/my_job")?;
//!     let entry = client.start_build(&job, &Default::default()).await?;
//!     println!("Queued as {}", entry);
//!     Ok(())
//! }
//! ```

pub mod error;
mod builds;
mod jobs;
mod queue;
mod server;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use server::BuildServer;

use relay_core::domain::job::JobReference;
use relay_core::dto::server::Crumb;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::debug;

/// Basic-auth credentials (user name and password or API token)
#[derive(Clone)]
struct Credentials {
    user: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// HTTP client for a Jenkins server
///
/// Methods are organized by resource:
/// - Jobs: lookup and build submission
/// - Queue: queue item inspection
/// - Builds: lookup, status polling and progressive console output
#[derive(Debug)]
pub struct JenkinsClient {
    /// Base URL of the server (e.g., "https://jenkins.example.com")
    base_url: String,
    /// HTTP client instance
    client: Client,
    credentials: Option<Credentials>,
    /// CSRF crumb, fetched on first POST; `None` when the server issues none
    crumb: OnceCell<Option<Crumb>>,
}

impl JenkinsClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the Jenkins server
    ///
    /// # Example
    /// ```
    /// use relay_client::JenkinsClient;
    ///
    /// let client = JenkinsClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use relay_client::JenkinsClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = JenkinsClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            credentials: None,
            crumb: OnceCell::new(),
        }
    }

    /// Authenticate every request with HTTP basic auth
    pub fn with_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            user: user.into(),
            password: password.into(),
        });
        self
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the server is reachable and accepts the credentials
    pub async fn verify(&self) -> Result<()> {
        let url = format!("{}/api/json", self.base_url);
        let response = self.get(&url).send().await?;

        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Request Builders
    // =============================================================================

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(creds) => request.basic_auth(&creds.user, Some(&creds.password)),
            None => request,
        }
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.authorize(self.client.get(url))
    }

    /// Build a POST request carrying the CSRF crumb when the server issues one
    async fn post(&self, url: &str) -> Result<RequestBuilder> {
        let request = self.authorize(self.client.post(url));

        match self.crumb().await? {
            Some(crumb) => Ok(request.header(
                crumb.crumb_request_field.as_str(),
                crumb.crumb.as_str(),
            )),
            None => Ok(request),
        }
    }

    async fn crumb(&self) -> Result<Option<&Crumb>> {
        let crumb = self.crumb.get_or_try_init(|| self.fetch_crumb()).await?;
        Ok(crumb.as_ref())
    }

    async fn fetch_crumb(&self) -> Result<Option<Crumb>> {
        let url = format!("{}/crumbIssuer/api/json", self.base_url);
        let response = self.get(&url).send().await?;

        match self.handle_response::<Crumb>(response).await {
            Ok(crumb) => Ok(Some(crumb)),
            Err(e) if e.is_not_found() => {
                debug!("Server issues no CSRF crumbs");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Absolute URL of a job, ending in `/`
    ///
    /// Each segment is nested under a `job/` path element and percent-encoded.
    fn job_url(&self, job: &JobReference) -> Result<String> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::InvalidRequest(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;

        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::InvalidRequest(format!("base URL '{}' cannot carry a path", self.base_url))
            })?;
            path.pop_if_empty();
            for segment in job.segments() {
                path.push("job").push(segment);
            }
            path.push("");
        }

        Ok(url.to_string())
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// A 404 becomes [`ClientError::NotFound`]; any other failure status
    /// becomes [`ClientError::ApiError`].
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body is not needed
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await.map(|_| ())
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(response.url().to_string()));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

/// Append a trailing slash unless one is already present
fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}
