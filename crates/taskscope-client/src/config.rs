//! Client configuration.

use std::time::Duration;

/// Environment variable holding the deployment root URL.
pub const ROOT_URL_ENV: &str = "TASKCLUSTER_ROOT_URL";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deployment root URL; services live under `<root_url>/api/<service>/v1`.
    pub root_url: String,

    /// Page size requested from task-group listings.
    pub page_limit: u32,

    /// Total download attempts, the first one included.
    pub download_attempts: u32,

    /// Pause between two download attempts.
    pub retry_delay: Duration,

    /// TCP connect timeout.
    pub connect_timeout: Duration,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            root_url: "https://firefox-ci-tc.services.mozilla.com".to_string(),
            page_limit: 200,
            download_attempts: 5,
            retry_delay: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
            user_agent: concat!("taskscope/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults, with the root URL taken from `TASKCLUSTER_ROOT_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(root_url) = std::env::var(ROOT_URL_ENV) {
            if !root_url.trim().is_empty() {
                config.root_url = root_url;
            }
        }
        config
    }

    pub fn with_root_url(mut self, root_url: impl Into<String>) -> Self {
        self.root_url = root_url.into();
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}
