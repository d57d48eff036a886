//! HTTP plumbing shared by every endpoint.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Error document returned by the services.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// Thin wrapper around `reqwest::Client` bound to one deployment.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    root_url: String,
}

impl HttpClient {
    /// Create a new HTTP client. Redirects are followed with reqwest's
    /// default policy.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            inner,
            root_url: config.root_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of `path` on `service` (e.g. `queue`, `index`).
    pub fn service_url(&self, service: &str, path: &str) -> String {
        format!("{}/api/{}/v1{}", self.root_url, service, path)
    }

    /// GET a URL, turning non-2xx answers into errors.
    pub async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, ClientError> {
        debug!(url = %url, "GET request");

        let response = self.inner.get(url).query(query).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.bytes().await?;
        Err(error_from_body(status, url, &body))
    }

    /// GET JSON from a URL.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let response = self.get(url, query).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn error_from_body(status: StatusCode, url: String, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { code, message }) => {
            debug!(status = %status, code = %code, "Service returned an error");
            ClientError::Service {
                status,
                code,
                message,
            }
        }
        Err(_) => ClientError::Status { status, url },
    }
}
