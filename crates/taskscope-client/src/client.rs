//! Queue and index endpoints.

use std::sync::Arc;

use serde::Deserialize;
use taskscope_core::{
    index_namespace, Artifact, ArtifactList, IndexedTask, Platform, TaskDescriptor, TaskGroupPage,
    TaskId, TaskStatus,
};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::delay::{Delay, TokioDelay};
use crate::error::ClientError;
use crate::http::HttpClient;
use crate::pages::TaskGroupPages;

/// `GET /queue/v1/task/<taskId>/status` wraps the status in an envelope.
#[derive(Deserialize)]
struct StatusEnvelope {
    status: TaskStatus,
}

/// Client for the task service's queue, index and artifact APIs.
///
/// Holds no per-task state: every call fetches fresh data.
pub struct TaskClient {
    pub(crate) http: HttpClient,
    pub(crate) config: ClientConfig,
    pub(crate) delay: Arc<dyn Delay>,
}

impl TaskClient {
    /// Create a client using the tokio timer between download attempts.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        info!(root_url = %config.root_url, "Creating task service client");

        Ok(Self {
            http: HttpClient::new(&config)?,
            config,
            delay: Arc::new(TokioDelay),
        })
    }

    /// Replace the delay used between download attempts.
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Look up the task indexed at `namespace`.
    ///
    /// Returns `Ok(None)` when the index has no such entry. Any other error is
    /// returned as-is and not retried.
    pub async fn resolve_indexed_task(
        &self,
        namespace: &str,
    ) -> Result<Option<TaskId>, ClientError> {
        let url = self.http.service_url("index", &format!("/task/{}", namespace));

        match self.http.get_json::<IndexedTask>(&url, &[]).await {
            Ok(indexed) => {
                debug!(namespace = %namespace, task_id = %indexed.task_id, "Resolved indexed task");
                Ok(Some(indexed.task_id))
            }
            Err(e) if e.is_resource_not_found() => {
                debug!(namespace = %namespace, "Namespace not indexed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Find the coverage build of `revision` on `branch` for `platform`.
    pub async fn resolve_coverage_task(
        &self,
        branch: &str,
        revision: &str,
        platform: Platform,
    ) -> Result<Option<TaskId>, ClientError> {
        self.resolve_indexed_task(&index_namespace(branch, revision, platform))
            .await
    }

    pub async fn get_task_status(&self, task_id: &TaskId) -> Result<TaskStatus, ClientError> {
        let url = self.http.service_url("queue", &format!("/task/{}/status", task_id));
        let envelope: StatusEnvelope = self.http.get_json(&url, &[]).await?;
        Ok(envelope.status)
    }

    pub async fn get_task_details(&self, task_id: &TaskId) -> Result<TaskDescriptor, ClientError> {
        let url = self.http.service_url("queue", &format!("/task/{}", task_id));
        self.http.get_json(&url, &[]).await
    }

    pub async fn list_artifacts(&self, task_id: &TaskId) -> Result<Vec<Artifact>, ClientError> {
        let url = self.http.service_url("queue", &format!("/task/{}/artifacts", task_id));
        let list: ArtifactList = self.http.get_json(&url, &[]).await?;
        Ok(list.artifacts)
    }

    /// Lazily page through the tasks of a group.
    pub fn list_task_group(&self, group_id: &TaskId) -> TaskGroupPages<'_> {
        TaskGroupPages::new(self, group_id.clone())
    }

    /// Fetch one page of a task-group listing.
    pub(crate) async fn fetch_group_page(
        &self,
        group_id: &TaskId,
        continuation_token: Option<&str>,
    ) -> Result<TaskGroupPage, ClientError> {
        let url = self.http.service_url("queue", &format!("/task-group/{}/list", group_id));
        let limit = self.config.page_limit.to_string();

        let mut query = vec![("limit", limit.as_str())];
        if let Some(token) = continuation_token {
            query.push(("continuationToken", token));
        }

        self.http.get_json(&url, &query).await
    }

    /// URL of an artifact on the queue. The artifact name is a single
    /// percent-encoded path segment.
    pub fn artifact_url(&self, task_id: &TaskId, artifact: &str) -> String {
        self.http.service_url(
            "queue",
            &format!("/task/{}/artifacts/{}", task_id, urlencoding::encode(artifact)),
        )
    }
}
