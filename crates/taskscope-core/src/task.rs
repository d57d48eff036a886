//! Queue payloads: task definitions, statuses, artifacts and group listings.

use crate::{TaskId, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Human-readable description attached to every task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMetadata {
    /// Task label, e.g. `test-linux64-ccov/debug-mochitest-e10s-7`.
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub source: String,
}

/// A task definition as returned by `GET /queue/v1/task/<taskId>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    pub metadata: TaskMetadata,

    #[serde(default)]
    pub task_group_id: Option<TaskId>,

    #[serde(default)]
    pub provisioner_id: Option<String>,

    #[serde(default)]
    pub worker_type: Option<String>,

    /// Routing keys, including index routes.
    #[serde(default)]
    pub routes: Vec<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default)]
    pub created: Option<DateTime<Utc>>,

    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,

    /// Free-form data (treeherder info, chunk counts, ...).
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl TaskDescriptor {
    /// Shortcut for `metadata.name`.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Build a descriptor carrying only a name (useful for testing).
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            metadata: TaskMetadata {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Body of `GET /index/v1/task/<namespace>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedTask {
    pub namespace: String,
    pub task_id: TaskId,

    #[serde(default)]
    pub rank: Option<i64>,

    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

/// A single run of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInfo {
    pub run_id: u32,
    pub state: TaskState,

    #[serde(default)]
    pub reason_created: Option<String>,

    #[serde(default)]
    pub reason_resolved: Option<String>,

    #[serde(default)]
    pub worker_id: Option<String>,

    #[serde(default)]
    pub scheduled: Option<DateTime<Utc>>,

    #[serde(default)]
    pub started: Option<DateTime<Utc>>,

    #[serde(default)]
    pub resolved: Option<DateTime<Utc>>,
}

/// Current status of a task. Never cached: re-fetch it when needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub task_id: TaskId,

    #[serde(default)]
    pub task_group_id: Option<TaskId>,

    pub state: TaskState,

    #[serde(default)]
    pub retries_left: Option<u32>,

    #[serde(default)]
    pub runs: Vec<RunInfo>,
}

impl TaskStatus {
    /// Get the most recent run, if any.
    pub fn latest_run(&self) -> Option<&RunInfo> {
        self.runs.last()
    }
}

/// Descriptor of one artifact published by a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Artifact path, e.g. `public/test_info/code-coverage-grcov.zip`.
    pub name: String,

    pub storage_type: String,

    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,

    #[serde(default)]
    pub content_type: Option<String>,
}

/// Body of `GET /queue/v1/task/<taskId>/artifacts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactList {
    pub artifacts: Vec<Artifact>,
}

/// One entry of a task-group listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTask {
    pub status: TaskStatus,
    pub task: TaskDescriptor,
}

impl GroupTask {
    pub fn task_id(&self) -> &TaskId {
        &self.status.task_id
    }
}

/// One page of `GET /queue/v1/task-group/<groupId>/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGroupPage {
    #[serde(default)]
    pub task_group_id: Option<TaskId>,

    pub tasks: Vec<GroupTask>,

    /// Opaque cursor for the next page; absent on the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}
