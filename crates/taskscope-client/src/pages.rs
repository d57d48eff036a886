//! Cursor-following iteration over task-group listings.

use taskscope_core::{classify, Classification, GroupTask, TaskGroupPage, TaskId, TaskIdentity};
use tracing::{debug, warn};

use crate::client::TaskClient;
use crate::error::ClientError;

/// Where the next request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    Continue(String),
    Done,
}

/// Pull-based pager over a task group.
///
/// Each call to [`next_page`](Self::next_page) issues one request carrying the
/// cursor of the previous page. A failed request leaves the cursor untouched,
/// so calling again retries the same page.
pub struct TaskGroupPages<'c> {
    client: &'c TaskClient,
    group_id: TaskId,
    cursor: Cursor,
    pages_fetched: usize,
}

impl<'c> TaskGroupPages<'c> {
    pub(crate) fn new(client: &'c TaskClient, group_id: TaskId) -> Self {
        Self {
            client,
            group_id,
            cursor: Cursor::Start,
            pages_fetched: 0,
        }
    }

    /// Returns true once a page without continuation token was received.
    pub fn is_exhausted(&self) -> bool {
        self.cursor == Cursor::Done
    }

    /// Go back to the first page.
    pub fn restart(&mut self) {
        self.cursor = Cursor::Start;
        self.pages_fetched = 0;
    }

    /// Fetch the next page, or `None` after the last one.
    pub async fn next_page(&mut self) -> Result<Option<TaskGroupPage>, ClientError> {
        let token = match &self.cursor {
            Cursor::Done => return Ok(None),
            Cursor::Start => None,
            Cursor::Continue(token) => Some(token.as_str()),
        };

        let page = self.client.fetch_group_page(&self.group_id, token).await?;
        self.pages_fetched += 1;
        debug!(
            group_id = %self.group_id,
            page = self.pages_fetched,
            tasks = page.tasks.len(),
            has_more = page.continuation_token.is_some(),
            "Fetched task group page"
        );

        self.cursor = match &page.continuation_token {
            Some(token) => Cursor::Continue(token.clone()),
            None => Cursor::Done,
        };
        Ok(Some(page))
    }

    /// Drain the remaining pages into one list, in server order.
    pub async fn collect_tasks(&mut self) -> Result<Vec<GroupTask>, ClientError> {
        let mut tasks = Vec::new();
        while let Some(page) = self.next_page().await? {
            tasks.extend(page.tasks);
        }
        Ok(tasks)
    }
}

impl TaskClient {
    /// Every task of a group, across all pages.
    pub async fn list_task_group_all(
        &self,
        group_id: &TaskId,
    ) -> Result<Vec<GroupTask>, ClientError> {
        self.list_task_group(group_id).collect_tasks().await
    }

    /// Coverage tasks of a group paired with their identity.
    ///
    /// Coverage tasks whose name cannot be classified are skipped with a warning.
    pub async fn list_coverage_tasks(
        &self,
        group_id: &TaskId,
    ) -> Result<Vec<(GroupTask, TaskIdentity)>, ClientError> {
        let tasks = self.list_task_group_all(group_id).await?;

        Ok(tasks
            .into_iter()
            .filter_map(|task| match classify(task.task.name()) {
                Ok(Classification::Coverage(identity)) => Some((task, identity)),
                Ok(Classification::NotCoverage) => None,
                Err(e) => {
                    if task.task.is_coverage_task() {
                        warn!(
                            task_id = %task.task_id(),
                            error = %e,
                            "Skipping unclassifiable coverage task"
                        );
                    }
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{serve, test_client};
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use taskscope_core::Platform;

    const GROUP_ID: &str = "aPt9FbIdQwmhwDIPDYLuaw";
    const TOKEN: &str = "1!32!YVB0OUZiSWRRd21od0RJUERZTHVhdw--~1!32!ZnJVcGRRT0VTalN0Nm9Ua1Ztcy04UQ--";

    fn group_task(task_id: &str, name: &str) -> Value {
        json!({
            "status": {"taskId": task_id, "taskGroupId": GROUP_ID, "state": "completed", "runs": []},
            "task": {"metadata": {"name": name}, "taskGroupId": GROUP_ID}
        })
    }

    fn first_page() -> Value {
        json!({
            "taskGroupId": GROUP_ID,
            "tasks": [
                group_task("task-1", "test-linux64-ccov/debug-mochitest-e10s-7"),
                group_task("task-2", "test-linux64/debug-mochitest-1"),
            ],
            "continuationToken": TOKEN
        })
    }

    fn second_page() -> Value {
        json!({
            "taskGroupId": GROUP_ID,
            "tasks": [
                group_task("task-3", "build-win64-ccov/debug"),
                group_task("task-4", "test-macosx64-ccov/debug-cppunit"),
            ]
        })
    }

    /// Two-page group that checks the query string of every request.
    fn group_router(requests: Arc<AtomicUsize>) -> Router {
        Router::new().route(
            "/api/queue/v1/task-group/:group_id/list",
            get(
                move |Path(group_id): Path<String>, Query(query): Query<HashMap<String, String>>| {
                    let requests = requests.clone();
                    async move {
                        requests.fetch_add(1, Ordering::SeqCst);
                        assert_eq!(group_id, GROUP_ID);
                        if query.get("limit").map(String::as_str) != Some("200") {
                            return StatusCode::BAD_REQUEST.into_response();
                        }
                        match query.get("continuationToken").map(String::as_str) {
                            None => Json(first_page()).into_response(),
                            Some(TOKEN) => Json(second_page()).into_response(),
                            Some(_) => StatusCode::BAD_REQUEST.into_response(),
                        }
                    }
                },
            ),
        )
    }

    fn ids(tasks: &[GroupTask]) -> Vec<&str> {
        tasks.iter().map(|t| t.task_id().as_str()).collect()
    }

    #[tokio::test]
    async fn test_pages_follow_cursor() {
        let requests = Arc::new(AtomicUsize::new(0));
        let (client, _) = test_client(&serve(group_router(requests.clone())).await);
        let group_id = TaskId::new(GROUP_ID);

        let mut pages = client.list_task_group(&group_id);
        let first = pages.next_page().await.unwrap().unwrap();
        assert_eq!(ids(&first.tasks), ["task-1", "task-2"]);
        assert!(!pages.is_exhausted());

        let second = pages.next_page().await.unwrap().unwrap();
        assert_eq!(ids(&second.tasks), ["task-3", "task-4"]);
        assert!(pages.is_exhausted());

        assert!(pages.next_page().await.unwrap().is_none());
        assert_eq!(requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_list_all_concatenates_pages() {
        let requests = Arc::new(AtomicUsize::new(0));
        let (client, _) = test_client(&serve(group_router(requests)).await);

        let tasks = client.list_task_group_all(&TaskId::new(GROUP_ID)).await.unwrap();

        let first: Vec<GroupTask> = serde_json::from_value(first_page()["tasks"].clone()).unwrap();
        let second: Vec<GroupTask> = serde_json::from_value(second_page()["tasks"].clone()).unwrap();
        let expected: Vec<GroupTask> = first.into_iter().chain(second).collect();
        assert_eq!(tasks, expected);
    }

    #[tokio::test]
    async fn test_restart_reissues_first_request() {
        let requests = Arc::new(AtomicUsize::new(0));
        let (client, _) = test_client(&serve(group_router(requests.clone())).await);
        let group_id = TaskId::new(GROUP_ID);

        let mut pages = client.list_task_group(&group_id);
        assert_eq!(pages.collect_tasks().await.unwrap().len(), 4);

        pages.restart();
        let again = pages.next_page().await.unwrap().unwrap();
        assert_eq!(ids(&again.tasks), ["task-1", "task-2"]);
        assert_eq!(requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_cursor() {
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = requests.clone();
        let router = Router::new().route(
            "/api/queue/v1/task-group/:group_id/list",
            get(move |Query(query): Query<HashMap<String, String>>| {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    match (query.contains_key("continuationToken"), n) {
                        (false, _) => Json(first_page()).into_response(),
                        // First attempt at the second page fails.
                        (true, 1) => (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({"code": "InternalServerError", "message": "try again"})),
                        )
                            .into_response(),
                        (true, _) => Json(second_page()).into_response(),
                    }
                }
            }),
        );
        let (client, _) = test_client(&serve(router).await);
        let group_id = TaskId::new(GROUP_ID);

        let mut pages = client.list_task_group(&group_id);
        pages.next_page().await.unwrap();
        assert!(pages.next_page().await.is_err());

        let second = pages.next_page().await.unwrap().unwrap();
        assert_eq!(ids(&second.tasks), ["task-3", "task-4"]);
    }

    #[tokio::test]
    async fn test_list_coverage_tasks() {
        let requests = Arc::new(AtomicUsize::new(0));
        let (client, _) = test_client(&serve(group_router(requests)).await);

        let coverage = client.list_coverage_tasks(&TaskId::new(GROUP_ID)).await.unwrap();

        let summary: Vec<(&str, Platform, &str)> = coverage
            .iter()
            .map(|(task, identity)| (task.task_id().as_str(), identity.platform, identity.chunk.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                ("task-1", Platform::Linux, "mochitest-plain-chunked-7"),
                ("task-3", Platform::Windows, "build"),
            ]
        );
    }
}
