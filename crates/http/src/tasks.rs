//! Task endpoint methods
//!
//! Thin wrappers over the gateway: one logical request each, errors surfaced
//! to the caller without local recovery. There is no client-side task cache;
//! callers re-fetch the list after mutations.

use crate::error::ClientError;
use crate::gateway::Gateway;
use reqwest::Method;
use serde_json::json;
use taskpad_core::{validate_title, Task, TaskDraft, TaskPage};

impl Gateway {
    /// List all tasks for the current user
    pub async fn list_tasks(&self) -> Result<TaskPage, ClientError> {
        self.execute(Method::GET, "/tasks/", None).await
    }

    /// Fetch a single task
    pub async fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        self.execute(Method::GET, &format!("/tasks/{id}/"), None)
            .await
    }

    /// Create a task
    ///
    /// The title is validated locally; an invalid title is rejected before
    /// any request is issued.
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ClientError> {
        validate_title(&draft.title)?;
        self.execute(Method::POST, "/tasks/", Some(serde_json::to_value(draft)?))
            .await
    }

    /// Replace a task's client-authored fields
    pub async fn update_task(&self, id: i64, draft: &TaskDraft) -> Result<Task, ClientError> {
        validate_title(&draft.title)?;
        self.execute(
            Method::PUT,
            &format!("/tasks/{id}/"),
            Some(serde_json::to_value(draft)?),
        )
        .await
    }

    /// Delete a task
    pub async fn delete_task(&self, id: i64) -> Result<(), ClientError> {
        self.execute_empty(Method::DELETE, &format!("/tasks/{id}/"), None)
            .await
    }

    /// Flip a task's completion state via a partial update
    pub async fn toggle_task(&self, id: i64, currently_completed: bool) -> Result<Task, ClientError> {
        self.execute(
            Method::PATCH,
            &format!("/tasks/{id}/"),
            Some(json!({ "is_completed": !currently_completed })),
        )
        .await
    }
}
