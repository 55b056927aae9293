//! Task domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task as returned by the backend
///
/// `id`, `created_at` and `updated_at` are server-assigned; the client never
/// fabricates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-authored task fields for create and full-update calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskDraft {
    /// Create a draft with just a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// List envelope returned by the task collection endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPage {
    pub results: Vec<Task>,
}
