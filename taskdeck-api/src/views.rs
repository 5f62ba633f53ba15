/// View models returned by the page handlers
///
/// Handlers never hand database rows to the presentation layer. They build
/// one of these structs, which serialize to JSON for whatever renders the
/// pages.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::models::task::{Task, TaskFilter};

/// Application title shown on every page
pub const APP_TITLE: &str = "TaskDeck";

/// One task as shown in the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub category: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            category: task.category,
            due_date: task.due_date,
            completed: task.completed,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// The signed-in user's task list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    /// Signed-in user
    pub username: String,

    /// Completion filter in effect
    pub filter: TaskFilter,

    /// Search term in effect, if any
    pub search: Option<String>,

    /// Category filter in effect, if any
    pub category: Option<String>,

    /// The user's distinct categories, sorted
    pub categories: Vec<String>,

    /// Matching tasks, in display order
    pub tasks: Vec<TaskView>,

    /// Total number of tasks the user owns
    pub total_count: i64,

    /// Number of those that are completed
    pub completed_count: i64,
}

/// Login or registration page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPageView {
    pub app_title: String,

    /// Username of the current session, when already signed in
    pub username: Option<String>,

    /// Where the form posts to
    pub form_action: String,
}

impl AuthPageView {
    pub fn new(form_action: &str, username: Option<String>) -> Self {
        Self {
            app_title: APP_TITLE.to_string(),
            username,
            form_action: form_action.to_string(),
        }
    }
}
