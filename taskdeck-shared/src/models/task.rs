/// Task model and database operations
///
/// Every query in this module that reads or mutates an existing task takes
/// the owning user's ID and folds it into the `WHERE` clause. A task that
/// exists but belongs to somebody else is indistinguishable from a task that
/// does not exist.
///
/// # State Machine
///
/// ```text
/// active ⇄ completed      (toggle_completed, or update with `completed`)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     category TEXT,
///     due_date TEXT,
///     completed BOOLEAN NOT NULL DEFAULT 0,
///     created_at TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::task::{CreateTask, Task, TaskFilter, TaskQuery};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     user_id,
///     title: "Buy milk".to_string(),
///     category: Some("errands".to_string()),
///     due_date: None,
/// }).await?;
///
/// Task::toggle_completed(&pool, task.id, user_id).await?;
///
/// let done = Task::list_for_user(&pool, user_id, &TaskQuery {
///     filter: TaskFilter::Completed,
///     ..Default::default()
/// }).await?;
/// assert_eq!(done.len(), 1);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const TASK_COLUMNS: &str =
    "id, user_id, title, category, due_date, completed, created_at, updated_at";

/// Which slice of a user's tasks to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    /// Every task
    #[default]
    All,

    /// Tasks not yet completed
    Active,

    /// Completed tasks
    Completed,
}

impl TaskFilter {
    /// Converts filter to its query-string form
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Active => "active",
            TaskFilter::Completed => "completed",
        }
    }

    /// SQL predicate on `completed`, if the filter narrows the set
    fn predicate(&self) -> Option<&'static str> {
        match self {
            TaskFilter::All => None,
            TaskFilter::Active => Some("completed = 0"),
            TaskFilter::Completed => Some("completed = 1"),
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(TaskFilter::All),
            "active" => Ok(TaskFilter::Active),
            "completed" => Ok(TaskFilter::Completed),
            other => Err(format!("Unknown filter: {}", other)),
        }
    }
}

/// Task model representing one to-do item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// Owning user
    pub user_id: i64,

    /// Non-empty title
    pub title: String,

    /// Optional free-form category
    pub category: Option<String>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Whether the task is done
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last changed
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// Callers validate the title before building this.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning user
    pub user_id: i64,

    /// Task title
    pub title: String,

    /// Optional category
    pub category: Option<String>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,
}

/// Input for updating a task
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New category (use Some(None) to clear)
    pub category: Option<Option<String>>,

    /// New due date (use Some(None) to clear)
    pub due_date: Option<Option<NaiveDate>>,

    /// Set completion explicitly
    pub completed: Option<bool>,
}

impl UpdateTask {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
            && self.completed.is_none()
    }
}

/// Predicates for listing a user's tasks
///
/// Filter, search and category compose with AND.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    /// Completion filter
    pub filter: TaskFilter,

    /// Case-insensitive substring matched against the title
    pub search: Option<String>,

    /// Exact category match
    pub category: Option<String>,
}

impl Task {
    /// Creates a new, not yet completed task
    ///
    /// # Errors
    ///
    /// Returns a foreign-key error if `user_id` does not reference a user.
    pub async fn create(pool: &SqlitePool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO tasks (user_id, title, category, due_date, completed, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.user_id)
            .bind(data.title)
            .bind(data.category)
            .bind(data.due_date)
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Applies a partial update to a task owned by `user_id`
    ///
    /// `updated_at` is always bumped, so an empty update still reports
    /// whether the task exists.
    ///
    /// # Returns
    ///
    /// The updated task, or None if no task with this ID belongs to the user
    pub async fn update_for_user(
        pool: &SqlitePool,
        id: i64,
        user_id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = ?");

        if data.title.is_some() {
            query.push_str(", title = ?");
        }
        if data.category.is_some() {
            query.push_str(", category = ?");
        }
        if data.due_date.is_some() {
            query.push_str(", due_date = ?");
        }
        if data.completed.is_some() {
            query.push_str(", completed = ?");
        }

        query.push_str(" WHERE id = ? AND user_id = ? RETURNING ");
        query.push_str(TASK_COLUMNS);

        let mut q = sqlx::query_as::<_, Task>(&query).bind(Utc::now());

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(category) = data.category {
            q = q.bind(category);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(completed) = data.completed {
            q = q.bind(completed);
        }

        let task = q.bind(id).bind(user_id).fetch_optional(pool).await?;

        Ok(task)
    }

    /// Flips the completed flag of a task owned by `user_id`
    ///
    /// The flip happens inside a single statement, so two concurrent toggles
    /// always cancel out.
    pub async fn toggle_completed(
        pool: &SqlitePool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE tasks
            SET completed = NOT completed,
                updated_at = ?
            WHERE id = ? AND user_id = ?
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(Utc::now())
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Deletes a task owned by `user_id`
    ///
    /// # Returns
    ///
    /// True if a task was deleted, false if none matched
    pub async fn delete_for_user(
        pool: &SqlitePool,
        id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a user's tasks matching `params`
    ///
    /// Ordering: open tasks first, then by due date (undated last), then
    /// newest first.
    pub async fn list_for_user(
        pool: &SqlitePool,
        user_id: i64,
        params: &TaskQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!("SELECT {} FROM tasks WHERE user_id = ?", TASK_COLUMNS);

        if let Some(predicate) = params.filter.predicate() {
            query.push_str(" AND ");
            query.push_str(predicate);
        }

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let category = params
            .category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if category.is_some() {
            query.push_str(" AND category = ?");
        }

        query.push_str(
            " ORDER BY completed ASC, due_date IS NULL, due_date ASC, created_at DESC, id DESC",
        );

        debug!(
            user_id,
            filter = %params.filter,
            search = ?search,
            category = ?category,
            "Listing tasks"
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(user_id);
        if let Some(category) = category {
            q = q.bind(category.to_string());
        }

        let mut tasks = q.fetch_all(pool).await?;

        // SQLite's lower() only folds ASCII, so the title match runs here
        if let Some(term) = search {
            let term = term.to_lowercase();
            tasks.retain(|task| task.title.to_lowercase().contains(&term));
        }

        Ok(tasks)
    }

    /// Distinct non-empty categories used by a user, sorted
    pub async fn categories_for_user(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT category
            FROM tasks
            WHERE user_id = ? AND category IS NOT NULL AND category != ''
            ORDER BY category
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(category,)| category).collect())
    }

    /// Counts a user's tasks, total and completed
    pub async fn count_for_user(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<(i64, i64), sqlx::Error> {
        let (total, completed): (i64, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), SUM(completed) FROM tasks WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok((total, completed.unwrap_or(0)))
    }
}
