/// Task endpoints
///
/// Every handler here runs behind the session guard and receives the
/// caller's [`SessionContext`]. All queries are scoped to that user, so a
/// task ID that belongs to somebody else answers 404 exactly like one that
/// does not exist.
///
/// # Endpoints
///
/// - `GET  /tasks?filter=&q=&category=` - Dashboard
/// - `POST /tasks` - Create a task
/// - `POST /tasks/:id` - Partial update
/// - `POST /tasks/:id/toggle` - Flip completed
/// - `POST /tasks/:id/delete` - Delete
///
/// Mutations answer `303 See Other` back to `/tasks`. A malformed ID or
/// query string answers `400 Bad Request`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Form, Path, Query},
    views::{DashboardView, TaskView},
};
use axum::{extract::State, response::Redirect, Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use taskdeck_shared::{
    auth::context::SessionContext,
    models::task::{CreateTask, Task, TaskFilter, TaskQuery, UpdateTask},
};
use tracing::info;
use validator::Validate;

const TASKS_PATH: &str = "/tasks";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Dashboard query string
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub filter: Option<String>,
    pub q: Option<String>,
    pub category: Option<String>,
}

/// Submitted create form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTaskForm {
    pub title: String,
    pub category: Option<String>,
    pub due_date: Option<String>,
}

/// Submitted edit form
///
/// A field missing from the form is left untouched. An empty `category` or
/// `due_date` clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTaskForm {
    pub title: Option<String>,
    pub category: Option<String>,
    pub due_date: Option<String>,
    pub completed: Option<String>,
}

/// Validated input for a new task
#[derive(Debug, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,

    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    pub category: Option<String>,

    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn parse(form: CreateTaskForm) -> ApiResult<Self> {
        let task = Self {
            title: form.title.trim().to_string(),
            category: non_empty(form.category),
            due_date: parse_due_date(form.due_date.as_deref())?,
        };
        task.validate()?;
        Ok(task)
    }
}

/// Text fields of an edit, checked with the same limits as [`NewTask`]
#[derive(Debug, Validate)]
struct TaskChanges {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    title: Option<String>,

    #[validate(length(max = 50, message = "Category must be at most 50 characters"))]
    category: Option<String>,
}

/// Normalizes an edit form into a partial update
pub fn parse_update(form: UpdateTaskForm) -> ApiResult<UpdateTask> {
    let title = form.title.map(|t| t.trim().to_string());
    let category = form.category.map(|c| non_empty(Some(c)));

    TaskChanges {
        title: title.clone(),
        category: category.clone().flatten(),
    }
    .validate()?;

    let due_date = match form.due_date {
        Some(raw) => Some(parse_due_date(Some(&raw))?),
        None => None,
    };

    let completed = form.completed.as_deref().map(parse_checkbox).transpose()?;

    Ok(UpdateTask {
        title,
        category,
        due_date,
        completed,
    })
}

/// Dashboard: the user's tasks, filtered and searched
///
/// # Errors
///
/// - `422 Unprocessable Entity`: unknown `filter` value
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<DashboardView>> {
    let filter = params
        .filter
        .as_deref()
        .unwrap_or_default()
        .parse::<TaskFilter>()
        .map_err(|e| ApiError::validation("filter", e))?;

    let query = TaskQuery {
        filter,
        search: non_empty(params.q),
        category: non_empty(params.category),
    };

    let tasks = Task::list_for_user(&state.db, session.user_id, &query).await?;
    let categories = Task::categories_for_user(&state.db, session.user_id).await?;
    let (total_count, completed_count) = Task::count_for_user(&state.db, session.user_id).await?;

    Ok(Json(DashboardView {
        username: session.username,
        filter: query.filter,
        search: query.search,
        category: query.category,
        categories,
        tasks: tasks.into_iter().map(TaskView::from).collect(),
        total_count,
        completed_count,
    }))
}

/// Create a task
///
/// # Errors
///
/// - `422 Unprocessable Entity`: empty title, overlong category, bad due date
pub async fn create_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Form(form): Form<CreateTaskForm>,
) -> ApiResult<Redirect> {
    let input = NewTask::parse(form)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            user_id: session.user_id,
            title: input.title,
            category: input.category,
            due_date: input.due_date,
        },
    )
    .await?;

    info!(user_id = session.user_id, task_id = task.id, "Task created");

    Ok(Redirect::to(TASKS_PATH))
}

/// Partially update a task
///
/// # Errors
///
/// - `404 Not Found`: no such task for this user
/// - `422 Unprocessable Entity`: invalid field values
pub async fn update_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<i64>,
    Form(form): Form<UpdateTaskForm>,
) -> ApiResult<Redirect> {
    let changes = parse_update(form)?;

    Task::update_for_user(&state.db, id, session.user_id, changes)
        .await?
        .ok_or_else(task_not_found)?;

    info!(user_id = session.user_id, task_id = id, "Task updated");

    Ok(Redirect::to(TASKS_PATH))
}

/// Flip a task between active and completed
pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<i64>,
) -> ApiResult<Redirect> {
    let task = Task::toggle_completed(&state.db, id, session.user_id)
        .await?
        .ok_or_else(task_not_found)?;

    info!(
        user_id = session.user_id,
        task_id = id,
        completed = task.completed,
        "Task toggled"
    );

    Ok(Redirect::to(TASKS_PATH))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<i64>,
) -> ApiResult<Redirect> {
    if !Task::delete_for_user(&state.db, id, session.user_id).await? {
        return Err(task_not_found());
    }

    info!(user_id = session.user_id, task_id = id, "Task deleted");

    Ok(Redirect::to(TASKS_PATH))
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

/// Trims a form value, mapping blank to None
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional `YYYY-MM-DD` field; blank means no date
fn parse_due_date(raw: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| ApiError::validation("due_date", "Due date must be YYYY-MM-DD")),
    }
}

fn parse_checkbox(raw: &str) -> ApiResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Ok(true),
        "false" | "off" | "0" => Ok(false),
        _ => Err(ApiError::validation("completed", "Completed must be true or false")),
    }
}
