/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{Redirect, Response},
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use taskdeck_shared::{
    auth::{
        context::SessionContext,
        session::{extract_session_token, validate_session_token},
    },
    models::user::User,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, Level};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: SqlitePool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the secret used to sign session tokens
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health              # Health check (public)
/// ├── GET  /                    # Redirects to /tasks
/// ├── GET|POST /register        # Registration page / submit
/// ├── GET|POST /login           # Login page / submit
/// ├── GET  /logout              # Clears the session cookie
/// └── /tasks                    # Session required
///     ├── GET  /                # Dashboard (?filter=&q=&category=)
///     ├── POST /                # Create
///     ├── POST /:id             # Update
///     ├── POST /:id/toggle      # Flip completed
///     └── POST /:id/delete      # Delete
/// ```
///
/// # Middleware Stack
///
/// 1. Security headers
/// 2. Logging (tower-http TraceLayer)
/// 3. Session guard (task routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/", get(|| async { Redirect::to("/tasks") }))
        .route(
            "/register",
            get(routes::auth::register_page).post(routes::auth::register),
        )
        .route(
            "/login",
            get(routes::auth::login_page).post(routes::auth::login),
        )
        .route("/logout", get(routes::auth::logout));

    let task_routes = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/:id", post(routes::tasks::update_task))
        .route("/tasks/:id/toggle", post(routes::tasks::toggle_task))
        .route("/tasks/:id/delete", post(routes::tasks::delete_task))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let secure_cookies = state.config.session.secure_cookies;

    Router::new()
        .merge(public_routes)
        .merge(task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(secure_cookies))
        .with_state(state)
}

/// Resolves the session cookie in `headers` to the signed-in user
///
/// Returns `Ok(None)` when there is no cookie, the token does not verify,
/// or the user it names no longer exists.
pub async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> ApiResult<Option<SessionContext>> {
    let Some(token) = extract_session_token(headers) else {
        return Ok(None);
    };

    let claims = match validate_session_token(&token, state.session_secret()) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Rejected session cookie");
            return Ok(None);
        }
    };

    let Ok(user_id) = claims.user_id() else {
        return Ok(None);
    };

    let user = User::find_by_id(&state.db, user_id).await?;

    Ok(user.as_ref().map(SessionContext::from_user))
}

/// Session guard for the task routes
///
/// Resolves the session cookie and injects a [`SessionContext`] into request
/// extensions. Requests without a valid session are redirected to the login
/// page.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = resolve_session(&state, req.headers())
        .await?
        .ok_or(ApiError::LoginRequired)?;

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}
