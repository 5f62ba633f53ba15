/// Authentication endpoints
///
/// This module provides the account pages:
/// - Registration
/// - Login (issues the session cookie)
/// - Logout (clears it)
///
/// # Endpoints
///
/// - `GET  /register` - Registration page
/// - `POST /register` - Create an account, then redirect to `/login`
/// - `GET  /login` - Login page
/// - `POST /login` - Sign in, then redirect to `/tasks`
/// - `GET  /logout` - Sign out, then redirect to `/login`
///
/// Usernames are compared case-insensitively: they are trimmed and
/// lower-cased before they are stored or looked up.

use crate::{
    app::{resolve_session, AppState},
    error::{ApiError, ApiResult, LOGIN_PATH},
    extract::Form,
    views::AuthPageView,
};
use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use taskdeck_shared::{
    auth::{
        password,
        session::{clear_session_cookie, create_session_token, session_cookie, SessionClaims},
    },
    models::user::{normalize_username, CreateUser, User},
};
use tracing::{info, warn};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Submitted login or registration form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

/// Credentials after normalization
#[derive(Debug, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Credentials {
    /// Normalizes and validates a submitted form
    pub fn parse(form: CredentialsForm) -> ApiResult<Self> {
        let credentials = Self {
            username: normalize_username(&form.username),
            password: form.password,
        };
        credentials.validate()?;
        Ok(credentials)
    }
}

/// Registration page
pub async fn register_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AuthPageView>> {
    let session = resolve_session(&state, &headers).await?;
    Ok(Json(AuthPageView::new(
        "/register",
        session.map(|s| s.username),
    )))
}

/// Register a new user
///
/// # Errors
///
/// - `422 Unprocessable Entity`: empty username or password, or username taken
/// - `500 Internal Server Error`: hashing or database failure
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<Redirect> {
    let credentials = Credentials::parse(form)?;

    if User::find_by_username(&state.db, &credentials.username)
        .await?
        .is_some()
    {
        return Err(username_taken());
    }

    let password_hash =
        password::hash_password(&credentials.password, state.config.password.bcrypt_cost)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: credentials.username,
            password_hash,
        },
    )
    .await
    .map_err(|e| match e {
        // Lost a race with a concurrent registration of the same name
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => username_taken(),
        other => ApiError::from(other),
    })?;

    info!(user_id = user.id, username = %user.username, "User registered");

    Ok(Redirect::to(LOGIN_PATH))
}

/// Login page
pub async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AuthPageView>> {
    let session = resolve_session(&state, &headers).await?;
    Ok(Json(AuthPageView::new(LOGIN_PATH, session.map(|s| s.username))))
}

/// Sign in and set the session cookie
///
/// # Errors
///
/// - `422 Unprocessable Entity`: empty username or password
/// - `401 Unauthorized`: unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<impl IntoResponse> {
    let credentials = Credentials::parse(form)?;

    let Some(user) = User::find_by_username(&state.db, &credentials.username).await? else {
        warn!(username = %credentials.username, "Login failed: unknown user");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !password::verify_password(&credentials.password, &user.password_hash)? {
        warn!(user_id = user.id, "Login failed: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let ttl = state.config.session_ttl();
    let claims = SessionClaims::new(user.id, user.username.as_str(), ttl);
    let token = create_session_token(&claims, state.session_secret())?;
    let cookie = session_cookie(&token, ttl, state.config.session.secure_cookies)
        .map_err(|e| ApiError::InternalError(format!("Invalid session cookie: {}", e)))?;

    info!(user_id = user.id, "User logged in");

    Ok(([(SET_COOKIE, cookie)], Redirect::to("/tasks")))
}

/// Sign out by clearing the session cookie
///
/// Works with or without an active session.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    info!("User logged out");

    (
        [(SET_COOKIE, clear_session_cookie(state.config.session.secure_cookies))],
        Redirect::to(LOGIN_PATH),
    )
}

fn username_taken() -> ApiError {
    ApiError::validation("username", "Username already taken")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str) -> CredentialsForm {
        CredentialsForm {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_credentials_are_normalized() {
        let credentials = Credentials::parse(form("  Alice ", "pw1")).unwrap();
        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.password, "pw1");
    }

    #[test]
    fn test_password_is_not_trimmed() {
        let credentials = Credentials::parse(form("alice", " pw ")).unwrap();
        assert_eq!(credentials.password, " pw ");
    }

    #[test]
    fn test_blank_username_is_rejected() {
        let err = Credentials::parse(form("   ", "pw1")).unwrap_err();
        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(details[0].field, "username");
                assert_eq!(details[0].message, "Username must be 1 to 64 characters");
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_password_is_rejected() {
        assert!(matches!(
            Credentials::parse(form("alice", "")),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_long_username_is_rejected() {
        let long = "a".repeat(65);
        assert!(Credentials::parse(form(&long, "pw1")).is_err());
        assert!(Credentials::parse(form(&"a".repeat(64), "pw1")).is_ok());
    }
}
