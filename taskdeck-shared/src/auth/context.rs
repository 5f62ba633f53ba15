/// Request-scoped authentication context
///
/// The session guard resolves the session cookie to a user and inserts a
/// [`SessionContext`] into the request extensions. Handlers behind the guard
/// take it with Axum's `Extension` extractor and pass `user_id` to every
/// task query; nothing about the caller is kept in global state.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskdeck_shared::auth::context::SessionContext;
///
/// async fn handler(Extension(session): Extension<SessionContext>) -> String {
///     format!("Hi, {} ({})", session.username, session.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Authenticated caller of the current request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Authenticated username
    pub username: String,
}

impl SessionContext {
    /// Creates context for a user loaded from the database
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}
