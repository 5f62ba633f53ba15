/// Authentication utilities
///
/// This module provides the authentication primitives for TaskDeck:
///
/// # Modules
///
/// - [`password`]: bcrypt password hashing and verification
/// - [`session`]: signed session tokens and the session cookie
/// - [`context`]: the request-scoped [`context::SessionContext`]
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::password::{hash_password, verify_password};
/// use taskdeck_shared::auth::session::{create_session_token, validate_session_token, SessionClaims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("pw1", 4)?;
/// assert!(verify_password("pw1", &hash)?);
///
/// let secret = "a-session-secret-of-at-least-32-bytes!";
/// let claims = SessionClaims::new(1, "alice", chrono::Duration::hours(1));
/// let token = create_session_token(&claims, secret)?;
/// assert_eq!(validate_session_token(&token, secret)?.user_id()?, 1);
/// # Ok(())
/// # }
/// ```

pub mod context;
pub mod password;
pub mod session;
