/// Signed session tokens and the session cookie
///
/// A session is a JWT signed with HS256 and carried in an `HttpOnly` cookie.
/// Nothing is stored server side: the signature is what makes the user ID in
/// the cookie trustworthy, and the `exp` claim bounds its lifetime. Logging
/// out clears the cookie.
///
/// # Claims
///
/// - `sub`: user ID (decimal string)
/// - `username`: display name for the signed-in header
/// - `iss`: always "taskdeck"
/// - `iat` / `nbf` / `exp`: Unix timestamps
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::session::{create_session_token, validate_session_token, SessionClaims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes-long";
/// let claims = SessionClaims::new(42, "alice", Duration::hours(24));
/// let token = create_session_token(&claims, secret)?;
///
/// let validated = validate_session_token(&token, secret)?;
/// assert_eq!(validated.user_id()?, 42);
/// assert_eq!(validated.username, "alice");
/// # Ok(())
/// # }
/// ```

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "taskdeck_session";

const ISSUER: &str = "taskdeck";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Signature, issuer or format check failed
    #[error("Invalid session token: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user ID
    pub sub: String,

    /// Username at the time of login
    pub username: String,

    /// Issuer - always "taskdeck"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl SessionClaims {
    /// Creates claims for `user_id` that expire after `ttl`
    pub fn new(user_id: i64, username: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            username: username.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Parses the subject back into a user ID
    pub fn user_id(&self) -> Result<i64, SessionError> {
        self.sub
            .parse()
            .map_err(|_| SessionError::Invalid(format!("Malformed subject: {}", self.sub)))
    }
}

/// Signs session claims into a token
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token and extracts its claims
///
/// Verifies the HS256 signature, expiry, not-before and issuer.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
            _ => SessionError::Invalid(e.to_string()),
        }
    })?;

    Ok(token_data.claims)
}

/// Builds the `Set-Cookie` value that stores a session token
pub fn session_cookie(
    token: &str,
    ttl: Duration,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Builds the `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    if secure {
        HeaderValue::from_static(
            "taskdeck_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Secure",
        )
    } else {
        HeaderValue::from_static("taskdeck_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

/// Pulls the session token out of the request's `Cookie` headers
///
/// Returns None when the cookie is absent or empty.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim().to_string())
        })
        .find(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_create_and_validate_token() {
        let claims = SessionClaims::new(7, "alice", Duration::hours(1));
        let token = create_session_token(&claims, SECRET).unwrap();

        let validated = validate_session_token(&token, SECRET).unwrap();
        assert_eq!(validated, claims);
        assert_eq!(validated.user_id().unwrap(), 7);
        assert_eq!(validated.iss, "taskdeck");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let claims = SessionClaims::new(7, "alice", Duration::hours(1));
        let token = create_session_token(&claims, SECRET).unwrap();

        let result = validate_session_token(&token, "another-secret-key-at-least-32-bytes");
        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let claims = SessionClaims::new(7, "alice", Duration::hours(-2));
        let token = create_session_token(&claims, SECRET).unwrap();

        let result = validate_session_token(&token, SECRET);
        assert!(matches!(result, Err(SessionError::Expired)));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let claims = SessionClaims::new(7, "alice", Duration::hours(1));
        let token = create_session_token(&claims, SECRET).unwrap();

        let forged_claims = SessionClaims::new(8, "mallory", Duration::hours(1));
        let forged = create_session_token(&forged_claims, SECRET).unwrap();

        // Splice the forged payload onto the original signature
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(validate_session_token(&spliced, SECRET).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(validate_session_token("not-a-token", SECRET).is_err());
    }

    #[test]
    fn test_malformed_subject() {
        let mut claims = SessionClaims::new(7, "alice", Duration::hours(1));
        claims.sub = "seven".to_string();
        assert!(claims.user_id().is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc.def.ghi", Duration::hours(1), false).unwrap();
        let cookie = cookie.to_str().unwrap();

        assert!(cookie.starts_with("taskdeck_session=abc.def.ghi;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));

        let secure = session_cookie("t", Duration::hours(1), true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_clear_session_cookie() {
        let cookie = clear_session_cookie(false);
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("taskdeck_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_session_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);

        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; taskdeck_session=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            extract_session_token(&headers),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_ignores_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("taskdeck_session="));
        assert_eq!(extract_session_token(&headers), None);
    }
}
