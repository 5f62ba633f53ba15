/// Password hashing module using bcrypt
///
/// bcrypt embeds a random 16-byte salt and the work factor in its output,
/// so a stored hash is self-describing and verification needs no extra state.
///
/// # Example
///
/// ```
/// use taskdeck_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("super_secret_password_123", 4)?;
///
/// assert!(verify_password("super_secret_password_123", &hash)?);
/// assert!(!verify_password("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

/// Work factor used when none is configured
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Lowest work factor bcrypt accepts
pub const MIN_COST: u32 = 4;

/// Highest work factor bcrypt accepts
pub const MAX_COST: u32 = 31;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password with bcrypt at the given work factor
///
/// # Returns
///
/// Modular-crypt string, e.g. `$2b$12$<22 char salt><31 char hash>`
///
/// # Errors
///
/// Returns `PasswordError::HashError` if the cost is out of range or hashing fails
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(PasswordError::HashError(format!(
            "Cost {} outside {}..={}",
            cost, MIN_COST, MAX_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))
}

/// Verifies a password against a stored bcrypt hash
///
/// # Returns
///
/// `Ok(true)` if password matches, `Ok(false)` if it doesn't match
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))
}
