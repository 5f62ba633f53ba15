/// Route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and logout
/// - `tasks`: Task dashboard and mutations (session required)

pub mod auth;
pub mod health;
pub mod tasks;
