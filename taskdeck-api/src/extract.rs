//! Request extractors
//!
//! Drop-in wrappers around axum's `Path`, `Query` and `Form` whose
//! rejections become [`ApiError::BadRequest`], so a malformed task ID or
//! query string gets the same JSON error envelope as every other failure.

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// Path parameters, rejected as `400 Bad Request`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

/// Query string, rejected as `400 Bad Request`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

/// Urlencoded form body, rejected as `400 Bad Request`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(ApiError))]
pub struct Form<T>(pub T);
