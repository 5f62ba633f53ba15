//! # TaskDeck API Server Library
//!
//! HTTP layer of TaskDeck: account pages, the session guard and the task
//! dashboard.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and session guard
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors that reject with `ApiError`
//! - `middleware`: Security headers
//! - `routes`: Route handlers
//! - `views`: View models returned to the presentation layer

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod views;
