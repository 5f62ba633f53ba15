/// Middleware modules for the API server
///
/// - `security`: hardening response headers
///
/// The session guard lives next to the router in `app`.

pub mod security;
