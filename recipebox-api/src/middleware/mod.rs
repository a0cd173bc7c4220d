/// Middleware for the API server
///
/// - `auth`: `Authorization: Token <key>` authentication for protected routes

pub mod auth;
