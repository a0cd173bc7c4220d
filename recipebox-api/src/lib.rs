//! # Recipebox API Server Library
//!
//! HTTP layer of Recipebox: a per-user recipe, tag and ingredient API with
//! token authentication and image uploads.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors with JSON rejections
//! - `middleware`: Token authentication layer
//! - `routes`: API route handlers
//! - `validation`: Field validators for request payloads

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod validation;
