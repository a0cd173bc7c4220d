/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `user`: Registration, token issue and the caller's profile
/// - `attributes`: Tags and ingredients, generic over the attribute type
/// - `recipes`: Recipe CRUD, filtering and image upload

pub mod attributes;
pub mod health;
pub mod recipes;
pub mod user;
