/// Request extractors
///
/// Wrappers around axum's extractors whose rejections are routed through
/// [`ApiError`], so malformed input gets the same JSON error shape as every
/// other client error instead of axum's plain-text default.
///
/// - [`ApiJson`]: body; rejection is 400
/// - [`ApiPath`]: path parameters; an id that does not parse is 404
/// - [`ApiQuery`]: query string; rejection is 400

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON body extractor that rejects with [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor that rejects with [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string extractor that rejects with [`ApiError`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
