/// Token authentication layer
///
/// Wraps [`recipebox_shared::auth::middleware::authenticate`] for use with
/// `axum::middleware::from_fn_with_state`. Failures become [`ApiError`]s, so
/// a rejected request gets a JSON 401 with `WWW-Authenticate: Token`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use recipebox_shared::auth::middleware::authenticate;

use crate::{app::AppState, error::ApiError};

/// Authenticates the request and injects `AuthContext` into its extensions
pub async fn token_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(&state.db, req.headers()).await?;

    tracing::debug!(user_id = auth_context.user_id, "Request authenticated");
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
