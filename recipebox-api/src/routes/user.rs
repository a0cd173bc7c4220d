/// User endpoints
///
/// - `POST /api/user/create/` - Register a new user
/// - `POST /api/user/token/` - Exchange email + password for an auth token
/// - `GET /api/user/me/` - The caller's profile
/// - `PUT /api/user/me/` - Replace the caller's email, password and name
/// - `PATCH /api/user/me/` - Update any subset of those
///
/// Passwords are write-only: they are hashed with Argon2id on the way in and
/// never appear in a response.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    validation::{self, require_fields},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use recipebox_shared::{
    auth::{middleware::AuthContext, password},
    models::{
        auth_token::AuthToken,
        user::{CreateUser, UpdateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(custom(function = "validation::password"))]
    pub password: String,

    #[validate(
        custom(function = "validation::not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub name: String,
}

/// Profile update request; every field optional so PATCH can reuse it
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,

    #[validate(custom(function = "validation::password"))]
    pub password: Option<String>,

    #[validate(
        custom(function = "validation::not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub name: Option<String>,
}

/// Token request
///
/// Email and password are optional so a missing field reports the same
/// "required" error as a blank one.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/user/create/
/// Content-Type: application/json
///
/// { "email": "test@gmail.com", "password": "top4glory", "name": "Test name" }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "email": "test@gmail.com", "name": "Test name" }`
///
/// # Errors
///
/// - `400 Bad Request`: invalid email, short password, blank name, or the
///   email is already registered
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: req.name.trim().to_string(),
        },
    )
    .await?;

    info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Issue an auth token
///
/// Every successful call issues a fresh token; earlier ones stay valid.
///
/// # Endpoint
///
/// ```text
/// POST /api/user/token/
/// Content-Type: application/json
///
/// { "email": "test@gmail.com", "password": "top4glory" }
/// ```
///
/// # Response
///
/// ```json
/// { "token": "rbx_..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: a field is missing or blank, or the credentials do
///   not match an active user
pub async fn create_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();
    require_fields(&[
        ("email", !email.trim().is_empty()),
        ("password", !password.is_empty()),
    ])?;

    let invalid = || {
        ApiError::field(
            "non_field_errors",
            "Unable to authenticate with provided credentials.",
        )
    };

    let user = User::find_by_email(&state.db, &email)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(invalid)?;

    if !password::verify_password(&password, &user.password_hash)? {
        debug!(user_id = user.id, "Token request with wrong password");
        return Err(invalid());
    }

    User::update_last_login(&state.db, user.id).await?;
    let (token, plaintext) = AuthToken::create(&state.db, user.id).await?;

    info!(user_id = user.id, token_id = token.id, "Auth token issued");
    Ok(Json(TokenResponse { token: plaintext }))
}

/// Retrieve the caller's profile
pub async fn retrieve_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(UserResponse::from(user)))
}

/// Replace the caller's profile; email, password and name are all required
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    require_fields(&[
        ("email", req.email.is_some()),
        ("password", req.password.is_some()),
        ("name", req.name.is_some()),
    ])?;

    apply_update(&state, auth.user_id, req).await
}

/// Update any subset of the caller's email, password and name
pub async fn partial_update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    apply_update(&state, auth.user_id, req).await
}

async fn apply_update(
    state: &AppState,
    user_id: i64,
    req: UpdateUserRequest,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let password_hash = req
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let user = User::update(
        &state.db,
        user_id,
        UpdateUser {
            email: req.email,
            password_hash,
            name: req.name.map(|name| name.trim().to_string()),
        },
    )
    .await?
    .ok_or_else(ApiError::not_found)?;

    debug!(user_id, "User profile updated");
    Ok(Json(UserResponse::from(user)))
}
