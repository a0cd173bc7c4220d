/// Token authentication for Axum
///
/// Clients authenticate with `Authorization: Token <key>`. The API's
/// middleware layer calls [`authenticate`] and inserts the resulting
/// [`AuthContext`] into the request extensions, which handlers pick up with
/// `Extension<AuthContext>`.
///
/// # Example
///
/// ```no_run
/// use axum::http::HeaderMap;
/// use recipebox_shared::auth::middleware::authenticate;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, headers: HeaderMap) {
/// match authenticate(&pool, &headers).await {
///     Ok(auth) => println!("user {}", auth.user_id),
///     Err(e) => println!("rejected: {:?}", e),
/// }
/// # }
/// ```

use axum::http::{header, HeaderMap};
use sqlx::PgPool;

use super::token::validate_token_format;
use crate::models::auth_token::AuthToken;

/// Authorization scheme keyword
pub const TOKEN_SCHEME: &str = "Token";

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,

    /// Token used for this request
    pub token_id: i64,
}

impl From<&AuthToken> for AuthContext {
    fn from(token: &AuthToken) -> Self {
        Self {
            user_id: token.user_id,
            token_id: token.id,
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    /// No Authorization header
    MissingCredentials,

    /// Header present but not `Token <key>`
    InvalidFormat(String),

    /// Unknown token, or its user is inactive
    InvalidToken(String),

    DatabaseError(String),
}

/// Pulls the key out of an `Authorization: Token <key>` header
///
/// The scheme keyword is matched case-insensitively.
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| {
            AuthError::InvalidFormat(
                "Invalid token header. Token string should not contain invalid characters."
                    .to_string(),
            )
        })?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(key), None) if scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => Ok(key),
        (Some(scheme), None, None) if scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => Err(
            AuthError::InvalidFormat("Invalid token header. No credentials provided.".to_string()),
        ),
        (Some(scheme), Some(_), Some(_)) if scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => {
            Err(AuthError::InvalidFormat(
                "Invalid token header. Token string should not contain spaces.".to_string(),
            ))
        }
        _ => Err(AuthError::MissingCredentials),
    }
}

/// Resolves request headers to the authenticated caller
pub async fn authenticate(pool: &PgPool, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
    let key = extract_token(headers)?;

    if !validate_token_format(key) {
        return Err(AuthError::InvalidToken("Invalid token.".to_string()));
    }

    let token = AuthToken::authenticate(pool, key)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Database error: {}", e)))?
        .ok_or_else(|| AuthError::InvalidToken("Invalid token.".to_string()))?;

    Ok(AuthContext::from(&token))
}
