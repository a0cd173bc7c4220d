/// Auth token model
///
/// A user may hold several tokens; each successful call to the token
/// endpoint issues a new one. Only the SHA-256 hash is persisted, so the
/// plaintext is returned exactly once, from [`AuthToken::create`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auth_tokens (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash CHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_used_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::token::{generate_token, hash_token};

/// Stored token record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthToken {
    pub id: i64,

    pub user_id: i64,

    /// SHA-256 hex of the plaintext token
    #[serde(skip_serializing)]
    pub token_hash: String,

    pub created_at: DateTime<Utc>,

    pub last_used_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    /// Issues a new token for a user
    ///
    /// Returns the stored record and the plaintext token.
    pub async fn create(pool: &PgPool, user_id: i64) -> Result<(Self, String), sqlx::Error> {
        let (plaintext, token_hash) = generate_token();

        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (user_id, token_hash)
            VALUES ($1, $2)
            RETURNING id, user_id, token_hash, created_at, last_used_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_one(pool)
        .await?;

        Ok((token, plaintext))
    }

    /// Resolves a plaintext token to its record
    ///
    /// Only tokens whose owner is active match. A match also stamps
    /// `last_used_at`.
    pub async fn authenticate(pool: &PgPool, plaintext: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, AuthToken>(
            r#"
            UPDATE auth_tokens t
            SET last_used_at = NOW()
            FROM users u
            WHERE t.token_hash = $1
              AND u.id = t.user_id
              AND u.is_active = TRUE
            RETURNING t.id, t.user_id, t.token_hash, t.created_at, t.last_used_at
            "#,
        )
        .bind(hash_token(plaintext))
        .fetch_optional(pool)
        .await
    }
}
