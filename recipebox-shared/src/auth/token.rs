/// Opaque API token utilities
///
/// Tokens are handed to a user once, by the token endpoint, and sent back on
/// every request as `Authorization: Token <key>`. Only the SHA-256 hash is
/// stored; see `models::auth_token` for the database side.
///
/// # Token Format
///
/// `rbx_` followed by 40 base62 characters (44 chars total).
///
/// # Example
///
/// ```
/// use recipebox_shared::auth::token::{generate_token, hash_token, validate_token_format};
///
/// let (token, hash) = generate_token();
/// assert!(token.starts_with("rbx_"));
/// assert!(validate_token_format(&token));
/// assert_eq!(hash, hash_token(&token));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of a token
const TOKEN_RANDOM_LENGTH: usize = 40;

/// Token prefix
const TOKEN_PREFIX: &str = "rbx_";

/// Total length of a token
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new token, returning `(plaintext, sha256_hex)`
pub fn generate_token() -> (String, String) {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let random_part: String = (0..TOKEN_RANDOM_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    let token = format!("{}{}", TOKEN_PREFIX, random_part);
    let hash = hash_token(&token);
    (token, hash)
}

/// Hex-encoded SHA-256 of the token
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Checks prefix, length and alphabet without touching the database
pub fn validate_token_format(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token
            .strip_prefix(TOKEN_PREFIX)
            .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_alphanumeric()))
}
