/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and length validation
/// - [`token`]: Opaque API token generation and hashing
/// - [`middleware`]: `Authorization: Token <key>` request authentication
///
/// # Example
///
/// ```
/// use recipebox_shared::auth::password::{hash_password, verify_password};
/// use recipebox_shared::auth::token::{generate_token, hash_token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("top4glory")?;
/// assert!(verify_password("top4glory", &hash)?);
///
/// let (token, token_hash) = generate_token();
/// assert_eq!(hash_token(&token), token_hash);
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod password;
pub mod token;
