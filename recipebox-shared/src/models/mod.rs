/// Database models for Recipebox
///
/// Every model exposes its SQL as associated async functions taking a
/// `&PgPool`; rows owned by a user are always queried with that user's id.
///
/// # Models
///
/// - `user`: Accounts (email + Argon2id password hash)
/// - `auth_token`: Hashed API tokens issued to users
/// - `attribute`: Shared behavior of per-user recipe attributes
/// - `tag`, `ingredient`: The two attribute kinds
/// - `recipe`: Recipes and their tag/ingredient links
///
/// # Example
///
/// ```no_run
/// use recipebox_shared::models::attribute;
/// use recipebox_shared::models::tag::Tag;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, user_id: i64) -> Result<(), sqlx::Error> {
/// let vegan = attribute::create::<Tag>(&pool, user_id, "Vegan").await?;
/// let tags = attribute::list_for_user::<Tag>(&pool, user_id, false).await?;
/// assert!(tags.iter().any(|t| t.id == vegan.id));
/// # Ok(())
/// # }
/// ```

pub mod attribute;
pub mod auth_token;
pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;
