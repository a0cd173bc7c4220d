/// Per-user recipe attributes
///
/// Tags and ingredients are the same thing stored in two tables: a name
/// owned by a user and linked to recipes through a join table. The
/// [`RecipeAttribute`] trait names the tables; the generic functions in this
/// module hold the SQL once for both kinds.
///
/// Every query is scoped by `user_id`. A row owned by someone else is
/// indistinguishable from a row that does not exist.
///
/// # Example
///
/// ```no_run
/// use recipebox_shared::models::attribute;
/// use recipebox_shared::models::ingredient::Ingredient;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, user_id: i64) -> Result<(), sqlx::Error> {
/// let kale = attribute::create::<Ingredient>(&pool, user_id, "Kale").await?;
///
/// // Only ingredients used by at least one recipe
/// let used = attribute::list_for_user::<Ingredient>(&pool, user_id, true).await?;
/// assert!(used.iter().all(|i| i.id != kale.id));
/// # Ok(())
/// # }
/// ```

use std::collections::{HashMap, HashSet};

use sqlx::{postgres::PgRow, PgConnection, PgPool};
use tracing::debug;

/// A named, user-owned row that recipes link to
pub trait RecipeAttribute:
    for<'r> sqlx::FromRow<'r, PgRow> + Send + Sync + Unpin + 'static
{
    /// Table holding the attribute rows
    const TABLE: &'static str;

    /// Join table between recipes and this attribute
    const LINK_TABLE: &'static str;

    /// Column in [`Self::LINK_TABLE`] referencing [`Self::TABLE`]
    const LINK_COLUMN: &'static str;

    /// Singular name used in logs and error messages
    const KIND: &'static str;

    fn id(&self) -> i64;

    fn name(&self) -> &str;
}

const COLUMNS: &str = "a.id, a.user_id, a.name, a.created_at";

/// Lists a user's attributes ordered by name, descending
///
/// With `assigned_only`, only attributes linked to at least one recipe are
/// returned, each once.
pub async fn list_for_user<T: RecipeAttribute>(
    pool: &PgPool,
    user_id: i64,
    assigned_only: bool,
) -> Result<Vec<T>, sqlx::Error> {
    let assigned_clause = if assigned_only {
        format!(
            "AND EXISTS (SELECT 1 FROM {link} l WHERE l.{col} = a.id)",
            link = T::LINK_TABLE,
            col = T::LINK_COLUMN
        )
    } else {
        String::new()
    };

    let query = format!(
        "SELECT {COLUMNS} FROM {table} a
         WHERE a.user_id = $1 {assigned_clause}
         ORDER BY a.name DESC, a.id DESC",
        table = T::TABLE,
    );

    sqlx::query_as::<_, T>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn create<T: RecipeAttribute>(
    pool: &PgPool,
    user_id: i64,
    name: &str,
) -> Result<T, sqlx::Error> {
    let query = format!(
        "INSERT INTO {table} AS a (user_id, name) VALUES ($1, $2) RETURNING {COLUMNS}",
        table = T::TABLE,
    );

    let created = sqlx::query_as::<_, T>(&query)
        .bind(user_id)
        .bind(name)
        .fetch_one(pool)
        .await?;

    debug!(kind = T::KIND, id = created.id(), user_id, "Attribute created");
    Ok(created)
}

pub async fn find_for_user<T: RecipeAttribute>(
    pool: &PgPool,
    user_id: i64,
    id: i64,
) -> Result<Option<T>, sqlx::Error> {
    let query = format!(
        "SELECT {COLUMNS} FROM {table} a WHERE a.id = $1 AND a.user_id = $2",
        table = T::TABLE,
    );

    sqlx::query_as::<_, T>(&query)
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Renames an attribute; `None` if it does not exist for this user
pub async fn rename<T: RecipeAttribute>(
    pool: &PgPool,
    user_id: i64,
    id: i64,
    name: &str,
) -> Result<Option<T>, sqlx::Error> {
    let query = format!(
        "UPDATE {table} AS a SET name = $3 WHERE a.id = $1 AND a.user_id = $2 RETURNING {COLUMNS}",
        table = T::TABLE,
    );

    sqlx::query_as::<_, T>(&query)
        .bind(id)
        .bind(user_id)
        .bind(name)
        .fetch_optional(pool)
        .await
}

/// Deletes an attribute; recipe links go with it
pub async fn delete_for_user<T: RecipeAttribute>(
    pool: &PgPool,
    user_id: i64,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let query = format!(
        "DELETE FROM {table} WHERE id = $1 AND user_id = $2",
        table = T::TABLE
    );

    let result = sqlx::query(&query)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns the ids in `ids` that do not name an attribute owned by `user_id`
///
/// Order follows `ids`; duplicates are reported once.
pub async fn missing_ids<T: RecipeAttribute>(
    pool: &PgPool,
    user_id: i64,
    ids: &[i64],
) -> Result<Vec<i64>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "SELECT id FROM {table} WHERE user_id = $1 AND id = ANY($2)",
        table = T::TABLE
    );

    let owned: HashSet<i64> = sqlx::query_scalar::<_, i64>(&query)
        .bind(user_id)
        .bind(ids)
        .fetch_all(pool)
        .await?
        .into_iter()
        .collect();

    let mut seen = HashSet::new();
    Ok(ids
        .iter()
        .copied()
        .filter(|id| !owned.contains(id) && seen.insert(*id))
        .collect())
}

/// Attributes linked to one recipe, ordered by id
pub async fn for_recipe<T: RecipeAttribute>(
    pool: &PgPool,
    recipe_id: i64,
) -> Result<Vec<T>, sqlx::Error> {
    let query = format!(
        "SELECT {COLUMNS} FROM {table} a
         JOIN {link} l ON l.{col} = a.id
         WHERE l.recipe_id = $1
         ORDER BY a.id",
        table = T::TABLE,
        link = T::LINK_TABLE,
        col = T::LINK_COLUMN,
    );

    sqlx::query_as::<_, T>(&query)
        .bind(recipe_id)
        .fetch_all(pool)
        .await
}

/// Linked attribute ids for many recipes at once, keyed by recipe id
///
/// Recipes without links are absent from the map.
pub async fn ids_for_recipes<T: RecipeAttribute>(
    pool: &PgPool,
    recipe_ids: &[i64],
) -> Result<HashMap<i64, Vec<i64>>, sqlx::Error> {
    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let query = format!(
        "SELECT recipe_id, {col} FROM {link} WHERE recipe_id = ANY($1) ORDER BY recipe_id, {col}",
        link = T::LINK_TABLE,
        col = T::LINK_COLUMN,
    );

    let rows: Vec<(i64, i64)> = sqlx::query_as(&query)
        .bind(recipe_ids)
        .fetch_all(pool)
        .await?;

    let mut links: HashMap<i64, Vec<i64>> = HashMap::new();
    for (recipe_id, attribute_id) in rows {
        links.entry(recipe_id).or_default().push(attribute_id);
    }
    Ok(links)
}

/// Replaces a recipe's links to this attribute kind
///
/// Takes a connection so it can run inside the caller's transaction.
pub async fn set_links<T: RecipeAttribute>(
    conn: &mut PgConnection,
    recipe_id: i64,
    ids: &[i64],
) -> Result<(), sqlx::Error> {
    let delete = format!("DELETE FROM {link} WHERE recipe_id = $1", link = T::LINK_TABLE);
    sqlx::query(&delete).bind(recipe_id).execute(&mut *conn).await?;

    if ids.is_empty() {
        return Ok(());
    }

    let insert = format!(
        "INSERT INTO {link} (recipe_id, {col})
         SELECT $1, UNNEST($2::BIGINT[])
         ON CONFLICT DO NOTHING",
        link = T::LINK_TABLE,
        col = T::LINK_COLUMN,
    );
    sqlx::query(&insert)
        .bind(recipe_id)
        .bind(ids)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
