/// Recipe model and database operations
///
/// A recipe belongs to one user and links to any number of that user's tags
/// and ingredients. Link rows live in `recipe_tags` / `recipe_ingredients`
/// and are written in the same transaction as the recipe itself.
///
/// The database does not check that linked tags and ingredients share the
/// recipe's owner. Callers verify ids with
/// [`attribute::missing_ids`](super::attribute::missing_ids) before writing.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipes (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     time_minutes INTEGER NOT NULL,
///     price NUMERIC(5, 2) NOT NULL,
///     link VARCHAR(255) NOT NULL DEFAULT '',
///     image VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use recipebox_shared::models::recipe::{CreateRecipe, Recipe, RecipeFilter};
/// use rust_decimal::Decimal;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, user_id: i64, vegan_tag: i64) -> Result<(), sqlx::Error> {
/// let recipe = Recipe::create(
///     &pool,
///     CreateRecipe {
///         user_id,
///         title: "Avocado Lime Cheesecake".to_string(),
///         time_minutes: 60,
///         price: Decimal::new(2000, 2),
///         link: String::new(),
///         tag_ids: vec![vegan_tag],
///         ingredient_ids: vec![],
///     },
/// )
/// .await?;
///
/// let vegan = Recipe::list_for_user(
///     &pool,
///     user_id,
///     &RecipeFilter {
///         tag_ids: Some(vec![vegan_tag]),
///         ..Default::default()
///     },
/// )
/// .await?;
/// assert_eq!(vegan[0].id, recipe.id);
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;

use super::{attribute, ingredient::Ingredient, tag::Tag};

const RECIPE_COLUMNS: &str = "id, user_id, title, time_minutes, price, link, image, \
                              created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: i64,

    pub user_id: i64,

    pub title: String,

    /// Preparation time in minutes
    pub time_minutes: i32,

    /// Price with two decimal places
    pub price: Decimal,

    /// Optional external link; empty when unset
    pub link: String,

    /// Media-relative path of the uploaded image
    pub image: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a recipe
#[derive(Debug, Clone)]
pub struct CreateRecipe {
    pub user_id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
    pub tag_ids: Vec<i64>,
    pub ingredient_ids: Vec<i64>,
}

/// Partial update; `Some` link lists replace the existing links
#[derive(Debug, Clone, Default)]
pub struct UpdateRecipe {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tag_ids: Option<Vec<i64>>,
    pub ingredient_ids: Option<Vec<i64>>,
}

/// List filter
///
/// A recipe matches when it links to at least one of `tag_ids` and at least
/// one of `ingredient_ids`. `None` disables that half of the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tag_ids: Option<Vec<i64>>,
    pub ingredient_ids: Option<Vec<i64>>,
}

/// Linked attribute ids of one recipe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeLinks {
    pub tag_ids: Vec<i64>,
    pub ingredient_ids: Vec<i64>,
}

impl Recipe {
    /// Inserts a recipe and its links in one transaction
    pub async fn create(pool: &PgPool, data: CreateRecipe) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO recipes (user_id, title, time_minutes, price, link)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            RECIPE_COLUMNS
        );

        let recipe = sqlx::query_as::<_, Recipe>(&query)
            .bind(data.user_id)
            .bind(data.title)
            .bind(data.time_minutes)
            .bind(data.price)
            .bind(data.link)
            .fetch_one(&mut *tx)
            .await?;

        attribute::set_links::<Tag>(&mut *tx, recipe.id, &data.tag_ids).await?;
        attribute::set_links::<Ingredient>(&mut *tx, recipe.id, &data.ingredient_ids).await?;

        tx.commit().await?;

        debug!(recipe_id = recipe.id, user_id = recipe.user_id, "Recipe created");
        Ok(recipe)
    }

    pub async fn find_for_user(
        pool: &PgPool,
        user_id: i64,
        id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM recipes WHERE id = $1 AND user_id = $2",
            RECIPE_COLUMNS
        );

        sqlx::query_as::<_, Recipe>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists a user's recipes, newest id first, applying `filter`
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: i64,
        filter: &RecipeFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM recipes r
             WHERE r.user_id = $1
               AND ($2::BIGINT[] IS NULL OR EXISTS (
                    SELECT 1 FROM recipe_tags rt
                    WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)))
               AND ($3::BIGINT[] IS NULL OR EXISTS (
                    SELECT 1 FROM recipe_ingredients ri
                    WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)))
             ORDER BY r.id DESC",
            RECIPE_COLUMNS
        );

        sqlx::query_as::<_, Recipe>(&query)
            .bind(user_id)
            .bind(filter.tag_ids.as_deref())
            .bind(filter.ingredient_ids.as_deref())
            .fetch_all(pool)
            .await
    }

    /// Applies a partial update in one transaction
    ///
    /// Returns `None`, with nothing written, if the recipe does not exist for
    /// this user.
    pub async fn update(
        pool: &PgPool,
        user_id: i64,
        id: i64,
        data: UpdateRecipe,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE recipes
             SET title = COALESCE($3, title),
                 time_minutes = COALESCE($4, time_minutes),
                 price = COALESCE($5, price),
                 link = COALESCE($6, link),
                 updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            RECIPE_COLUMNS
        );

        let Some(recipe) = sqlx::query_as::<_, Recipe>(&query)
            .bind(id)
            .bind(user_id)
            .bind(data.title)
            .bind(data.time_minutes)
            .bind(data.price)
            .bind(data.link)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(tag_ids) = &data.tag_ids {
            attribute::set_links::<Tag>(&mut *tx, recipe.id, tag_ids).await?;
        }
        if let Some(ingredient_ids) = &data.ingredient_ids {
            attribute::set_links::<Ingredient>(&mut *tx, recipe.id, ingredient_ids).await?;
        }

        tx.commit().await?;

        debug!(recipe_id = recipe.id, user_id, "Recipe updated");
        Ok(Some(recipe))
    }

    pub async fn delete_for_user(pool: &PgPool, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Points the recipe at a newly stored image
    pub async fn set_image(
        pool: &PgPool,
        user_id: i64,
        id: i64,
        image: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE recipes SET image = $3, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            RECIPE_COLUMNS
        );

        sqlx::query_as::<_, Recipe>(&query)
            .bind(id)
            .bind(user_id)
            .bind(image)
            .fetch_optional(pool)
            .await
    }

    /// Tag and ingredient ids for each of `recipe_ids`
    ///
    /// Every requested id has an entry, empty if it has no links.
    pub async fn links_for(
        pool: &PgPool,
        recipe_ids: &[i64],
    ) -> Result<HashMap<i64, RecipeLinks>, sqlx::Error> {
        let mut tags = attribute::ids_for_recipes::<Tag>(pool, recipe_ids).await?;
        let mut ingredients = attribute::ids_for_recipes::<Ingredient>(pool, recipe_ids).await?;

        Ok(recipe_ids
            .iter()
            .map(|id| {
                let links = RecipeLinks {
                    tag_ids: tags.remove(id).unwrap_or_default(),
                    ingredient_ids: ingredients.remove(id).unwrap_or_default(),
                };
                (*id, links)
            })
            .collect())
    }

    pub async fn tags(&self, pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
        attribute::for_recipe::<Tag>(pool, self.id).await
    }

    pub async fn ingredients(&self, pool: &PgPool) -> Result<Vec<Ingredient>, sqlx::Error> {
        attribute::for_recipe::<Ingredient>(pool, self.id).await
    }
}
