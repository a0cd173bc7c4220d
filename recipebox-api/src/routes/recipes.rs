/// Recipe endpoints
///
/// - `GET /api/recipe/recipes/` - List the caller's recipes, newest first
/// - `POST /api/recipe/recipes/` - Create
/// - `GET /api/recipe/recipes/:id/` - Detail with nested tags/ingredients
/// - `PUT /api/recipe/recipes/:id/` - Full update
/// - `PATCH /api/recipe/recipes/:id/` - Partial update
/// - `DELETE /api/recipe/recipes/:id/` - Delete
/// - `POST /api/recipe/recipes/:id/upload-image/` - Attach an image
///
/// # Filtering
///
/// `?tags=1,2&ingredients=3` keeps recipes that have at least one of the
/// listed tags and at least one of the listed ingredients.
///
/// # Shapes
///
/// List, create and update responses carry tag and ingredient ids:
///
/// ```json
/// { "id": 1, "title": "Thai prawn curry", "ingredients": [4, 5], "tags": [1],
///   "time_minutes": 20, "price": "7.00", "link": "" }
/// ```
///
/// The detail response nests `{id, name}` objects instead and adds the image
/// URL.

use std::collections::HashMap;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::attributes::AttributeResponse,
    validation::{self, require_fields},
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use recipebox_shared::{
    auth::middleware::AuthContext,
    filters::recipe_filter,
    models::{
        attribute::{self, RecipeAttribute},
        ingredient::Ingredient,
        recipe::{CreateRecipe, Recipe, RecipeLinks, UpdateRecipe},
        tag::Tag,
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use validator::Validate;

/// Multipart field carrying the upload
const IMAGE_FIELD: &str = "image";

/// Recipe write payload
///
/// Every field is optional at the type level; create and PUT enforce the
/// required ones with [`require_fields`].
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RecipeRequest {
    #[validate(
        custom(function = "validation::not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub title: Option<String>,

    #[validate(range(min = 0, message = "Ensure this value is greater than or equal to 0."))]
    pub time_minutes: Option<i32>,

    #[validate(custom(function = "validation::price"))]
    pub price: Option<Decimal>,

    #[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
    pub link: Option<String>,

    pub tags: Option<Vec<i64>>,

    pub ingredients: Option<Vec<i64>>,
}

impl RecipeRequest {
    fn require_core_fields(&self) -> ApiResult<()> {
        require_fields(&[
            ("title", self.title.is_some()),
            ("time_minutes", self.time_minutes.is_some()),
            ("price", self.price.is_some()),
        ])
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeListParams {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

/// List / create / update shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<i64>,
    pub tags: Vec<i64>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,
}

impl RecipeResponse {
    fn new(recipe: Recipe, links: RecipeLinks) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            ingredients: links.ingredient_ids,
            tags: links.tag_ids,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
        }
    }
}

/// Detail shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetailResponse {
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<AttributeResponse>,
    pub tags: Vec<AttributeResponse>,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: String,

    /// Public URL of the image, if one was uploaded
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeImageResponse {
    pub id: i64,
    pub image: String,
}

/// Rejects ids that are not the caller's attributes of type `T`
async fn check_owned<T: RecipeAttribute>(
    state: &AppState,
    user_id: i64,
    field: &str,
    ids: Option<&[i64]>,
) -> ApiResult<()> {
    let Some(ids) = ids else {
        return Ok(());
    };

    let missing = attribute::missing_ids::<T>(&state.db, user_id, ids).await?;
    if missing.is_empty() {
        return Ok(());
    }

    Err(ApiError::ValidationError(
        missing
            .into_iter()
            .map(|id| ValidationErrorDetail {
                field: field.to_string(),
                message: format!("Invalid pk \"{}\" - object does not exist.", id),
            })
            .collect(),
    ))
}

/// Validates a payload and its tag/ingredient ids
async fn validate_request(state: &AppState, user_id: i64, req: &RecipeRequest) -> ApiResult<()> {
    req.validate()?;
    check_owned::<Tag>(state, user_id, "tags", req.tags.as_deref()).await?;
    check_owned::<Ingredient>(state, user_id, "ingredients", req.ingredients.as_deref()).await?;
    Ok(())
}

/// Reloads link ids after a write so the response reflects stored state
async fn with_links(state: &AppState, recipe: Recipe) -> ApiResult<RecipeResponse> {
    let mut links = Recipe::links_for(&state.db, &[recipe.id]).await?;
    let recipe_links = links.remove(&recipe.id).unwrap_or_default();
    Ok(RecipeResponse::new(recipe, recipe_links))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(params): ApiQuery<RecipeListParams>,
) -> ApiResult<Json<Vec<RecipeResponse>>> {
    let filter = recipe_filter(params.tags.as_deref(), params.ingredients.as_deref())?;

    let recipes = Recipe::list_for_user(&state.db, auth.user_id, &filter).await?;
    let ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
    let mut links: HashMap<i64, RecipeLinks> = Recipe::links_for(&state.db, &ids).await?;

    let body = recipes
        .into_iter()
        .map(|recipe| {
            let recipe_links = links.remove(&recipe.id).unwrap_or_default();
            RecipeResponse::new(recipe, recipe_links)
        })
        .collect();

    Ok(Json(body))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<RecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeResponse>)> {
    req.require_core_fields()?;
    validate_request(&state, auth.user_id, &req).await?;

    let recipe = Recipe::create(
        &state.db,
        CreateRecipe {
            user_id: auth.user_id,
            title: req.title.unwrap_or_default().trim().to_string(),
            time_minutes: req.time_minutes.unwrap_or_default(),
            price: req.price.unwrap_or_default(),
            link: req.link.unwrap_or_default(),
            tag_ids: req.tags.unwrap_or_default(),
            ingredient_ids: req.ingredients.unwrap_or_default(),
        },
    )
    .await?;

    info!(recipe_id = recipe.id, user_id = auth.user_id, "Recipe created");
    Ok((StatusCode::CREATED, Json(with_links(&state, recipe).await?)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<RecipeDetailResponse>> {
    let recipe = Recipe::find_for_user(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    let tags = recipe.tags(&state.db).await?;
    let ingredients = recipe.ingredients(&state.db).await?;

    Ok(Json(RecipeDetailResponse {
        id: recipe.id,
        title: recipe.title,
        ingredients: ingredients.iter().map(AttributeResponse::from_attribute).collect(),
        tags: tags.iter().map(AttributeResponse::from_attribute).collect(),
        time_minutes: recipe.time_minutes,
        price: recipe.price,
        link: recipe.link,
        image: recipe.image.as_deref().map(|path| state.media.url(path)),
    }))
}

/// PUT: title, time_minutes and price are required; an omitted link, tag
/// list or ingredient list is cleared
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<RecipeRequest>,
) -> ApiResult<Json<RecipeResponse>> {
    req.require_core_fields()?;
    validate_request(&state, auth.user_id, &req).await?;

    let data = UpdateRecipe {
        title: req.title.map(|title| title.trim().to_string()),
        time_minutes: req.time_minutes,
        price: req.price,
        link: Some(req.link.unwrap_or_default()),
        tag_ids: Some(req.tags.unwrap_or_default()),
        ingredient_ids: Some(req.ingredients.unwrap_or_default()),
    };

    save_update(&state, auth.user_id, id, data).await
}

/// PATCH: only the fields present change
pub async fn partial_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<RecipeRequest>,
) -> ApiResult<Json<RecipeResponse>> {
    validate_request(&state, auth.user_id, &req).await?;

    let data = UpdateRecipe {
        title: req.title.map(|title| title.trim().to_string()),
        time_minutes: req.time_minutes,
        price: req.price,
        link: req.link,
        tag_ids: req.tags,
        ingredient_ids: req.ingredients,
    };

    save_update(&state, auth.user_id, id, data).await
}

async fn save_update(
    state: &AppState,
    user_id: i64,
    id: i64,
    data: UpdateRecipe,
) -> ApiResult<Json<RecipeResponse>> {
    let recipe = Recipe::update(&state.db, user_id, id, data)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(with_links(state, recipe).await?))
}

pub async fn destroy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let recipe = Recipe::find_for_user(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    if !Recipe::delete_for_user(&state.db, auth.user_id, id).await? {
        return Err(ApiError::not_found());
    }

    if let Some(image) = recipe.image.as_deref() {
        remove_image(&state, image).await;
    }

    info!(recipe_id = id, user_id = auth.user_id, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Upload an image for a recipe
///
/// # Endpoint
///
/// ```text
/// POST /api/recipe/recipes/:id/upload-image/
/// Content-Type: multipart/form-data; boundary=...
///
/// image=<file>
/// ```
///
/// # Response
///
/// ```json
/// { "id": 1, "image": "/media/uploads/recipe/5c3e...9a.png" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: no `image` field, or it is not a decodable image
/// - `404 Not Found`: the recipe is not the caller's
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<RecipeImageResponse>> {
    let recipe = Recipe::find_for_user(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            upload = Some(field.bytes().await?);
            break;
        }
    }

    let data = upload
        .filter(|data| !data.is_empty())
        .ok_or_else(|| ApiError::field(IMAGE_FIELD, "No file was submitted."))?;

    let stored = state.media.save_recipe_image(data.to_vec()).await?;

    let Some(updated) = Recipe::set_image(&state.db, auth.user_id, id, &stored).await? else {
        remove_image(&state, &stored).await;
        return Err(ApiError::not_found());
    };

    if let Some(previous) = recipe.image.as_deref() {
        remove_image(&state, previous).await;
    }

    info!(recipe_id = id, path = %stored, "Recipe image uploaded");
    Ok(Json(RecipeImageResponse {
        id: updated.id,
        image: state.media.url(&stored),
    }))
}

/// Best-effort removal of a stored file; failures are only logged
async fn remove_image(state: &AppState, path: &str) {
    match state.media.remove(path).await {
        Ok(()) => debug!(path, "Recipe image removed"),
        Err(e) => warn!(path, error = %e, "Failed to remove recipe image"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_recipe_request_deserializes_price_as_string_or_number() {
        let req: RecipeRequest =
            serde_json::from_str(r#"{"title": "Cheesecake", "time_minutes": 30, "price": 5.5}"#)
                .unwrap();
        assert_eq!(req.price, Some(Decimal::from_str("5.5").unwrap()));

        let req: RecipeRequest = serde_json::from_str(r#"{"price": "5.00"}"#).unwrap();
        assert_eq!(req.price, Some(Decimal::from_str("5.00").unwrap()));
    }

    #[test]
    fn test_recipe_request_validation() {
        let req = RecipeRequest {
            title: Some("Cheesecake".to_string()),
            time_minutes: Some(-1),
            price: Some(Decimal::from_str("5.001").unwrap()),
            ..Default::default()
        };

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("time_minutes"));
        assert!(fields.contains_key("price"));
        assert!(!fields.contains_key("title"));
    }

    #[test]
    fn test_require_core_fields() {
        assert!(RecipeRequest::default().require_core_fields().is_err());

        let req = RecipeRequest {
            title: Some("Soup".to_string()),
            time_minutes: Some(10),
            price: Some(Decimal::new(500, 2)),
            ..Default::default()
        };
        assert!(req.require_core_fields().is_ok());
    }

    #[test]
    fn test_recipe_response_serializes_price_as_string() {
        let response = RecipeResponse {
            id: 1,
            title: "Soup".to_string(),
            ingredients: vec![2],
            tags: vec![],
            time_minutes: 10,
            price: Decimal::new(500, 2),
            link: String::new(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["price"], "5.00");
        assert_eq!(json["ingredients"], serde_json::json!([2]));
    }
}
