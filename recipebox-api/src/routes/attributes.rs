/// Tag and ingredient endpoints
///
/// Both resources behave identically, so the handlers are generic over
/// [`RecipeAttribute`] and the router instantiates them once per type:
///
/// - `GET /api/recipe/{tags,ingredients}/` - List, name descending;
///   `?assigned_only=1` keeps only those used by a recipe
/// - `POST /api/recipe/{tags,ingredients}/` - Create
/// - `PUT|PATCH /api/recipe/{tags,ingredients}/:id/` - Rename
/// - `DELETE /api/recipe/{tags,ingredients}/:id/` - Delete
///
/// Every query is scoped to the caller; another user's rows answer 404.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery},
    validation::{self, require_fields},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use recipebox_shared::{
    auth::middleware::AuthContext,
    models::attribute::{self, RecipeAttribute},
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

/// Serialized tag or ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeResponse {
    pub id: i64,
    pub name: String,
}

impl AttributeResponse {
    pub fn from_attribute<T: RecipeAttribute>(attribute: &T) -> Self {
        Self {
            id: attribute.id(),
            name: attribute.name().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AttributeRequest {
    #[validate(
        custom(function = "validation::not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub name: Option<String>,
}

impl AttributeRequest {
    /// Validated, trimmed name; required
    fn into_name(self) -> ApiResult<String> {
        require_fields(&[("name", self.name.is_some())])?;
        self.validate()?;
        Ok(self.name.unwrap_or_default().trim().to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub assigned_only: Option<String>,
}

impl ListParams {
    /// `assigned_only` as a flag: any non-zero integer is true
    pub fn assigned_only(&self) -> ApiResult<bool> {
        match self.assigned_only.as_deref().map(str::trim) {
            None | Some("") => Ok(false),
            Some(raw) => raw.parse::<i64>().map(|value| value != 0).map_err(|_| {
                ApiError::field("assigned_only", "A valid integer is required.")
            }),
        }
    }
}

pub async fn list<T: RecipeAttribute>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<AttributeResponse>>> {
    let rows = attribute::list_for_user::<T>(&state.db, auth.user_id, params.assigned_only()?).await?;

    Ok(Json(rows.iter().map(AttributeResponse::from_attribute).collect()))
}

pub async fn create<T: RecipeAttribute>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<AttributeRequest>,
) -> ApiResult<(StatusCode, Json<AttributeResponse>)> {
    let name = req.into_name()?;
    let created = attribute::create::<T>(&state.db, auth.user_id, &name).await?;

    Ok((
        StatusCode::CREATED,
        Json(AttributeResponse::from_attribute(&created)),
    ))
}

/// PUT: `name` is required
pub async fn update<T: RecipeAttribute>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<AttributeRequest>,
) -> ApiResult<Json<AttributeResponse>> {
    let name = req.into_name()?;
    rename::<T>(&state, auth.user_id, id, &name).await
}

/// PATCH: an absent `name` leaves the row unchanged
pub async fn partial_update<T: RecipeAttribute>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<AttributeRequest>,
) -> ApiResult<Json<AttributeResponse>> {
    if req.name.is_none() {
        let current = attribute::find_for_user::<T>(&state.db, auth.user_id, id)
            .await?
            .ok_or_else(ApiError::not_found)?;
        return Ok(Json(AttributeResponse::from_attribute(&current)));
    }

    let name = req.into_name()?;
    rename::<T>(&state, auth.user_id, id, &name).await
}

async fn rename<T: RecipeAttribute>(
    state: &AppState,
    user_id: i64,
    id: i64,
    name: &str,
) -> ApiResult<Json<AttributeResponse>> {
    let renamed = attribute::rename::<T>(&state.db, user_id, id, name)
        .await?
        .ok_or_else(ApiError::not_found)?;

    debug!(kind = T::KIND, id, user_id, "Attribute renamed");
    Ok(Json(AttributeResponse::from_attribute(&renamed)))
}

pub async fn destroy<T: RecipeAttribute>(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    if !attribute::delete_for_user::<T>(&state.db, auth.user_id, id).await? {
        return Err(ApiError::not_found());
    }

    debug!(kind = T::KIND, id, user_id = auth.user_id, "Attribute deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: Option<&str>) -> ListParams {
        ListParams {
            assigned_only: value.map(String::from),
        }
    }

    #[test]
    fn test_assigned_only() {
        assert!(!params(None).assigned_only().unwrap());
        assert!(!params(Some("")).assigned_only().unwrap());
        assert!(!params(Some("0")).assigned_only().unwrap());
        assert!(params(Some("1")).assigned_only().unwrap());
        assert!(params(Some("2")).assigned_only().unwrap());
        assert!(params(Some("yes")).assigned_only().is_err());
    }

    #[test]
    fn test_into_name() {
        let req = AttributeRequest {
            name: Some("  Vegan ".to_string()),
        };
        assert_eq!(req.into_name().unwrap(), "Vegan");

        assert!(AttributeRequest::default().into_name().is_err());
        assert!(AttributeRequest {
            name: Some("   ".to_string())
        }
        .into_name()
        .is_err());
    }
}
