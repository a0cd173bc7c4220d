/// Integration tests for the ingredient endpoints

mod common;

use axum::http::{Method, StatusCode};
use common::TestContext;
use recipebox_shared::models::attribute;
use recipebox_shared::models::ingredient::Ingredient;
use serde_json::json;

const INGREDIENTS_URL: &str = "/api/recipe/ingredients/";

#[tokio::test]
async fn test_login_required() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx.anonymous(Method::GET, INGREDIENTS_URL, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_retrieve_ingredient_list() {
    let ctx = TestContext::new().await.unwrap();
    let kale = ctx.sample_ingredient(ctx.user.id, "Kale").await;
    let salt = ctx.sample_ingredient(ctx.user.id, "Salt").await;

    let res = ctx.request(Method::GET, INGREDIENTS_URL, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body,
        json!([
            { "id": salt.id, "name": "Salt" },
            { "id": kale.id, "name": "Kale" }
        ])
    );

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_ingredients_limited_to_user() {
    let ctx = TestContext::new().await.unwrap();
    let (other, _) = ctx.other_user().await.unwrap();
    ctx.sample_ingredient(other.id, "Banana").await;
    let mango = ctx.sample_ingredient(ctx.user.id, "Mango").await;

    let res = ctx.request(Method::GET, INGREDIENTS_URL, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().unwrap().len(), 1);
    assert_eq!(res.body[0]["name"], mango.name);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_ingredient_successful() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx
        .request(Method::POST, INGREDIENTS_URL, Some(json!({ "name": "Cabbage" })))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let ingredients = attribute::list_for_user::<Ingredient>(&ctx.db, ctx.user.id, false)
        .await
        .unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0].name, "Cabbage");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_ingredient_invalid() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx
        .request(Method::POST, INGREDIENTS_URL, Some(json!({ "name": "" })))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_retrieve_ingredients_assigned_to_recipes() {
    let ctx = TestContext::new().await.unwrap();
    let apples = ctx.sample_ingredient(ctx.user.id, "Apples").await;
    ctx.sample_ingredient(ctx.user.id, "Turkey").await;
    ctx.sample_recipe_with(ctx.user.id, "Apple crumble", vec![], vec![apples.id])
        .await;

    let res = ctx
        .request(Method::GET, &format!("{}?assigned_only=1", INGREDIENTS_URL), None)
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!([{ "id": apples.id, "name": "Apples" }]));

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_retrieve_ingredients_assigned_unique() {
    let ctx = TestContext::new().await.unwrap();
    let eggs = ctx.sample_ingredient(ctx.user.id, "Eggs").await;
    ctx.sample_ingredient(ctx.user.id, "Cheese").await;
    ctx.sample_recipe_with(ctx.user.id, "Eggs benedict", vec![], vec![eggs.id])
        .await;
    ctx.sample_recipe_with(ctx.user.id, "Coriander eggs on toast", vec![], vec![eggs.id])
        .await;

    let res = ctx
        .request(Method::GET, &format!("{}?assigned_only=1", INGREDIENTS_URL), None)
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.as_array().unwrap().len(), 1);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_delete_ingredient_unlinks_recipes() {
    let ctx = TestContext::new().await.unwrap();
    let ginger = ctx.sample_ingredient(ctx.user.id, "Ginger").await;
    let recipe = ctx
        .sample_recipe_with(ctx.user.id, "Stir fry", vec![], vec![ginger.id])
        .await;

    let res = ctx
        .request(
            Method::DELETE,
            &format!("/api/recipe/ingredients/{}/", ginger.id),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    assert!(recipe.ingredients(&ctx.db).await.unwrap().is_empty());

    ctx.cleanup().await.unwrap();
}
