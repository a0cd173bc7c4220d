/// Integration tests for the user endpoints
///
/// Registration, token issue and the authenticated profile.

mod common;

use axum::http::{header, Method, StatusCode};
use common::{unique_email, TestContext, TEST_PASSWORD};
use recipebox_shared::auth::password::verify_password;
use recipebox_shared::models::user::User;
use serde_json::json;

const CREATE_USER_URL: &str = "/api/user/create/";
const TOKEN_URL: &str = "/api/user/token/";
const ME_URL: &str = "/api/user/me/";

async fn delete_by_email(ctx: &TestContext, email: &str) {
    if let Some(user) = User::find_by_email(&ctx.db, email).await.unwrap() {
        User::delete(&ctx.db, user.id).await.unwrap();
    }
}

#[tokio::test]
async fn test_create_valid_user_success() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email();

    let res = ctx
        .anonymous(
            Method::POST,
            CREATE_USER_URL,
            Some(json!({ "email": email, "password": "top4glory", "name": "Test name" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body, json!({ "email": email, "name": "Test name" }));
    assert!(res.body.get("password").is_none());

    let user = User::find_by_email(&ctx.db, &email).await.unwrap().unwrap();
    assert!(verify_password("top4glory", &user.password_hash).unwrap());

    User::delete(&ctx.db, user.id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_user_normalizes_email_domain() {
    let ctx = TestContext::new().await.unwrap();
    let local = format!("Mixed-{}", uuid::Uuid::new_v4());

    let res = ctx
        .anonymous(
            Method::POST,
            CREATE_USER_URL,
            Some(json!({
                "email": format!("{}@GMAIL.COM", local),
                "password": "top4glory",
                "name": "Test name"
            })),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["email"], format!("{}@gmail.com", local));

    delete_by_email(&ctx, &format!("{}@gmail.com", local)).await;
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_user_exists() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx
        .anonymous(
            Method::POST,
            CREATE_USER_URL,
            Some(json!({ "email": ctx.user.email, "password": "top4glory", "name": "Test name" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["details"][0]["field"], "email");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_password_too_short() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email();

    let res = ctx
        .anonymous(
            Method::POST,
            CREATE_USER_URL,
            Some(json!({ "email": email, "password": "pw", "name": "Test name" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["details"][0]["field"], "password");
    assert!(User::find_by_email(&ctx.db, &email).await.unwrap().is_none());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_user_invalid_email_and_blank_name() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx
        .anonymous(
            Method::POST,
            CREATE_USER_URL,
            Some(json!({ "email": "not-an-email", "password": "top4glory", "name": "  " })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = res.body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "name"]);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_user_malformed_json() {
    let ctx = TestContext::new().await.unwrap();

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri(CREATE_USER_URL)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"email\": "))
        .unwrap();
    let res = ctx.send(request).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "bad_request");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_token_for_user() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx
        .anonymous(
            Method::POST,
            TOKEN_URL,
            Some(json!({ "email": ctx.user.email, "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let token = res.body["token"].as_str().unwrap().to_string();
    assert_ne!(token, ctx.token);

    // The new token works on its own
    let request = common::json_request(
        Method::GET,
        ME_URL,
        Some(&format!("Token {}", token)),
        None,
    );
    let me = ctx.send(request).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], ctx.user.email);

    let user = User::find_by_id(&ctx.db, ctx.user.id).await.unwrap().unwrap();
    assert!(user.last_login_at.is_some());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_token_invalid_credentials() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx
        .anonymous(
            Method::POST,
            TOKEN_URL,
            Some(json!({ "email": ctx.user.email, "password": "wrong" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.get("token").is_none());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_token_no_user() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx
        .anonymous(
            Method::POST,
            TOKEN_URL,
            Some(json!({ "email": unique_email(), "password": "top4glory" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.get("token").is_none());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_create_token_missing_field() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx
        .anonymous(
            Method::POST,
            TOKEN_URL,
            Some(json!({ "email": "one", "password": "" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.get("token").is_none());
    assert_eq!(res.body["details"][0]["field"], "password");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_retrieve_user_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx.anonymous(Method::GET, ME_URL, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers[header::WWW_AUTHENTICATE], "Token");

    let request = common::json_request(Method::GET, ME_URL, Some("Token rbx_not-a-real-token"), None);
    let res = ctx.send(request).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_retrieve_profile_success() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx.request(Method::GET, ME_URL, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.body,
        json!({ "email": ctx.user.email, "name": ctx.user.name })
    );

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_post_me_not_allowed() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx.request(Method::POST, ME_URL, Some(json!({}))).await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_partial_update_user_profile() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx
        .request(
            Method::PATCH,
            ME_URL,
            Some(json!({ "name": "new name", "password": "newpassword123" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "new name");
    assert_eq!(res.body["email"], ctx.user.email);

    let user = User::find_by_id(&ctx.db, ctx.user.id).await.unwrap().unwrap();
    assert_eq!(user.name, "new name");
    assert!(verify_password("newpassword123", &user.password_hash).unwrap());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_full_update_requires_every_field() {
    let ctx = TestContext::new().await.unwrap();

    let res = ctx
        .request(Method::PUT, ME_URL, Some(json!({ "name": "new name" })))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let new_email = unique_email();
    let res = ctx
        .request(
            Method::PUT,
            ME_URL,
            Some(json!({ "email": new_email, "password": "anotherpass", "name": "Full" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "email": new_email, "name": "Full" }));

    ctx.cleanup().await.unwrap();
}
