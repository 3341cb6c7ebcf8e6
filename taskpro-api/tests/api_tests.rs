/// Integration tests for the TaskPro API
///
/// These tests drive the full router in-process:
/// - Envelope shape and status codes
/// - Signup / verify / login / logout flow
/// - Board → column → card lifecycle including moves
/// - Ownership isolation between users
///
/// Run with: cargo test -p taskpro-api --test api_tests -- --ignored --test-threads=1

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{json_request, send_request, unique_email, TestContext};
use serde_json::json;
use taskpro_shared::models::user::User;

#[tokio::test]
#[ignore] // Requires running PostgreSQL/Redis
async fn test_health() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send_request(&ctx.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["database"], "connected");
    assert_eq!(body["data"]["redis"], "connected");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL/Redis
async fn test_signup_verify_login_logout() {
    let ctx = TestContext::new().await.unwrap();
    let email = unique_email();

    let (status, body) = send_request(
        &ctx.app,
        json_request(
            "POST",
            "/v1/auth/signup",
            json!({ "email": email, "password": "secret123", "name": "Ada" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["code"], 201);
    assert_eq!(body["data"]["user"]["email"], email.as_str());
    assert!(body["data"]["user"].get("password").is_none());

    // Duplicate email, different everything else
    let (status, body) = send_request(
        &ctx.app,
        json_request(
            "POST",
            "/v1/auth/signup",
            json!({ "email": email, "password": "another-pass", "name": "Bob" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");

    let login = json!({ "email": email, "password": "secret123" });

    let (status, _) = send_request(&ctx.app, json_request("POST", "/v1/auth/login", login.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = User::find_by_email(&ctx.db, &email)
        .await
        .unwrap()
        .unwrap()
        .verification_token
        .unwrap();

    let request = Request::builder()
        .uri(format!("/v1/auth/verify/{}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_request(&ctx.app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_request(
        &ctx.app,
        json_request("POST", "/v1/auth/verify", json!({ "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Verification has already been passed");

    let (status, body) = send_request(&ctx.app, json_request("POST", "/v1/auth/login", login)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["tokenValability"].as_i64().unwrap() > 0);
    let session = body["data"]["token"].as_str().unwrap().to_string();

    let current = |token: &str| {
        Request::builder()
            .uri("/v1/users/current")
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = send_request(&ctx.app, current(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["name"], "Ada");

    let logout = Request::builder()
        .method("POST")
        .uri("/v1/auth/logout")
        .header("authorization", format!("Bearer {}", session))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_request(&ctx.app, logout).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = send_request(&ctx.app, current(&session)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    if let Some(user) = User::find_by_email(&ctx.db, &email).await.unwrap() {
        User::delete(&ctx.db, user.id).await.unwrap();
    }
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL/Redis
async fn test_board_requires_session() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder().uri("/v1/boards").body(Body::empty()).unwrap();
    let (status, body) = send_request(&ctx.app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Not authorized");

    let request = Request::builder()
        .uri("/v1/boards")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_request(&ctx.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    // Unknown paths under an authenticated prefix are plain 404s
    let request = Request::builder()
        .uri(format!("/v1/boards/{}/archive", uuid::Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_request(&ctx.app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL/Redis
async fn test_board_column_card_flow() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/boards",
            Some(json!({ "name": "Work", "icon": "i1", "background": null })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["columns"], json!([]));
    let board_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send(
            "POST",
            &format!("/v1/boards/{}/columns", board_id),
            Some(json!({ "name": "Todo" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["owner"], board_id.as_str());
    let todo_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send(
            "POST",
            &format!("/v1/columns/{}/cards", todo_id),
            Some(json!({ "title": "Fix bug", "labelColor": "#FF0000" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["labelColor"], "#FF0000");
    let card_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = ctx
        .send(
            "POST",
            &format!("/v1/boards/{}/columns", board_id),
            Some(json!({ "columnName": "Done" })),
        )
        .await;
    let done_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = ctx
        .send("PATCH", &format!("/v1/cards/{}/move/{}", card_id, done_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["oldColumnId"], todo_id.as_str());
    assert_eq!(body["data"]["newColumnId"], done_id.as_str());
    assert_eq!(body["data"]["card"]["owner"], done_id.as_str());

    let (status, body) = ctx.send("GET", &format!("/v1/boards/{}", board_id), None).await;
    assert_eq!(status, StatusCode::OK);
    let columns = body["data"]["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0]["name"], "Todo");
    assert_eq!(columns[0]["cards"], json!([]));
    assert_eq!(columns[1]["cards"][0]["id"], card_id.as_str());

    // Column to the front
    let (status, body) = ctx
        .send(
            "PATCH",
            &format!("/v1/columns/{}/position", done_id),
            Some(json!({ "position": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["columns"][0]["name"], "Done");

    let (status, body) = ctx
        .send(
            "PATCH",
            &format!("/v1/cards/{}", card_id),
            Some(json!({ "description": "in prod" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Fix bug");
    assert_eq!(body["data"]["description"], "in prod");

    let (status, _) = ctx.send("DELETE", &format!("/v1/columns/{}", done_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.send("DELETE", &format!("/v1/cards/{}", card_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.send("DELETE", &format!("/v1/boards/{}", board_id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.send("GET", &format!("/v1/boards/{}", board_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL/Redis
async fn test_validation_and_conflict_errors() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send("POST", "/v1/boards", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "name");

    let (status, _) = ctx.send("POST", "/v1/boards", Some(json!({ "name": "Dup" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx.send("POST", "/v1/boards", Some(json!({ "name": "Dup" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);

    let (status, body) = ctx
        .send(
            "POST",
            "/v1/boards",
            Some(json!({ "name": "Huge", "background": "x".repeat(2000) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "background");

    let (_, body) = ctx.send("GET", "/v1/boards", None).await;
    let board_id = body["data"][0]["id"].as_str().unwrap().to_string();
    let (status, _) = ctx
        .send(
            "PATCH",
            &format!("/v1/boards/{}", board_id),
            Some(json!({ "background": "x".repeat(2000) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .send(
            "POST",
            "/v1/auth/signup",
            Some(json!({ "email": unique_email(), "password": "secret123", "name": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx.send("GET", "/v1/boards/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL/Redis
async fn test_other_users_boards_are_hidden() {
    let owner = TestContext::new().await.unwrap();
    let stranger = TestContext::new().await.unwrap();

    let (_, body) = owner
        .send("POST", "/v1/boards", Some(json!({ "name": "Private" })))
        .await;
    let board_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = stranger.send("GET", &format!("/v1/boards/{}", board_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = stranger
        .send("DELETE", &format!("/v1/boards/{}", board_id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = stranger.send("GET", "/v1/boards", None).await;
    assert_eq!(body["data"], json!([]));

    owner.cleanup().await.unwrap();
    stranger.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL/Redis
async fn test_list_backgrounds() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .uri("/v1/backgrounds")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_request(&ctx.app, request).await;

    assert_eq!(status, StatusCode::OK);
    let backgrounds = body["data"].as_array().unwrap();
    assert!(!backgrounds.is_empty());
    assert!(backgrounds[0]["imgUrl"].is_string());

    ctx.cleanup().await.unwrap();
}
