// src/handlers/post_handlers.rs

use actix_web::{get, post, web, HttpResponse};

use crate::dtos::post_dtos::CreatePostIn;
use crate::errors::ApiError;
use crate::AppState;

/// GET /api/posts
#[get("/posts")]
pub async fn list_posts(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let posts = app_state.posts.list().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /api/posts
#[post("/posts")]
pub async fn create_post(
    app_state: web::Data<AppState>,
    body: web::Json<CreatePostIn>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let user_id = body
        .user_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))?;

    let post = app_state
        .posts
        .create(body.content.as_deref(), body.image_url.as_deref(), user_id)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    use crate::repositories::memory::MemoryBackend;
    use crate::{routes, test_state};

    #[actix_web::test]
    async fn blank_post_returns_400_without_backend_call() {
        let backend = Arc::new(MemoryBackend::new());
        let app = test::init_service(
            App::new().app_data(test_state(backend.clone())).configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "content": "", "imageUrl": null, "userId": "u1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Either content or imageUrl is required" }));
        assert_eq!(backend.calls(), 0);
    }

    #[actix_web::test]
    async fn missing_user_id_returns_400() {
        let backend = Arc::new(MemoryBackend::new());
        let app = test::init_service(App::new().app_data(test_state(backend)).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "content": "hello" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "userId is required");
    }

    #[actix_web::test]
    async fn text_post_returns_201_with_null_image() {
        let backend = Arc::new(MemoryBackend::new());
        let app = test::init_service(App::new().app_data(test_state(backend)).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "content": "hello", "userId": "u1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["content"], "hello");
        assert_eq!(body["image_url"], Value::Null);
        assert_eq!(body["author_id"], "u1");
    }

    #[actix_web::test]
    async fn list_returns_array_newest_first() {
        let backend = Arc::new(MemoryBackend::new());
        let app = test::init_service(App::new().app_data(test_state(backend)).configure(routes)).await;

        for content in ["older", "newer"] {
            let req = test::TestRequest::post()
                .uri("/api/posts")
                .set_json(json!({ "content": content, "userId": "u1" }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let contents: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["newer", "older"]);
    }

    #[actix_web::test]
    async fn backend_error_returns_500_with_message() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_failing(true);
        let app = test::init_service(App::new().app_data(test_state(backend)).configure(routes)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/posts").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "backend unavailable");
    }

    #[actix_web::test]
    async fn malformed_json_returns_400_error_body() {
        let backend = Arc::new(MemoryBackend::new());
        let app = test::init_service(App::new().app_data(test_state(backend)).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}
