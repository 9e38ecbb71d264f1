/// Post handlers - HTTP endpoints for post operations
use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::models::PostKind;
use crate::services::{NewPost, PostService};

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PostKind,
    #[validate(url)]
    pub url: Option<String>,
    pub text: Option<String>,
}

impl CreatePostRequest {
    fn into_new_post(self) -> Result<NewPost> {
        self.validate()
            .map_err(|err| AppError::InvalidInput(err.to_string()))?;

        match self.kind {
            PostKind::Link => {
                if self.url.as_deref().unwrap_or("").is_empty() {
                    return Err(AppError::InvalidInput("link posts require a url".into()));
                }
            }
            PostKind::Text => {
                if self.text.as_deref().unwrap_or("").is_empty() {
                    return Err(AppError::InvalidInput(
                        "text posts require a text body".into(),
                    ));
                }
            }
        }

        Ok(NewPost {
            category: self.category,
            title: self.title,
            kind: self.kind,
            url: self.url,
            text: self.text,
        })
    }
}

/// Create a new post
pub async fn create_post(
    store: web::Data<Arc<dyn PostStore>>,
    user: AuthenticatedUser,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let new_post = req.into_inner().into_new_post()?;
    let service = PostService::new(store.get_ref().clone());
    let post = service.create_post(user.into_author(), new_post).await?;

    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID
pub async fn get_post(
    store: web::Data<Arc<dyn PostStore>>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new(store.get_ref().clone());
    let post = service.get_post(*post_id).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// List all posts
pub async fn list_posts(store: web::Data<Arc<dyn PostStore>>) -> Result<HttpResponse> {
    let service = PostService::new(store.get_ref().clone());
    let posts = service.list_all().await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// List posts in a category
pub async fn list_posts_by_category(
    store: web::Data<Arc<dyn PostStore>>,
    category: web::Path<String>,
) -> Result<HttpResponse> {
    let service = PostService::new(store.get_ref().clone());
    let posts = service.list_by_category(&category).await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// List posts by author username
pub async fn list_posts_by_user(
    store: web::Data<Arc<dyn PostStore>>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let service = PostService::new(store.get_ref().clone());
    let posts = service.list_by_author(&username).await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// Delete a post (author only)
pub async fn delete_post(
    store: web::Data<Arc<dyn PostStore>>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new(store.get_ref().clone());
    service.delete_post(*post_id, user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "success" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockPostStore;
    use crate::middleware::{USERNAME_HEADER, USER_ID_HEADER};
    use crate::models::{Author, Post};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    fn sample_post(author: Author) -> Post {
        Post::new(
            author,
            "programming".to_string(),
            "a title".to_string(),
            PostKind::Text,
            None,
            Some("a body".to_string()),
        )
    }

    fn app_store(mock: MockPostStore) -> web::Data<Arc<dyn PostStore>> {
        let store: Arc<dyn PostStore> = Arc::new(mock);
        web::Data::new(store)
    }

    #[actix_web::test]
    async fn create_without_identity_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(app_store(MockPostStore::new()))
                .route("/api/posts", web::post().to(create_post)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(serde_json::json!({
                "category": "programming",
                "title": "a title",
                "type": "text",
                "text": "a body"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn link_post_without_url_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(app_store(MockPostStore::new()))
                .route("/api/posts", web::post().to(create_post)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
            .insert_header((USERNAME_HEADER, "alice"))
            .set_json(serde_json::json!({
                "category": "programming",
                "title": "a title",
                "type": "link"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn missing_post_maps_to_not_found() {
        let mut mock = MockPostStore::new();
        mock.expect_get().returning(|_| Err(AppError::NoSuchPost));

        let app = test::init_service(
            App::new()
                .app_data(app_store(mock))
                .route("/api/post/{post_id}", web::get().to(get_post)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/post/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn delete_by_a_non_author_is_forbidden() {
        let post = sample_post(Author {
            username: "alice".to_string(),
            id: Uuid::new_v4(),
        });
        let post_id = post.id;

        let mut mock = MockPostStore::new();
        mock.expect_get().returning(move |_| Ok(post.clone()));
        mock.expect_delete().times(0);

        let app = test::init_service(
            App::new()
                .app_data(app_store(mock))
                .route("/api/post/{post_id}", web::delete().to(delete_post)),
        )
        .await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/post/{post_id}"))
            .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
            .insert_header((USERNAME_HEADER, "mallory"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
