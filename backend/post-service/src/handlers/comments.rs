/// Comment handlers - HTTP endpoints for comment operations
use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::services::CommentService;

/// Request body for creating a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1))]
    pub comment: String,
}

/// Create a new comment on a post
pub async fn create_comment(
    store: web::Data<Arc<dyn PostStore>>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    req.validate()
        .map_err(|err| AppError::InvalidInput(err.to_string()))?;

    let service = CommentService::new(store.get_ref().clone());
    let post = service
        .add_comment(*post_id, user.into_author(), &req.comment)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Delete a comment from a post
pub async fn delete_comment(
    store: web::Data<Arc<dyn PostStore>>,
    _user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let service = CommentService::new(store.get_ref().clone());
    let post = service.remove_comment(post_id, comment_id).await?;

    Ok(HttpResponse::Ok().json(post))
}
