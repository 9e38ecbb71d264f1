/// Vote handlers - HTTP endpoints for the vote operations
use std::sync::Arc;

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::db::PostStore;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::services::VoteService;

/// Upvote a post
pub async fn upvote_post(
    store: web::Data<Arc<dyn PostStore>>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = VoteService::new(store.get_ref().clone());
    let post = service.upvote(*post_id, user.id).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Downvote a post
pub async fn downvote_post(
    store: web::Data<Arc<dyn PostStore>>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = VoteService::new(store.get_ref().clone());
    let post = service.downvote(*post_id, user.id).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Withdraw the requester's vote
pub async fn unvote_post(
    store: web::Data<Arc<dyn PostStore>>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = VoteService::new(store.get_ref().clone());
    let post = service.unvote(*post_id, user.id).await?;

    Ok(HttpResponse::Ok().json(post))
}
