/// Post service - handles post creation, retrieval, and deletion
use std::sync::Arc;

use uuid::Uuid;

use crate::db::PostStore;
use crate::error::{AppError, Result};
use crate::models::{Author, Post, PostKind};

/// Validated payload for a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub category: String,
    pub title: String,
    pub kind: PostKind,
    pub url: Option<String>,
    pub text: Option<String>,
}

pub struct PostService {
    store: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// Builds the aggregate with the author's automatic upvote and
    /// persists it.
    pub async fn create_post(&self, author: Author, new_post: NewPost) -> Result<Post> {
        let NewPost {
            category,
            title,
            kind,
            url,
            text,
        } = new_post;

        let post = Post::new(author, category, title, kind, url, text);
        self.store.insert(&post).await?;
        Ok(post)
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.store.get(post_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<Post>> {
        self.store.find_all().await
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Post>> {
        self.store.find_by_category(category).await
    }

    pub async fn list_by_author(&self, username: &str) -> Result<Vec<Post>> {
        self.store.find_by_author(username).await
    }

    /// Deletes a post after verifying the requester authored it. Embedded
    /// votes and comments go with it.
    pub async fn delete_post(&self, post_id: Uuid, user_id: Uuid) -> Result<()> {
        let post = self.store.get(post_id).await?;
        if post.author.id != user_id {
            return Err(AppError::PermissionDenied);
        }
        self.store.delete(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockPostStore;
    use crate::models::VoteDirection;
    use mockall::predicate::eq;

    fn alice() -> Author {
        Author {
            username: "alice".to_string(),
            id: Uuid::new_v4(),
        }
    }

    fn text_payload() -> NewPost {
        NewPost {
            category: "programming".to_string(),
            title: "a title".to_string(),
            kind: PostKind::Text,
            url: None,
            text: Some("a body".to_string()),
        }
    }

    #[tokio::test]
    async fn create_persists_the_author_upvote_and_initial_metrics() {
        let author = alice();
        let author_id = author.id;

        let mut store = MockPostStore::new();
        store
            .expect_insert()
            .withf(move |post: &Post| {
                post.score == 1
                    && post.upvote_percentage == 100
                    && post.views == 0
                    && post.votes.len() == 1
                    && post.votes[0].user_id == author_id
                    && post.votes[0].direction == VoteDirection::Up
                    && post.comments.is_empty()
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = PostService::new(Arc::new(store));
        let post = service.create_post(author, text_payload()).await.unwrap();
        assert_eq!(post.score, 1);
        assert_eq!(post.upvote_percentage, 100);
    }

    #[tokio::test]
    async fn delete_by_the_author_removes_the_post() {
        let author = alice();
        let author_id = author.id;
        let post = Post::new(
            author,
            "programming".to_string(),
            "a title".to_string(),
            PostKind::Text,
            None,
            Some("a body".to_string()),
        );
        let post_id = post.id;

        let mut store = MockPostStore::new();
        store
            .expect_get()
            .with(eq(post_id))
            .returning(move |_| Ok(post.clone()));
        store
            .expect_delete()
            .with(eq(post_id))
            .times(1)
            .returning(|_| Ok(()));

        let service = PostService::new(Arc::new(store));
        service.delete_post(post_id, author_id).await.unwrap();
    }

    #[tokio::test]
    async fn delete_by_a_non_author_is_denied_and_leaves_the_post() {
        let post = Post::new(
            alice(),
            "programming".to_string(),
            "a title".to_string(),
            PostKind::Text,
            None,
            Some("a body".to_string()),
        );
        let post_id = post.id;

        let mut store = MockPostStore::new();
        store
            .expect_get()
            .returning(move |_| Ok(post.clone()));
        store.expect_delete().times(0);

        let service = PostService::new(Arc::new(store));
        let err = service
            .delete_post(post_id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
    }

    #[tokio::test]
    async fn delete_of_a_missing_post_is_no_such_post() {
        let mut store = MockPostStore::new();
        store.expect_get().returning(|_| Err(AppError::NoSuchPost));
        store.expect_delete().times(0);

        let service = PostService::new(Arc::new(store));
        let err = service
            .delete_post(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoSuchPost));
    }
}
