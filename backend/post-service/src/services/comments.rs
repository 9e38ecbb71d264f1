/// Comment service - appends and removes comments on a post
use std::sync::Arc;

use uuid::Uuid;

use crate::db::PostStore;
use crate::error::Result;
use crate::models::{Author, Comment, Post};

pub struct CommentService {
    store: Arc<dyn PostStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// Appends a comment and returns the refreshed post.
    pub async fn add_comment(&self, post_id: Uuid, author: Author, body: &str) -> Result<Post> {
        let comment = Comment::new(author, body);
        self.store.add_comment(post_id, &comment).await?;
        self.store.get(post_id).await
    }

    /// Removes a comment by id and returns the refreshed post. Removing an
    /// already-removed comment is a no-op.
    pub async fn remove_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Post> {
        self.store.remove_comment(post_id, comment_id).await?;
        self.store.get(post_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockPostStore;
    use crate::error::AppError;
    use crate::models::PostKind;
    use mockall::predicate::eq;

    fn alice() -> Author {
        Author {
            username: "alice".to_string(),
            id: Uuid::new_v4(),
        }
    }

    fn sample_post() -> Post {
        Post::new(
            alice(),
            "programming".to_string(),
            "a title".to_string(),
            PostKind::Text,
            None,
            Some("a body".to_string()),
        )
    }

    #[tokio::test]
    async fn add_comment_appends_then_reloads() {
        let post = sample_post();
        let post_id = post.id;

        let mut store = MockPostStore::new();
        store
            .expect_add_comment()
            .withf(move |id: &Uuid, comment: &Comment| {
                *id == post_id && comment.body == "nice post" && comment.author.username == "bob"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_get()
            .with(eq(post_id))
            .times(1)
            .returning(move |_| Ok(post.clone()));

        let service = CommentService::new(Arc::new(store));
        let bob = Author {
            username: "bob".to_string(),
            id: Uuid::new_v4(),
        };
        let refreshed = service.add_comment(post_id, bob, "nice post").await.unwrap();
        assert_eq!(refreshed.id, post_id);
    }

    #[tokio::test]
    async fn add_comment_on_a_missing_post_propagates() {
        let mut store = MockPostStore::new();
        store
            .expect_add_comment()
            .returning(|_, _| Err(AppError::NoSuchPost));
        store.expect_get().times(0);

        let service = CommentService::new(Arc::new(store));
        let err = service
            .add_comment(Uuid::new_v4(), alice(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoSuchPost));
    }

    #[tokio::test]
    async fn remove_comment_reloads_the_post() {
        let post = sample_post();
        let post_id = post.id;
        let comment_id = Uuid::new_v4();

        let mut store = MockPostStore::new();
        store
            .expect_remove_comment()
            .with(eq(post_id), eq(comment_id))
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_get()
            .returning(move |_| Ok(post.clone()));

        let service = CommentService::new(Arc::new(store));
        let refreshed = service.remove_comment(post_id, comment_id).await.unwrap();
        assert_eq!(refreshed.id, post_id);
    }
}
