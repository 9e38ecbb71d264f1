/// Storage layer
///
/// This module provides the post store contract and its PostgreSQL
/// implementation. The store is the sole owner of post aggregates; every
/// mutation to a post flows through it.
mod postgres;

pub use postgres::PgPostStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Comment, Post, VoteDirection};

/// A pending change to one user's ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteUpdate {
    /// Insert-or-overwrite the entry with the given direction.
    Cast(VoteDirection),
    /// Drop the entry; retracting an absent entry is a no-op.
    Retract,
}

/// Durable keyed storage for post aggregates.
///
/// Every operation is bounded by the store's configured timeout. A timeout
/// or connectivity fault surfaces as `AppError::StoreUnavailable`, never as
/// `AppError::NoSuchPost`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Loads a full aggregate; `NoSuchPost` when the id is unknown.
    async fn get(&self, post_id: Uuid) -> Result<Post>;

    async fn find_all(&self) -> Result<Vec<Post>>;

    async fn find_by_category(&self, category: &str) -> Result<Vec<Post>>;

    async fn find_by_author(&self, username: &str) -> Result<Vec<Post>>;

    /// Persists a freshly built aggregate, ledger included.
    /// `DuplicateId` when a post with the same id already exists.
    async fn insert(&self, post: &Post) -> Result<()>;

    /// Removes the aggregate and everything embedded in it.
    /// `NoSuchPost` when the id is unknown.
    async fn delete(&self, post_id: Uuid) -> Result<()>;

    /// Applies one user's vote change and the metrics recompute as a single
    /// atomic unit. `NoSuchPost` when the post is absent, in which case no
    /// mutation is attempted.
    async fn apply_vote(&self, post_id: Uuid, user_id: Uuid, update: VoteUpdate) -> Result<()>;

    /// Appends a comment to the post's comment sequence.
    async fn add_comment(&self, post_id: Uuid, comment: &Comment) -> Result<()>;

    /// Removes a comment by id; a missing comment is a no-op.
    async fn remove_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<()>;
}
