/// Vote coordination - keeps the ledger mutation and the derived metrics
/// consistent for every vote operation.
use std::sync::Arc;

use uuid::Uuid;

use crate::db::{PostStore, VoteUpdate};
use crate::error::Result;
use crate::metrics::VOTE_ACTIONS_TOTAL;
use crate::models::{Post, VoteDirection};

pub struct VoteService {
    store: Arc<dyn PostStore>,
}

impl VoteService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// Casts or refreshes an upvote. Re-voting the same direction is
    /// idempotent; switching direction overwrites the prior entry.
    pub async fn upvote(&self, post_id: Uuid, user_id: Uuid) -> Result<Post> {
        self.apply(post_id, user_id, VoteUpdate::Cast(VoteDirection::Up), "upvote")
            .await
    }

    /// Casts or refreshes a downvote.
    pub async fn downvote(&self, post_id: Uuid, user_id: Uuid) -> Result<Post> {
        self.apply(
            post_id,
            user_id,
            VoteUpdate::Cast(VoteDirection::Down),
            "downvote",
        )
        .await
    }

    /// Withdraws the user's vote; withdrawing an absent vote is a no-op.
    pub async fn unvote(&self, post_id: Uuid, user_id: Uuid) -> Result<Post> {
        self.apply(post_id, user_id, VoteUpdate::Retract, "unvote").await
    }

    async fn apply(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        update: VoteUpdate,
        action: &'static str,
    ) -> Result<Post> {
        self.store.apply_vote(post_id, user_id, update).await?;
        VOTE_ACTIONS_TOTAL.with_label_values(&[action]).inc();

        // The mutation is already durable; this reload only serves the
        // response, so the ledger cannot be corrupted by read/write skew.
        self.store.get(post_id).await
    }
}
