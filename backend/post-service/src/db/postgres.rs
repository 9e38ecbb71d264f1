/// PostgreSQL implementation of the post store.
///
/// Aggregates are split across three tables: `posts` (metrics included),
/// `post_votes` (the ledger, keyed by `(post_id, user_id)`), and
/// `comments`. The vote path runs as one transaction so the ledger
/// mutation and the metrics write are never observed separately.
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{PostStore, VoteUpdate};
use crate::error::{AppError, Result};
use crate::models::{Author, Comment, Post, PostKind, Vote, VoteDirection};
use crate::services::scoring;

const SELECT_POST_COLUMNS: &str = "SELECT id, author_id, author_username, category, title, kind, \
     url, body, score, upvote_percentage, views, created_at FROM posts";

pub struct PgPostStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PgPostStore {
    pub fn new(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    /// Bounds a storage future by the configured per-operation timeout.
    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::StoreUnavailable(format!("{op}: timed out"))),
        }
    }

    async fn fetch_post(&self, post_id: Uuid) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(&format!("{SELECT_POST_COLUMNS} WHERE id = $1"))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NoSuchPost)?;

        let ids = [post_id];
        let mut votes = self.fetch_votes(&ids).await?;
        let mut comments = self.fetch_comments(&ids).await?;
        row.into_post(
            votes.remove(&post_id).unwrap_or_default(),
            comments.remove(&post_id).unwrap_or_default(),
        )
    }

    /// Assembles full aggregates for a page of post rows with batched
    /// vote/comment fetches instead of per-post round trips.
    async fn assemble(&self, rows: Vec<PostRow>) -> Result<Vec<Post>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut votes = self.fetch_votes(&ids).await?;
        let mut comments = self.fetch_comments(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                row.into_post(
                    votes.remove(&id).unwrap_or_default(),
                    comments.remove(&id).unwrap_or_default(),
                )
            })
            .collect()
    }

    async fn fetch_votes(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Vote>>> {
        let rows = sqlx::query_as::<_, VoteRow>(
            "SELECT post_id, user_id, direction FROM post_votes \
             WHERE post_id = ANY($1) ORDER BY created_at, user_id",
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_post: HashMap<Uuid, Vec<Vote>> = HashMap::new();
        for row in rows {
            let post_id = row.post_id;
            by_post.entry(post_id).or_default().push(row.into_vote()?);
        }
        Ok(by_post)
    }

    async fn fetch_comments(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Comment>>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, post_id, author_id, author_username, body, created_at FROM comments \
             WHERE post_id = ANY($1) ORDER BY created_at, id",
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_post: HashMap<Uuid, Vec<Comment>> = HashMap::new();
        for row in rows {
            by_post.entry(row.post_id).or_default().push(row.into_comment());
        }
        Ok(by_post)
    }

    /// Reads the post-mutation ledger inside the vote transaction.
    async fn ledger_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        post_id: Uuid,
    ) -> Result<Vec<Vote>> {
        let rows = sqlx::query_as::<_, VoteRow>(
            "SELECT post_id, user_id, direction FROM post_votes \
             WHERE post_id = $1 ORDER BY created_at, user_id",
        )
        .bind(post_id)
        .fetch_all(&mut **tx)
        .await?;

        rows.into_iter().map(VoteRow::into_vote).collect()
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn get(&self, post_id: Uuid) -> Result<Post> {
        self.bounded("get post", self.fetch_post(post_id)).await
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        self.bounded("list posts", async {
            let rows = sqlx::query_as::<_, PostRow>(&format!(
                "{SELECT_POST_COLUMNS} ORDER BY created_at DESC"
            ))
            .fetch_all(&self.pool)
            .await?;
            self.assemble(rows).await
        })
        .await
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Post>> {
        self.bounded("list posts by category", async {
            let rows = sqlx::query_as::<_, PostRow>(&format!(
                "{SELECT_POST_COLUMNS} WHERE category = $1 ORDER BY created_at DESC"
            ))
            .bind(category)
            .fetch_all(&self.pool)
            .await?;
            self.assemble(rows).await
        })
        .await
    }

    async fn find_by_author(&self, username: &str) -> Result<Vec<Post>> {
        self.bounded("list posts by author", async {
            let rows = sqlx::query_as::<_, PostRow>(&format!(
                "{SELECT_POST_COLUMNS} WHERE author_username = $1 ORDER BY created_at DESC"
            ))
            .bind(username)
            .fetch_all(&self.pool)
            .await?;
            self.assemble(rows).await
        })
        .await
    }

    async fn insert(&self, post: &Post) -> Result<()> {
        self.bounded("insert post", async {
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                "INSERT INTO posts (id, author_id, author_username, category, title, kind, \
                 url, body, score, upvote_percentage, views, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(post.id)
            .bind(post.author.id)
            .bind(&post.author.username)
            .bind(&post.category)
            .bind(&post.title)
            .bind(post.kind.as_str())
            .bind(&post.url)
            .bind(&post.text)
            .bind(post.score)
            .bind(post.upvote_percentage)
            .bind(post.views)
            .bind(post.created)
            .execute(&mut *tx)
            .await?;

            for vote in &post.votes {
                sqlx::query(
                    "INSERT INTO post_votes (post_id, user_id, direction) VALUES ($1, $2, $3)",
                )
                .bind(post.id)
                .bind(vote.user_id)
                .bind(vote.direction.value())
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, post_id: Uuid) -> Result<()> {
        self.bounded("delete post", async {
            let result = sqlx::query("DELETE FROM posts WHERE id = $1")
                .bind(post_id)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::NoSuchPost);
            }
            Ok(())
        })
        .await
    }

    async fn apply_vote(&self, post_id: Uuid, user_id: Uuid, update: VoteUpdate) -> Result<()> {
        self.bounded("apply vote", async {
            let mut tx = self.pool.begin().await?;

            // Lock the post row so the ledger read and the metrics write act
            // on a stable snapshot even under concurrent voters.
            let locked: Option<Uuid> =
                sqlx::query_scalar("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
                    .bind(post_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            if locked.is_none() {
                return Err(AppError::NoSuchPost);
            }

            match update {
                VoteUpdate::Cast(direction) => {
                    sqlx::query(
                        "INSERT INTO post_votes (post_id, user_id, direction) \
                         VALUES ($1, $2, $3) \
                         ON CONFLICT (post_id, user_id) \
                         DO UPDATE SET direction = EXCLUDED.direction",
                    )
                    .bind(post_id)
                    .bind(user_id)
                    .bind(direction.value())
                    .execute(&mut *tx)
                    .await?;
                }
                VoteUpdate::Retract => {
                    sqlx::query("DELETE FROM post_votes WHERE post_id = $1 AND user_id = $2")
                        .bind(post_id)
                        .bind(user_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }

            let votes = Self::ledger_in_tx(&mut tx, post_id).await?;
            let tally = scoring::recompute(&votes);

            sqlx::query("UPDATE posts SET score = $1, upvote_percentage = $2 WHERE id = $3")
                .bind(tally.score)
                .bind(tally.upvote_percentage)
                .bind(post_id)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn add_comment(&self, post_id: Uuid, comment: &Comment) -> Result<()> {
        self.bounded("add comment", async {
            let mut tx = self.pool.begin().await?;

            let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM posts WHERE id = $1")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(AppError::NoSuchPost);
            }

            sqlx::query(
                "INSERT INTO comments (id, post_id, author_id, author_username, body, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(comment.id)
            .bind(post_id)
            .bind(comment.author.id)
            .bind(&comment.author.username)
            .bind(&comment.body)
            .bind(comment.created)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok(())
        })
        .await
    }

    async fn remove_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<()> {
        self.bounded("remove comment", async {
            let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM posts WHERE id = $1")
                .bind(post_id)
                .fetch_optional(&self.pool)
                .await?;
            if exists.is_none() {
                return Err(AppError::NoSuchPost);
            }

            // Removing an already-removed comment is a no-op by contract.
            sqlx::query("DELETE FROM comments WHERE id = $1 AND post_id = $2")
                .bind(comment_id)
                .bind(post_id)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    author_id: Uuid,
    author_username: String,
    category: String,
    title: String,
    kind: String,
    url: Option<String>,
    body: Option<String>,
    score: i64,
    upvote_percentage: i32,
    views: i64,
    created_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self, votes: Vec<Vote>, comments: Vec<Comment>) -> Result<Post> {
        let kind = PostKind::parse(&self.kind).ok_or_else(|| {
            AppError::StoreUnavailable(format!(
                "unknown post kind '{}' for post {}",
                self.kind, self.id
            ))
        })?;

        Ok(Post {
            author: Author {
                username: self.author_username,
                id: self.author_id,
            },
            category: self.category,
            comments,
            created: self.created_at,
            id: self.id,
            score: self.score,
            title: self.title,
            kind,
            upvote_percentage: self.upvote_percentage,
            url: self.url,
            text: self.body,
            views: self.views,
            votes,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    post_id: Uuid,
    user_id: Uuid,
    direction: i16,
}

impl VoteRow {
    fn into_vote(self) -> Result<Vote> {
        let direction = VoteDirection::try_from(self.direction).map_err(|raw| {
            AppError::StoreUnavailable(format!(
                "invalid vote direction {raw} on post {}",
                self.post_id
            ))
        })?;
        Ok(Vote {
            user_id: self.user_id,
            direction,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    author_username: String,
    body: String,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            author: Author {
                username: self.author_username,
                id: self.author_id,
            },
            body: self.body,
            created: self.created_at,
            id: self.id,
        }
    }
}
