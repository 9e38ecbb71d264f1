/// Data models for the post service
///
/// A `Post` aggregate owns its comments and its vote ledger. The ledger
/// holds at most one entry per user and is the ground truth from which the
/// `score` and `upvotePercentage` fields are derived.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::services::scoring;

/// Resolved author identity, denormalized into the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    pub id: Uuid,
}

/// Post flavor: external link or self text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Link,
    Text,
}

impl PostKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PostKind::Link => "link",
            PostKind::Text => "text",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "link" => Some(PostKind::Link),
            "text" => Some(PostKind::Text),
            _ => None,
        }
    }
}

/// Direction of a single vote.
///
/// Serialized as the raw integer (+1 upvote, -1 downvote) to match the
/// wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn value(self) -> i16 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

impl TryFrom<i16> for VoteDirection {
    type Error = i16;

    fn try_from(raw: i16) -> std::result::Result<Self, Self::Error> {
        match raw {
            1 => Ok(VoteDirection::Up),
            -1 => Ok(VoteDirection::Down),
            other => Err(other),
        }
    }
}

impl Serialize for VoteDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i16(self.value())
    }
}

impl<'de> Deserialize<'de> for VoteDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = i16::deserialize(deserializer)?;
        VoteDirection::try_from(raw)
            .map_err(|v| serde::de::Error::custom(format!("invalid vote direction {v}")))
    }
}

/// One ledger entry: a user's current vote on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "user")]
    pub user_id: Uuid,
    #[serde(rename = "vote")]
    pub direction: VoteDirection,
}

/// Comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: Author,
    pub body: String,
    pub created: DateTime<Utc>,
    pub id: Uuid,
}

impl Comment {
    pub fn new(author: Author, body: impl Into<String>) -> Self {
        Self {
            author,
            body: body.into(),
            created: Utc::now(),
            id: Uuid::new_v4(),
        }
    }
}

/// Post aggregate. Field order matches the serialized wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub author: Author,
    pub category: String,
    pub comments: Vec<Comment>,
    pub created: DateTime<Utc>,
    pub id: Uuid,
    pub score: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub upvote_percentage: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub views: i64,
    pub votes: Vec<Vote>,
}

impl Post {
    /// Builds a fresh aggregate with the author's automatic upvote applied.
    pub fn new(
        author: Author,
        category: String,
        title: String,
        kind: PostKind,
        url: Option<String>,
        text: Option<String>,
    ) -> Self {
        let author_id = author.id;
        let mut post = Self {
            author,
            category,
            comments: Vec::new(),
            created: Utc::now(),
            id: Uuid::new_v4(),
            score: 0,
            title,
            kind,
            upvote_percentage: 0,
            url,
            text,
            views: 0,
            votes: Vec::new(),
        };
        post.set_vote(author_id, VoteDirection::Up);
        post.refresh_metrics();
        post
    }

    /// Insert-or-update the ledger entry for `user_id`. Never duplicates.
    pub fn set_vote(&mut self, user_id: Uuid, direction: VoteDirection) {
        match self.votes.iter_mut().find(|v| v.user_id == user_id) {
            Some(vote) => vote.direction = direction,
            None => self.votes.push(Vote { user_id, direction }),
        }
    }

    /// Remove the ledger entry for `user_id`; no-op when absent.
    pub fn remove_vote(&mut self, user_id: Uuid) {
        self.votes.retain(|v| v.user_id != user_id);
    }

    /// Current vote directions, in ledger order.
    pub fn vote_directions(&self) -> Vec<i64> {
        self.votes
            .iter()
            .map(|v| i64::from(v.direction.value()))
            .collect()
    }

    /// Re-derive `score` and `upvotePercentage` from the ledger.
    pub fn refresh_metrics(&mut self) {
        let tally = scoring::recompute(&self.votes);
        self.score = tally.score;
        self.upvote_percentage = tally.upvote_percentage;
    }
}
