/// Business logic layer
pub mod comments;
pub mod posts;
pub mod scoring;
pub mod votes;

pub use comments::CommentService;
pub use posts::{NewPost, PostService};
pub use votes::VoteService;
