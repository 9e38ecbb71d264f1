/// HTTP request handlers
pub mod comments;
pub mod posts;
pub mod votes;

pub use comments::*;
pub use posts::*;
pub use votes::*;
