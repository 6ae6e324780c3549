/// Business logic layer
///
/// Services compose the repositories into the operations the handlers
/// expose: viewer-scoped feed queries, post/comment mutations with
/// ownership checks and cache invalidation, and the idempotent social-graph
/// toggles.
pub mod comments;
pub mod feed;
pub mod posts;
pub mod social;

pub use comments::CommentService;
pub use feed::{FeedScope, FeedService, PostDetail};
pub use posts::PostService;
pub use social::SocialService;
