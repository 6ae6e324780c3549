//! Versioned REST API under `/v1/`.
//!
//! Resource modules mirror the service layer: posts (with group and date
//! filters), groups, comments and likes nested under their post, and the
//! caller's follow list. Writes require a bearer identity and answer 401
//! without one; reads are public except the follow list, which is scoped
//! to the caller.
pub mod comments;
pub mod follows;
pub mod groups;
pub mod likes;
pub mod posts;
