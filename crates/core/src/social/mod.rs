use async_trait::async_trait;
use thiserror::Error;

use crate::domain::post::{GeneratedPost, PublishedPost};

pub mod oauth;
pub mod x;

/// Closed set of publish failures. Every kind is terminal for the run; no
/// retry or backoff is attempted for any of them.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("post is {chars} characters; platform limit is {limit}")]
    TooLong { chars: usize, limit: usize },

    #[error("publish rejected: rate limited")]
    RateLimited,

    #[error("publish rejected: forbidden")]
    Forbidden,

    #[error("publish rejected: unauthorized")]
    Unauthorized,

    #[error("social provider error: {0}")]
    Provider(String),
}

#[async_trait]
pub trait PostPublisher: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Hard character limit the platform enforces on post bodies.
    fn character_limit(&self) -> usize;

    /// One publish call creating a publicly visible post. Over-limit bodies
    /// are rejected locally without touching the network.
    async fn publish(&self, post: &GeneratedPost) -> Result<PublishedPost, PublishError>;
}
