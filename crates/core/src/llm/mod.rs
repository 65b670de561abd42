use async_trait::async_trait;

use crate::domain::market::{ChangeResult, Direction};
use crate::domain::post::GeneratedPost;

pub mod error;
pub mod gemini;

pub use error::GenerationError;

/// Figures embedded into the generation prompt.
#[derive(Debug, Clone, Copy)]
pub struct PostInput {
    pub current: f64,
    pub delta: f64,
    pub percent: f64,
    pub direction: Direction,
}

impl PostInput {
    pub fn from_change(change: &ChangeResult) -> Self {
        Self {
            current: change.current,
            delta: change.delta,
            percent: change.percent,
            direction: change.direction,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// One completion call. The returned body is trimmed and already carries
    /// the timestamp suffix.
    async fn generate_post(&self, input: &PostInput) -> Result<GeneratedPost, GenerationError>;
}
