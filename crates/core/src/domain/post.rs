use chrono::{DateTime, Utc};

/// Finished post body, timestamp suffix included. Must stay within the
/// platform character limit or be rejected before any publish call.
#[derive(Debug, Clone)]
pub struct GeneratedPost {
    pub body: String,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedPost {
    /// Length in Unicode scalar values, not bytes. Japanese text makes the
    /// distinction matter against the platform limit.
    pub fn char_count(&self) -> usize {
        self.body.chars().count()
    }
}

#[derive(Debug, Clone)]
pub struct PublishedPost {
    pub remote_id: String,
}
