//! Forum collaborator: discovery of candidate posts and posting replies.
//!
//! The agent only talks to the forum through [`ForumClient`], so the loop can
//! be driven by an in-memory forum in tests.

mod reddit;

pub use reddit::{RedditClient, RedditEndpoints};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::RedditCredentials;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("reply rejected: {0}")]
    Rejected(String),

    #[error("failed to decode forum response: {0}")]
    Decode(String),
}

/// An authenticated forum session.
#[derive(Clone)]
pub struct Session {
    pub access_token: String,
    pub username: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

/// A community returned by keyword search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subreddit {
    pub display_name: String,
}

/// A post that may deserve a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    /// Forum-assigned id, without the `t3_` kind prefix.
    pub id: String,
    pub title: String,
    pub archived: bool,
}

#[async_trait]
pub trait ForumClient: Send + Sync {
    /// Establish a session. Failure here is fatal for the run.
    async fn authenticate(&self, credentials: &RedditCredentials) -> Result<Session, ForumError>;

    /// Up to `limit` communities relevant to `keyword`.
    async fn search_subreddits(
        &self,
        session: &Session,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Subreddit>, ForumError>;

    /// Up to `limit` hot posts of `subreddit`.
    async fn hot_posts(
        &self,
        session: &Session,
        subreddit: &Subreddit,
        limit: usize,
    ) -> Result<Vec<CandidateItem>, ForumError>;

    /// Post `body` as a top-level reply to `post_id`.
    async fn reply(&self, session: &Session, post_id: &str, body: &str) -> Result<(), ForumError>;
}
